//! # Creator Scraper Library
//!
//! Extracts creator listings (name, template count, avatar, profile URL) from
//! the n8n creators page, either fetched through CORS proxies or from a saved
//! copy of the page, and exports them as JSON.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use creator_scraper::{CreatorExporter, CreatorExtractor, ExtractorConfig, FetchConfig, PageFetcher};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fetch the page through the first working proxy
//!     let fetcher = PageFetcher::new(FetchConfig::default())?;
//!     let page = fetcher.fetch_page().await?;
//!
//!     // Extract creators
//!     let extractor = CreatorExtractor::new(ExtractorConfig::default())?;
//!     let extraction = extractor.extract_document(&page.html);
//!
//!     // Export
//!     let path = CreatorExporter::export(&extraction.creators, Path::new("./output"), true).await?;
//!     println!("Wrote {} creators to {}", extraction.creators.len(), path.display());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod types;

// Re-export main types and services for easier usage
pub use error::{Result, ScraperError};
pub use services::fetcher::{FailureKind, FetchedPage};
pub use services::{CreatorExporter, CreatorExtractor, PageFetcher, ProbeOutcome, ProxyAttempt};
pub use types::{
    CardBlock, CardScan, CreatorRecord, CreatorSummary, ExportReport, Extraction,
    ExtractionMethod, ExtractorConfig, FetchConfig,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Console script that runs the card-class scan inside the browser and
/// downloads the result as `n8n-creators.json`.
pub const BROWSER_SCRIPT: &str = include_str!("../assets/browser-script.js");
