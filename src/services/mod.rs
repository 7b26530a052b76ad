pub mod exporter;
pub mod extractor;
pub mod fetcher;

pub use exporter::CreatorExporter;
pub use extractor::CreatorExtractor;
pub use fetcher::{PageFetcher, ProbeOutcome, ProxyAttempt};
