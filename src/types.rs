use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TARGET_URL: &str = "https://n8n.io/creators/";
pub const DEFAULT_PROFILE_HOST: &str = "n8n.io";
pub const EXPORT_FILENAME: &str = "n8n-creators.json";
pub const REPORT_FILENAME: &str = "n8n-creators.report.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_PROXIES: [&str; 3] = [
    "https://corsproxy.io/?",
    "https://cors-anywhere.herokuapp.com/",
    "https://api.allorigins.win/raw?url=",
];

/// One creator as listed on the creators page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub name: String,
    pub templates: u64,
    pub image: String,
    pub profile: String,
}

/// Text content of a candidate card element plus its first image, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlock {
    pub text: String,
    pub image: Option<String>,
}

impl CardBlock {
    pub fn new(text: impl Into<String>, image: Option<&str>) -> Self {
        Self {
            text: text.into(),
            image: image.map(str::to_string),
        }
    }
}

/// Which elements of a page are treated as creator cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardScan {
    /// Every `<div>` containing at least one `<img>`.
    ImageDivs,
    /// `div[class*="card"]` and `div[class*="creator"]`, image optional.
    CardClasses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    CardScan,
    RawHtml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub creators: Vec<CreatorRecord>,
    pub method: ExtractionMethod,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub profile_host: String,
    pub scan: CardScan,
    pub raw_fallback: bool,
    /// Base for resolving relative image sources.
    pub base_url: Option<Url>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            profile_host: DEFAULT_PROFILE_HOST.to_string(),
            scan: CardScan::ImageDivs,
            raw_fallback: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub target_url: Url,
    pub proxies: Vec<String>,
    pub timeout: Duration,
    pub user_agent: String,
    /// Honour `HTTP_PROXY`-style environment variables.
    pub system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            target_url: Url::parse(DEFAULT_TARGET_URL).expect("default target url is valid"),
            proxies: DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_proxy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCreator {
    pub name: String,
    pub templates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub total_creators: usize,
    pub total_templates: u64,
    pub top_creator: Option<TopCreator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub source: String,
    pub method: ExtractionMethod,
    pub exported_at: String,
    pub summary: CreatorSummary,
}

impl CreatorSummary {
    /// Expects `creators` sorted, so the first entry is the top creator.
    pub fn from_creators(creators: &[CreatorRecord]) -> Self {
        Self {
            total_creators: creators.len(),
            total_templates: creators.iter().map(|c| c.templates).sum(),
            top_creator: creators.first().map(|c| TopCreator {
                name: c.name.clone(),
                templates: c.templates,
            }),
        }
    }
}
