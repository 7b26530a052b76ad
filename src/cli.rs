use clap::{Args, Parser, Subcommand, ValueEnum};
use creator_scraper::CardScan;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "creator-scrape")]
#[command(about = "A CLI tool for extracting n8n creator listings into JSON")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output directory for the exported JSON
    #[arg(short, long, global = true, default_value = "./output")]
    pub output: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the creators page through CORS proxies and extract creators
    Fetch(FetchArgs),

    /// Extract creators from a saved copy of the creators page
    Parse(ParseArgs),

    /// Check which proxies can currently serve the creators page
    Probe(ProbeArgs),

    /// Print the browser console script that extracts creators in-page
    Script(ScriptArgs),
}

#[derive(Args)]
pub struct ProxyArgs {
    /// Page to fetch
    #[arg(long, value_name = "URL", default_value = creator_scraper::types::DEFAULT_TARGET_URL)]
    pub target: String,

    /// Proxy prefix to try, in order (repeatable; replaces the built-in list)
    #[arg(long = "proxy", value_name = "PREFIX")]
    pub proxies: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = creator_scraper::types::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Force overwrite an existing export file
    #[arg(long)]
    pub force: bool,

    /// Also write a JSON report with summary and extraction details
    #[arg(long)]
    pub report: bool,

    /// Only print the creators, do not write any file
    #[arg(long)]
    pub no_export: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub proxy: ProxyArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Saved HTML file
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Which elements are treated as creator cards
    #[arg(long, value_enum, default_value = "card-classes")]
    pub scan: ScanArg,

    /// Fall back to scanning the raw HTML when no card matches
    #[arg(long)]
    pub raw_fallback: bool,

    /// URL the page was saved from, for resolving relative image paths
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub proxy: ProxyArgs,
}

#[derive(Args)]
pub struct ScriptArgs {
    /// Write the script to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScanArg {
    /// Every div that contains an image
    ImageDivs,
    /// Divs whose class mentions "card" or "creator"
    CardClasses,
}

impl From<ScanArg> for CardScan {
    fn from(arg: ScanArg) -> Self {
        match arg {
            ScanArg::ImageDivs => CardScan::ImageDivs,
            ScanArg::CardClasses => CardScan::CardClasses,
        }
    }
}
