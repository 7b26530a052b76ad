mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, ExportArgs, FetchArgs, ParseArgs, ProbeArgs, ProxyArgs, ScriptArgs};
use creator_scraper::services::fetcher::{proxy_label, read_saved_page};
use creator_scraper::{
    CreatorExporter, CreatorExtractor, CreatorSummary, ExportReport, Extraction, ExtractorConfig,
    FetchConfig, PageFetcher, ProbeOutcome, Result, ScraperError, BROWSER_SCRIPT,
};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Fetch(args) => handle_fetch_command(args, &cli.output).await,
        Commands::Parse(args) => handle_parse_command(args, &cli.output).await,
        Commands::Probe(args) => handle_probe_command(args).await,
        Commands::Script(args) => handle_script_command(args).await,
    };

    if let Err(e) = result {
        error!("Operation failed: {}", e);
        if let ScraperError::ProxiesExhausted { attempts, .. } = &e {
            for attempt in attempts {
                error!("  - {}: {:?} ({})", attempt.proxy, attempt.kind, attempt.detail);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

fn fetch_config(args: &ProxyArgs) -> Result<FetchConfig> {
    let mut config = FetchConfig {
        target_url: Url::parse(&args.target)?,
        timeout: Duration::from_secs(args.timeout),
        ..FetchConfig::default()
    };
    if !args.proxies.is_empty() {
        config.proxies = args.proxies.clone();
    }

    Ok(config)
}

async fn handle_fetch_command(args: &FetchArgs, output_dir: &Path) -> Result<()> {
    let fetcher = PageFetcher::new(fetch_config(&args.proxy)?)?;
    let page = fetcher.fetch_page().await?;

    info!("Parsing HTML...");
    let extractor = CreatorExtractor::new(ExtractorConfig {
        base_url: Some(fetcher.config().target_url.clone()),
        ..ExtractorConfig::default()
    })?;
    let extraction = extractor.extract_document(&page.html);

    if extraction.is_empty() {
        return Err(ScraperError::NoCreatorsFound {
            origin: fetcher.config().target_url.to_string(),
            hint: "Web scraping can be challenging due to complex page structures. Run the `script` output in your browser console, or save the page and use the `parse` command.".to_string(),
        });
    }

    let source = format!("{} via {}", fetcher.config().target_url, proxy_label(&page.proxy));
    finish(&extraction, &source, &args.export, output_dir).await
}

async fn handle_parse_command(args: &ParseArgs, output_dir: &Path) -> Result<()> {
    let html = read_saved_page(&args.file).await?;

    let base_url = args.base_url.as_deref().map(Url::parse).transpose()?;
    let extractor = CreatorExtractor::new(ExtractorConfig {
        scan: args.scan.into(),
        raw_fallback: args.raw_fallback,
        base_url,
        ..ExtractorConfig::default()
    })?;
    let extraction = extractor.extract_document(&html);

    if extraction.is_empty() {
        let hint = if args.raw_fallback {
            "Try `--scan image-divs`, or the `fetch` command."
        } else {
            "Try `--raw-fallback`, `--scan image-divs`, or the `fetch` command."
        };
        return Err(ScraperError::NoCreatorsFound {
            origin: args.file.display().to_string(),
            hint: hint.to_string(),
        });
    }

    finish(&extraction, &args.file.display().to_string(), &args.export, output_dir).await
}

async fn finish(extraction: &Extraction, source: &str, args: &ExportArgs, output_dir: &Path) -> Result<()> {
    info!(
        "Completed! Found {} creators ({:?})",
        extraction.creators.len(),
        extraction.method
    );
    print!("\n{}", CreatorExporter::render(&extraction.creators));

    if args.no_export {
        return Ok(());
    }

    let path = CreatorExporter::export(&extraction.creators, output_dir, args.force).await?;
    println!("\nData has been saved as {}", path.display());

    if args.report {
        let report = ExportReport {
            path,
            source: source.to_string(),
            method: extraction.method,
            exported_at: chrono::Utc::now().to_rfc3339(),
            summary: CreatorSummary::from_creators(&extraction.creators),
        };
        let report_path = CreatorExporter::write_report(&report, output_dir)
            .await
            .context("Failed to write export report")?;
        info!("Report written to: {}", report_path.display());
    }

    Ok(())
}

async fn handle_probe_command(args: &ProbeArgs) -> Result<()> {
    let fetcher = PageFetcher::new(fetch_config(&args.proxy)?)?;
    info!("Probing {} proxies for {}", fetcher.config().proxies.len(), fetcher.config().target_url);

    let outcomes = fetcher.probe().await;
    let reachable = outcomes
        .iter()
        .filter(|o| matches!(o, ProbeOutcome::Reachable { .. }))
        .count();

    println!("\n=== Proxy Probe ===");
    for outcome in &outcomes {
        match outcome {
            ProbeOutcome::Reachable { proxy, bytes } => {
                println!("✓ {} ({} bytes)", proxy, bytes);
            }
            ProbeOutcome::Failed(attempt) => {
                println!("✗ {} - {:?}: {}", attempt.proxy, attempt.kind, attempt.detail);
                warn!("  {}", attempt.kind.user_message());
            }
        }
    }
    println!("Reachable proxies: {}/{}", reachable, outcomes.len());

    if reachable == 0 {
        return Err(ScraperError::FetchConfig {
            reason: "No proxy could serve the page. Save it from your browser and use the `parse` command.".to_string(),
        });
    }

    Ok(())
}

async fn handle_script_command(args: &ScriptArgs) -> Result<()> {
    match &args.save {
        Some(path) => {
            tokio::fs::write(path, BROWSER_SCRIPT)
                .await
                .context("Failed to write browser script")?;
            info!("Browser script written to: {}", path.display());
            println!("Open https://n8n.io/creators/, paste the contents of {} into the developer console and press Enter.", path.display());
        }
        None => print!("{}", BROWSER_SCRIPT),
    }

    Ok(())
}
