use crate::error::{Result, ScraperError};
use crate::types::{CreatorRecord, CreatorSummary, ExportReport, EXPORT_FILENAME, REPORT_FILENAME};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub struct CreatorExporter;

impl CreatorExporter {
    /// Plain-text listing: summary first, then one line per creator.
    pub fn render(creators: &[CreatorRecord]) -> String {
        if creators.is_empty() {
            return "No creators found.\n".to_string();
        }

        let summary = CreatorSummary::from_creators(creators);
        let mut out = String::new();

        out.push_str(&format!("Total creators:  {}\n", summary.total_creators));
        out.push_str(&format!("Total templates: {}\n", summary.total_templates));
        if let Some(top) = &summary.top_creator {
            out.push_str(&format!("Top creator:     {} ({} templates)\n", top.name, top.templates));
        }
        out.push('\n');

        let name_width = creators.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
        let count_width = creators
            .iter()
            .map(|c| c.templates.to_string().len())
            .max()
            .unwrap_or(0);

        for (idx, creator) in creators.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {:<name_width$}  {:>count_width$} templates  {}\n",
                idx + 1,
                creator.name,
                creator.templates,
                creator.profile,
                name_width = name_width,
                count_width = count_width
            ));
        }

        out
    }

    /// Writes the pretty-printed JSON array to `<output_dir>/n8n-creators.json`.
    pub async fn export(creators: &[CreatorRecord], output_dir: &Path, force: bool) -> Result<PathBuf> {
        Self::ensure_output_directory(output_dir).await?;

        let path = output_dir.join(EXPORT_FILENAME);
        if path.exists() && !force {
            return Err(ScraperError::Export {
                reason: format!("{} already exists. Use --force to overwrite.", path.display()),
            });
        }

        let json_content = serde_json::to_string_pretty(creators)?;
        fs::write(&path, json_content).await.map_err(|e| ScraperError::Export {
            reason: format!("Failed to write {}: {}", path.display(), e),
        })?;

        info!("Exported {} creators to {}", creators.len(), path.display());
        Ok(path)
    }

    pub async fn write_report(report: &ExportReport, output_dir: &Path) -> Result<PathBuf> {
        Self::ensure_output_directory(output_dir).await?;

        let path = output_dir.join(REPORT_FILENAME);
        let json_content = serde_json::to_string_pretty(report)?;
        fs::write(&path, json_content).await.map_err(|e| ScraperError::Export {
            reason: format!("Failed to write report {}: {}", path.display(), e),
        })?;

        debug!("Generated report file: {}", path.display());
        Ok(path)
    }

    async fn ensure_output_directory(output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).await.map_err(|e| ScraperError::Export {
                reason: format!("Failed to create output directory: {}", e),
            })?;
            info!("Created output directory: {}", output_dir.display());
        }
        Ok(())
    }
}
