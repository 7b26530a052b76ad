use crate::error::{Result, ScraperError};
use crate::types::{CardBlock, CardScan, CreatorRecord, Extraction, ExtractionMethod, ExtractorConfig};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

const TEMPLATES_MARKER: &str = "workflow templates";

pub struct CreatorExtractor {
    config: ExtractorConfig,
    card_pattern: Regex,
    raw_pattern: Regex,
    div_selector: Selector,
    card_selector: Selector,
    img_selector: Selector,
}

impl CreatorExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        // Name is the non-digit run right before the count
        let card_pattern = Regex::new(r"(?i)([^0-9]+?)([0-9]+)\s+workflow\s+templates")?;
        let raw_pattern =
            Regex::new(r"(?i)([A-Za-z0-9_]+(?:\s+[A-Za-z0-9_]+)*)\s+([0-9]+)\s+workflow\s+templates")?;

        Ok(Self {
            config,
            card_pattern,
            raw_pattern,
            div_selector: parse_selector("div")?,
            card_selector: parse_selector(r#"div[class*="card"], div[class*="creator"]"#)?,
            img_selector: parse_selector("img")?,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs the card scan over `html` and, when it finds nothing and the
    /// fallback is enabled, the raw-source scan.
    pub fn extract_document(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let blocks = self.card_blocks(&document);
        debug!("Derived {} candidate card blocks ({:?})", blocks.len(), self.config.scan);

        let creators = self.extract_blocks(&blocks);
        if !creators.is_empty() || !self.config.raw_fallback {
            info!("Card scan found {} creators", creators.len());
            return Extraction {
                creators,
                method: ExtractionMethod::CardScan,
            };
        }

        info!("Card scan found no creators, trying raw HTML scan");
        let creators = self.extract_raw(html);
        info!("Raw HTML scan found {} creators", creators.len());
        Extraction {
            creators,
            method: ExtractionMethod::RawHtml,
        }
    }

    pub fn card_blocks(&self, document: &Html) -> Vec<CardBlock> {
        let selector = match self.config.scan {
            CardScan::ImageDivs => &self.div_selector,
            CardScan::CardClasses => &self.card_selector,
        };

        document
            .select(selector)
            .filter_map(|element| {
                let img = element.select(&self.img_selector).next();
                if self.config.scan == CardScan::ImageDivs && img.is_none() {
                    return None;
                }
                let image = img
                    .and_then(|img| img.value().attr("src"))
                    .filter(|src| !src.is_empty())
                    .map(|src| self.resolve_image(src));

                Some(CardBlock {
                    text: element.text().collect(),
                    image,
                })
            })
            .collect()
    }

    pub fn extract_blocks(&self, blocks: &[CardBlock]) -> Vec<CreatorRecord> {
        let mut creators = Vec::new();
        let mut seen = HashSet::new();

        for block in blocks {
            if !block.text.contains(TEMPLATES_MARKER) {
                continue;
            }
            let Some(captures) = self.card_pattern.captures(&block.text) else {
                continue;
            };
            let image = block.image.clone().unwrap_or_default();
            if let Some(record) = self.build_record(&captures[1], &captures[2], image, &seen) {
                seen.insert(record.name.clone());
                creators.push(record);
            }
        }

        sort_by_templates(&mut creators);
        creators
    }

    pub fn extract_raw(&self, html: &str) -> Vec<CreatorRecord> {
        let mut creators = Vec::new();
        let mut seen = HashSet::new();

        for captures in self.raw_pattern.captures_iter(html) {
            if let Some(record) = self.build_record(&captures[1], &captures[2], String::new(), &seen) {
                seen.insert(record.name.clone());
                creators.push(record);
            }
        }

        sort_by_templates(&mut creators);
        creators
    }

    fn build_record(
        &self,
        raw_name: &str,
        digits: &str,
        image: String,
        seen: &HashSet<String>,
    ) -> Option<CreatorRecord> {
        let name = raw_name.trim();
        if name.is_empty() || seen.contains(name) {
            return None;
        }
        let templates = match digits.parse::<u64>() {
            Ok(templates) => templates,
            Err(e) => {
                debug!("Skipping '{}': unusable template count '{}': {}", name, digits, e);
                return None;
            }
        };

        debug!("Found creator: {} with {} templates", name, templates);
        Some(CreatorRecord {
            name: name.to_string(),
            templates,
            image,
            profile: profile_url(&self.config.profile_host, name),
        })
    }

    fn resolve_image(&self, src: &str) -> String {
        match &self.config.base_url {
            Some(base) => base
                .join(src)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| src.to_string()),
            None => src.to_string(),
        }
    }
}

impl Default for CreatorExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default()).unwrap()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::FetchConfig {
        reason: format!("Invalid selector '{}': {:?}", selector, e),
    })
}

/// Highest template count first; equal counts keep their input order.
fn sort_by_templates(creators: &mut [CreatorRecord]) {
    creators.sort_by(|a, b| b.templates.cmp(&a.templates));
}

pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn profile_url(host: &str, name: &str) -> String {
    format!("https://{}/creator/{}", host, slugify(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn extractor() -> CreatorExtractor {
        CreatorExtractor::default()
    }

    fn record(name: &str, templates: u64) -> CardBlock {
        CardBlock::new(format!("{}{} workflow templates", name, templates), None)
    }

    #[test]
    fn test_blocks_without_marker_are_ignored() {
        let blocks = vec![
            CardBlock::new("Jane Doe 12 templates", Some("a.png")),
            CardBlock::new("John Roe 7 Workflow Templates", None),
            CardBlock::new("", None),
        ];
        assert!(extractor().extract_blocks(&blocks).is_empty());
    }

    #[test]
    fn test_extracts_single_card() {
        let blocks = vec![CardBlock::new(
            "Harshil Agrawal186 workflow templates",
            Some("https://cdn.example.com/harshil.png"),
        )];

        let creators = extractor().extract_blocks(&blocks);

        assert_eq!(
            creators,
            vec![CreatorRecord {
                name: "Harshil Agrawal".to_string(),
                templates: 186,
                image: "https://cdn.example.com/harshil.png".to_string(),
                profile: "https://n8n.io/creator/harshil-agrawal".to_string(),
            }]
        );
    }

    #[test]
    fn test_dedup_keeps_first_image() {
        let blocks = vec![
            CardBlock::new("Jane Doe 3 workflow templates", Some("first.png")),
            CardBlock::new("Jane Doe 40 workflow templates", Some("second.png")),
        ];

        let creators = extractor().extract_blocks(&blocks);

        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].image, "first.png");
        assert_eq!(creators[0].templates, 3);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let blocks = vec![
            record("Alpha", 5),
            record("Bravo", 20),
            record("Charlie", 5),
            record("Delta", 100),
        ];

        let creators = extractor().extract_blocks(&blocks);
        let order: Vec<_> = creators
            .iter()
            .map(|c| (c.name.as_str(), c.templates))
            .collect();

        assert_eq!(
            order,
            vec![("Delta", 100), ("Bravo", 20), ("Alpha", 5), ("Charlie", 5)]
        );
    }

    #[test]
    fn test_name_is_non_digit_run_before_count() {
        let blocks = vec![CardBlock::new(
            "Top 10 builders  Max Power 42 workflow templates",
            None,
        )];

        let creators = extractor().extract_blocks(&blocks);

        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].name, "builders  Max Power");
        assert_eq!(creators[0].templates, 42);
        assert_eq!(creators[0].profile, "https://n8n.io/creator/builders-max-power");
    }

    #[test]
    fn test_empty_name_and_overflow_are_skipped() {
        let blocks = vec![
            CardBlock::new("   12 workflow templates", None),
            CardBlock::new("Huge 99999999999999999999999 workflow templates", None),
            record("Kept", 1),
        ];

        let creators = extractor().extract_blocks(&blocks);

        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].name, "Kept");
    }

    #[test]
    fn test_slug_collapses_whitespace() {
        assert_eq!(slugify("Jane  Doe"), "jane-doe");
        assert_eq!(slugify("Jane \t Doe"), "jane-doe");
        assert_eq!(
            profile_url("n8n.io", "Jane  Doe"),
            "https://n8n.io/creator/jane-doe"
        );
    }

    #[test]
    fn test_image_divs_scan_requires_image() {
        let html = r#"<html><body>
            <div class="grid">
              <div class="card"><img src="https://img.example.com/a.png"><span>Ada Lovelace</span><span>12 workflow templates</span></div>
              <div class="card"><span>Alan Turing</span><span>30 workflow templates</span></div>
            </div>
        </body></html>"#;

        let extraction = extractor().extract_document(html);

        assert_eq!(extraction.method, ExtractionMethod::CardScan);
        assert_eq!(extraction.creators.len(), 1);
        // The outer grid div matches first and claims the name
        assert_eq!(extraction.creators[0].name, "Ada Lovelace");
        assert_eq!(extraction.creators[0].image, "https://img.example.com/a.png");
    }

    #[test]
    fn test_card_classes_scan_matches_console_selector() {
        let html = r#"<html><body>
            <div class="creator-card"><img src="/avatars/ada.png"><p>Ada Lovelace</p><p>12 workflow templates</p></div>
            <div class="creatorTile"><p>Alan Turing</p><p>30 workflow templates</p></div>
            <div class="other"><p>Grace Hopper</p><p>99 workflow templates</p></div>
        </body></html>"#;
        let config = ExtractorConfig {
            scan: CardScan::CardClasses,
            raw_fallback: false,
            base_url: Some(Url::parse("https://n8n.io/creators/").unwrap()),
            ..ExtractorConfig::default()
        };

        let extraction = CreatorExtractor::new(config).unwrap().extract_document(html);

        let names: Vec<_> = extraction.creators.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alan Turing", "Ada Lovelace"]);
        assert_eq!(extraction.creators[1].image, "https://n8n.io/avatars/ada.png");
        assert_eq!(extraction.creators[0].image, "");
    }

    #[test]
    fn test_fallback_scans_raw_html() {
        let html = r#"<html><body>
            <ul>
              <li>Jane Doe 14 workflow templates</li>
              <li>John Smith 27 workflow templates</li>
            </ul>
        </body></html>"#;

        let extraction = extractor().extract_document(html);

        assert_eq!(extraction.method, ExtractionMethod::RawHtml);
        assert_eq!(extraction.creators.len(), 2);
        assert_eq!(extraction.creators[0].name, "John Smith");
        assert_eq!(extraction.creators[0].templates, 27);
        assert!(extraction.creators.iter().all(|c| c.image.is_empty()));
    }

    #[test]
    fn test_fallback_dedup_keeps_first_occurrence() {
        let html = "<p>Jane Doe 3 workflow templates</p><p>Jane Doe 9 workflow templates</p><p>X 100 workflow templates</p>";

        let creators = extractor().extract_raw(html);
        let order: Vec<_> = creators
            .iter()
            .map(|c| (c.name.as_str(), c.templates))
            .collect();

        assert_eq!(order, vec![("X", 100), ("Jane Doe", 3)]);
    }

    #[test]
    fn test_fallback_disabled_reports_empty() {
        let html = "<p>Jane Doe 14 workflow templates</p>";
        let config = ExtractorConfig {
            raw_fallback: false,
            ..ExtractorConfig::default()
        };

        let extraction = CreatorExtractor::new(config).unwrap().extract_document(html);

        assert!(extraction.is_empty());
        assert_eq!(extraction.method, ExtractionMethod::CardScan);
    }

    #[test]
    fn test_nothing_found_is_empty_not_error() {
        let extraction = extractor().extract_document("<html><body><p>nothing</p></body></html>");
        assert!(extraction.is_empty());
        assert_eq!(extraction.method, ExtractionMethod::RawHtml);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"<div><img src="x.png">Zed 4 workflow templates</div>
            <div><img src="y.png">Amy 9 workflow templates</div>"#;
        let extractor = extractor();

        assert_eq!(extractor.extract_document(html), extractor.extract_document(html));
    }
}
