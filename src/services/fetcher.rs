use crate::error::{Result, ScraperError};
use crate::types::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

/// Why a single proxy attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Forbidden,
    Timeout,
    Network,
    Other,
}

impl FailureKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Forbidden => "Access forbidden (403). The website is blocking our requests. Please try the saved-page method instead.",
            FailureKind::Timeout => "Request timed out. The server took too long to respond. Please try again or use the saved-page method.",
            FailureKind::Network => "Network error. Please check your internet connection and try again, or use the saved-page method.",
            FailureKind::Other => "Failed to fetch the creators page. Please try the saved-page method instead.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAttempt {
    pub proxy: String,
    pub kind: FailureKind,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub proxy: String,
    pub failed_attempts: Vec<ProxyAttempt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { proxy: String, bytes: usize },
    Failed(ProxyAttempt),
}

pub struct PageFetcher {
    config: FetchConfig,
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        if config.proxies.is_empty() {
            return Err(ScraperError::FetchConfig {
                reason: "At least one proxy is required".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str());
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Tries each proxy in order and returns the first page served with a 200
    /// and a non-empty body.
    pub async fn fetch_page(&self) -> Result<FetchedPage> {
        info!("Fetching {} through {} proxies", self.config.target_url, self.config.proxies.len());

        let mut failed_attempts = Vec::new();

        for proxy in &self.config.proxies {
            info!("Trying proxy: {}...", proxy_label(proxy));
            match self.try_proxy(proxy).await {
                Ok(html) => {
                    info!("Successfully fetched data using {}", proxy_label(proxy));
                    return Ok(FetchedPage {
                        html,
                        proxy: proxy.clone(),
                        failed_attempts,
                    });
                }
                Err(attempt) => {
                    warn!(
                        "Proxy {} failed ({:?}): {}, trying next...",
                        proxy_label(proxy),
                        attempt.kind,
                        attempt.detail
                    );
                    failed_attempts.push(attempt);
                }
            }
        }

        let message = failed_attempts
            .last()
            .map(|a| a.kind.user_message())
            .unwrap_or(FailureKind::Other.user_message())
            .to_string();

        Err(ScraperError::ProxiesExhausted {
            message,
            attempts: failed_attempts,
        })
    }

    /// Tries every proxy, without stopping at the first success.
    pub async fn probe(&self) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(self.config.proxies.len());

        for proxy in &self.config.proxies {
            let outcome = match self.try_proxy(proxy).await {
                Ok(html) => ProbeOutcome::Reachable {
                    proxy: proxy.clone(),
                    bytes: html.len(),
                },
                Err(attempt) => ProbeOutcome::Failed(attempt),
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn try_proxy(&self, proxy: &str) -> std::result::Result<String, ProxyAttempt> {
        let failed = |kind: FailureKind, detail: String| ProxyAttempt {
            proxy: proxy.to_string(),
            kind,
            detail,
        };

        let url = proxied_url(proxy, &self.config.target_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(classify_error(&e), e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(failed(classify_status(status), format!("HTTP status {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| failed(classify_error(&e), e.to_string()))?;

        if html.is_empty() {
            return Err(failed(FailureKind::Other, "Empty response body".to_string()));
        }

        Ok(html)
    }
}

/// Appends the percent-encoded target to a proxy prefix.
pub fn proxied_url(proxy: &str, target: &Url) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    format!("{}{}", proxy, encoded)
}

/// Short display form of a proxy prefix, without its query.
pub fn proxy_label(proxy: &str) -> &str {
    proxy.split('?').next().unwrap_or(proxy)
}

pub fn classify_status(status: u16) -> FailureKind {
    match status {
        403 => FailureKind::Forbidden,
        _ => FailureKind::Other,
    }
}

pub fn classify_error(e: &reqwest::Error) -> FailureKind {
    if e.is_timeout() {
        return FailureKind::Timeout;
    }
    if let Some(status) = e.status() {
        return classify_status(status.as_u16());
    }
    if e.is_connect() || e.is_request() {
        return FailureKind::Network;
    }
    FailureKind::Other
}

/// Reads an HTML page the user saved from their browser. Bytes that are not
/// UTF-8 (pages saved in a legacy charset) become U+FFFD.
pub async fn read_saved_page(file_path: &Path) -> Result<String> {
    info!("Reading saved page: {}", file_path.display());

    if !file_path.is_file() {
        return Err(ScraperError::FileNotFound {
            path: file_path.display().to_string(),
        });
    }

    let bytes = fs::read(file_path).await?;
    let html = match String::from_utf8(bytes) {
        Ok(html) => html,
        Err(e) => {
            warn!(
                "{} is not valid UTF-8 (first bad byte at {}), decoding lossily",
                file_path.display(),
                e.utf8_error().valid_up_to()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    debug!("Read {} bytes from {}", html.len(), file_path.display());

    Ok(html)
}
