use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::domain::LinkType;
use crate::parser::parse_metadata;

/// Best-effort metadata for a URL. `url` echoes the input unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    pub link_type: LinkType,
    pub url: String,
}

impl ExtractedMetadata {
    /// The result returned whenever a page could not be fetched.
    #[must_use]
    pub fn fallback(url: &str) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image: String::new(),
            link_type: LinkType::Website,
            url: url.to_string(),
        }
    }
}

/// Fetches a page and derives metadata from it. Implementations never fail;
/// errors are logged and the fallback result returned.
#[async_trait::async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> ExtractedMetadata;
}

/// Extractor backed by a plain HTTP GET and Open Graph tag scanning.
#[derive(Clone)]
pub struct OpenGraphClient {
    client: Client,
}

impl OpenGraphClient {
    /// Creates a client with its own connection pool.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ExtractorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client })
    }

    #[must_use]
    pub const fn with_shared_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl MetadataExtractor for OpenGraphClient {
    async fn extract(&self, url: &str) -> ExtractedMetadata {
        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                let reason = failure_reason(&e);
                warn!(url, reason, error = %e, "Metadata extraction failed");
                metrics::counter!("link_metadata_extractions_total", "outcome" => reason)
                    .increment(1);
                return ExtractedMetadata::fallback(url);
            }
        };

        let page = parse_metadata(&body);
        debug!(url, title = %page.title, "Extracted page metadata");
        metrics::counter!("link_metadata_extractions_total", "outcome" => "success").increment(1);

        ExtractedMetadata {
            title: page.title,
            description: page.description,
            image: page.image,
            link_type: LinkType::Website,
            url: url.to_string(),
        }
    }
}

fn failure_reason(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timeout"
    } else if err.is_status() {
        "status"
    } else if err.is_builder() {
        "invalid_url"
    } else if err.is_connect() {
        "connect"
    } else {
        "error"
    }
}
