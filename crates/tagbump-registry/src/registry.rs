use crate::types::RegistryResult;
use serde::Deserialize;
use std::time::Duration;
use tagbump_core::config::{RegistryConfig, MAX_PAGE_SIZE};
use tagbump_core::{Error, Result};
use tokio::sync::OnceCell;
use tracing::{debug, trace};

/// Client for the Docker Hub tag-listing API of a single upstream repository
///
/// The listing is requested at most once per client; later calls to
/// [`RegistryClient::fetch_results`] return the cached result list.
pub struct RegistryClient {
    client: reqwest::Client,
    /// Base URL of the registry API (e.g., "https://hub.docker.com")
    base_url: String,
    /// Repository whose tags are listed (e.g., "mambaorg/micromamba")
    repository: String,
    page_size: u32,
    results: OnceCell<Vec<RegistryResult>>,
}

impl RegistryClient {
    /// Create a new registry client with default timeout and user agent
    pub fn new(base_url: impl Into<String>, repository: impl Into<String>) -> Result<Self> {
        Self::from_config(&RegistryConfig {
            url: base_url.into(),
            repository: repository.into(),
            ..RegistryConfig::default()
        })
    }

    /// Create a registry client from the `registry` configuration section
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| Error::registry(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            results: OnceCell::new(),
        })
    }

    /// Override the page size (capped at 200)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Repository whose tags this client lists
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Full URL of the tag-listing request
    pub fn tags_url(&self) -> String {
        format!(
            "{}/v2/repositories/{}/tags?page_size={}",
            self.base_url, self.repository, self.page_size
        )
    }

    /// List the upstream tags, newest first as returned by the registry
    pub async fn fetch_results(&self) -> Result<&[RegistryResult]> {
        let results = self
            .results
            .get_or_try_init(|| self.request_results())
            .await?;
        Ok(results.as_slice())
    }

    /// Whether the listing has already been fetched
    pub fn is_cached(&self) -> bool {
        self.results.initialized()
    }

    async fn request_results(&self) -> Result<Vec<RegistryResult>> {
        let url = self.tags_url();
        debug!("Listing tags from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::registry(format!("failed to connect to {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::registry(format!(
                "registry returned {} for {}: {}",
                status,
                url,
                if body.is_empty() {
                    "(no response body)".to_string()
                } else {
                    body
                }
            )));
        }

        let tags_response: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::registry(format!("failed to parse tags response: {}", e)))?;

        trace!("Found {} tags", tags_response.results.len());
        Ok(tags_response.results)
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<RegistryResult>,
}
