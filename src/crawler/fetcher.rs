//! HTTP fetcher implementation
//!
//! This module issues the single signed GET that retrieves one page of a
//! creator's videos:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Signing the page parameters through the request signer
//! - Attaching the session cookies
//! - Classifying transport, status and envelope failures
//!
//! There is no retry logic here. Any failure is returned to the
//! coordinator, which abandons the whole crawl.

use crate::config::{CrawlerConfig, EndpointConfig, FingerprintConfig};
use crate::crawler::types::{PageRequest, PageResponse};
use crate::credentials::CredentialSet;
use crate::signing::RequestSigner;
use crate::{ConfigError, FetchError};
use async_trait::async_trait;
use reqwest::header::{COOKIE, REFERER};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Anything that can produce one page of search results
///
/// The coordinator only depends on this trait, so it can be driven by a
/// fabricated source in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(
        &self,
        creator_id: &str,
        page_number: u32,
        credentials: &CredentialSet,
    ) -> Result<PageResponse, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch(
        &self,
        creator_id: &str,
        page_number: u32,
        credentials: &CredentialSet,
    ) -> Result<PageResponse, FetchError> {
        (**self).fetch(creator_id, page_number, credentials).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Timeouts
/// * `endpoint` - User agent sent with every request
///
/// # Example
///
/// ```no_run
/// use vlist_crawler::config::Config;
/// use vlist_crawler::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.endpoint).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    endpoint: &EndpointConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(endpoint.user_agent.as_str())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages from the space search endpoint
pub struct PageFetcher {
    client: Client,
    search_url: Url,
    referer: String,
    fingerprint: FingerprintConfig,
    signer: Arc<dyn RequestSigner>,
}

impl PageFetcher {
    /// Creates a fetcher for the configured endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(PageFetcher)` - Ready to fetch
    /// * `Err(ConfigError)` - The search URL could not be parsed
    pub fn new(
        client: Client,
        endpoint: &EndpointConfig,
        fingerprint: FingerprintConfig,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, ConfigError> {
        let search_url = Url::parse(&endpoint.search_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search_url: {}", e)))?;

        Ok(Self {
            client,
            search_url,
            referer: endpoint.referer.clone(),
            fingerprint,
            signer,
        })
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(
        &self,
        creator_id: &str,
        page_number: u32,
        credentials: &CredentialSet,
    ) -> Result<PageResponse, FetchError> {
        let params = PageRequest::new(creator_id, page_number, &self.fingerprint).to_params();
        let signed = self
            .signer
            .sign(params)
            .await
            .map_err(|source| FetchError::Signing {
                page: page_number,
                source,
            })?;

        tracing::debug!("Requesting page {} for creator {}", page_number, creator_id);

        let mut request = self
            .client
            .get(self.search_url.clone())
            .query(&signed)
            .header(COOKIE, credentials.cookie_header());
        if !self.referer.is_empty() {
            request = request.header(REFERER, self.referer.as_str());
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            page: page_number,
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page: page_number,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            page: page_number,
            source,
        })?;

        PageResponse::from_body(page_number, &body)
    }
}
