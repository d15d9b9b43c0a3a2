//! Crawler coordinator - main crawl orchestration logic
//!
//! The crawl runs as a small state machine:
//!
//! 1. **Init** - reject an empty creator id or an incomplete credential set
//!    before touching the network
//! 2. **FirstPage** - fetch page 1 and derive the page count from its
//!    paging metadata
//! 3. **SubsequentPages** - pause, then fetch pages 2..=N one at a time,
//!    appending each page's items in order
//! 4. **Done** / **Aborted** - return everything, or nothing
//!
//! Any fetch failure aborts the crawl and the items collected so far are
//! dropped; a partial catalogue is never returned as if it were complete.

use crate::config::Config;
use crate::credentials::CredentialSet;
use crate::crawler::fetcher::{build_http_client, PageFetcher, PageSource};
use crate::crawler::progress::ProgressSink;
use crate::crawler::types::AggregateResult;
use crate::signing::WbiSigner;
use crate::{CrawlError, FetchError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub creator_id: String,

    /// Number of pages fetched
    pub page_count: u32,

    /// Item count the platform reported on page 1
    pub reported_total: u64,

    pub aggregate: AggregateResult,

    pub elapsed: Duration,
}

impl CrawlOutcome {
    /// One-line, human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Collected {} videos for creator {} across {} page(s) in {:.1}s",
            self.aggregate.len(),
            self.creator_id,
            self.page_count,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Main crawl coordinator
pub struct Coordinator<S> {
    source: S,
    pacing: Duration,
    cancel: CancellationToken,
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a coordinator that pauses `pacing` before each page after the first
    pub fn new(source: S, pacing: Duration) -> Self {
        Self {
            source,
            pacing,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the crawl at the next pacing checkpoint
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls every page of a creator's catalogue
    ///
    /// # Arguments
    ///
    /// * `creator_id` - The creator whose videos are listed
    /// * `credentials` - Session cookies; checked before any request
    /// * `progress` - Notified after every fetched page
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Every page was fetched
    /// * `Err(CrawlError)` - Validation failed, a page failed, or the crawl was cancelled
    pub async fn crawl(
        &self,
        creator_id: &str,
        credentials: &CredentialSet,
        progress: &dyn ProgressSink,
    ) -> Result<CrawlOutcome, CrawlError> {
        let creator_id = creator_id.trim();
        if creator_id.is_empty() {
            return Err(CrawlError::InvalidCreator);
        }
        credentials.validate()?;

        let start_time = Instant::now();
        tracing::info!("Starting crawl for creator {}", creator_id);

        let first = match self.source.fetch(creator_id, 1, credentials).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Aborting crawl for creator {} at page 1: {}", creator_id, e);
                return Err(e.into());
            }
        };
        let page_info = first.page_info;
        let page_count = match page_info.page_count() {
            Some(count) => count,
            None => {
                let detail = if page_info.page_size == 0 {
                    format!("page size is 0 for {} items", page_info.total_item_count)
                } else {
                    format!(
                        "{} items at {} per page exceed the page number range",
                        page_info.total_item_count, page_info.page_size
                    )
                };
                tracing::error!("Aborting crawl for creator {} at page 1: {}", creator_id, detail);
                return Err(FetchError::Envelope { page: 1, detail }.into());
            }
        };

        tracing::info!(
            "Creator {} has {} videos across {} page(s) of {}",
            creator_id,
            page_info.total_item_count,
            page_count,
            page_info.page_size
        );

        let mut aggregate = AggregateResult::new();
        aggregate.extend(first);
        progress.report(1, page_count);

        for page_number in 2..=page_count {
            self.pause().await?;

            let page = match self.source.fetch(creator_id, page_number, credentials).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        "Aborting crawl for creator {} at page {}/{}, discarding {} collected videos: {}",
                        creator_id,
                        page_number,
                        page_count,
                        aggregate.len(),
                        e
                    );
                    return Err(e.into());
                }
            };
            tracing::debug!("Page {} returned {} videos", page_number, page.items.len());

            aggregate.extend(page);
            progress.report(page_number, page_count);
        }

        if aggregate.len() as u64 != page_info.total_item_count {
            tracing::warn!(
                "Platform reported {} videos but {} were returned",
                page_info.total_item_count,
                aggregate.len()
            );
        }

        let outcome = CrawlOutcome {
            creator_id: creator_id.to_string(),
            page_count,
            reported_total: page_info.total_item_count,
            aggregate,
            elapsed: start_time.elapsed(),
        };
        tracing::info!("{}", outcome.summary());
        Ok(outcome)
    }

    /// Waits the pacing delay, returning early if the crawl is cancelled
    async fn pause(&self) -> Result<(), CrawlError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!("Crawl cancelled");
                Err(CrawlError::Cancelled)
            }
            _ = tokio::time::sleep(self.pacing) => Ok(()),
        }
    }
}

/// Runs a complete crawl against the configured platform endpoints
///
/// This builds the HTTP client, the WBI signer and the page fetcher from
/// `config`, then drives the coordinator, reporting to `progress`.
///
/// # Example
///
/// ```no_run
/// use vlist_crawler::config::Config;
/// use vlist_crawler::credentials::parse_credentials;
/// use vlist_crawler::crawler::{run_crawl, LogProgress};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = parse_credentials("SESSDATA=a; bili_jct=b; buvid3=c")?;
/// let outcome = run_crawl(
///     &Config::default(),
///     "546195",
///     &credentials,
///     &LogProgress,
///     CancellationToken::new(),
/// )
/// .await?;
/// println!("{}", outcome.summary());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    creator_id: &str,
    credentials: &CredentialSet,
    progress: &dyn ProgressSink,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, CrawlError> {
    let client = build_http_client(&config.crawler, &config.endpoint)?;
    let signer = WbiSigner::new(
        client.clone(),
        config.endpoint.nav_url.as_str(),
        config.endpoint.user_agent.as_str(),
        config.endpoint.referer.as_str(),
    );
    let fetcher = PageFetcher::new(
        client,
        &config.endpoint,
        config.fingerprint.clone(),
        Arc::new(signer),
    )?;

    let coordinator = Coordinator::new(
        fetcher,
        Duration::from_millis(config.crawler.pacing_delay_ms),
    )
    .with_cancellation(cancel);

    coordinator.crawl(creator_id, credentials, progress).await
}
