//! Crawler module for the paginated video search
//!
//! This module contains the core crawling logic, including:
//! - Request and response shapes for the search endpoint
//! - Signed, authenticated page fetching
//! - Sequential, paced page orchestration
//! - Progress reporting

mod coordinator;
mod fetcher;
mod progress;
mod types;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, PageFetcher, PageSource};
pub use progress::{LogProgress, ProgressSink};
pub use types::{page_count, AggregateResult, PageInfo, PageRequest, PageResponse, VideoRecord};

use crate::config::Config;
use crate::credentials::CredentialSet;
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl for one creator
///
/// This is the main entry point. It will:
/// 1. Check the creator id and credentials
/// 2. Build the HTTP client, signer and fetcher
/// 3. Fetch page 1 and work out how many pages exist
/// 4. Fetch the remaining pages in order, pausing between them
/// 5. Return every video in page order
///
/// `progress` is notified after every fetched page.
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed; nothing was collected
pub async fn crawl(
    config: &Config,
    creator_id: &str,
    credentials: &CredentialSet,
    progress: &dyn ProgressSink,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, CrawlError> {
    run_crawl(config, creator_id, credentials, progress, cancel).await
}
