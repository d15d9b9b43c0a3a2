//! Progress reporting

/// Receives `(pages_completed, pages_total)` after every fetched page
pub trait ProgressSink: Send + Sync {
    fn report(&self, pages_completed: u32, pages_total: u32);
}

/// Reports progress through the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, pages_completed: u32, pages_total: u32) {
        tracing::info!("Fetched page {}/{}", pages_completed, pages_total);
    }
}
