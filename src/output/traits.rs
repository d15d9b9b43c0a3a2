//! Output error types and the export row shape

use crate::crawler::VideoRecord;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Column headers of the tabular exports: title, play count, duration
pub const COLUMNS: [&str; 3] = ["标题", "播放量", "时长"];

/// One exported row, keyed by the column headers
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    #[serde(rename = "标题")]
    pub title: &'a str,

    #[serde(rename = "播放量")]
    pub play_count: u64,

    #[serde(rename = "时长")]
    pub duration: &'a str,
}

impl<'a> From<&'a VideoRecord> for ExportRow<'a> {
    fn from(record: &'a VideoRecord) -> Self {
        Self {
            title: &record.title,
            play_count: record.play_count,
            duration: &record.duration_label,
        }
    }
}
