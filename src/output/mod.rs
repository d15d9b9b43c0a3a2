//! Output module for persisting a finished crawl
//!
//! This module handles:
//! - CSV export of the normalized records
//! - JSON export of the normalized records
//! - Raw JSON export of the platform objects
//!
//! Only a successful crawl reaches this module. If one of the files cannot
//! be written, the files already written for the same crawl are removed so
//! no half-exported batch is left behind.

mod csv;
mod json;
mod traits;

pub use csv::{format_csv, write_csv};
pub use json::{write_json, write_raw_json};
pub use traits::{ExportRow, OutputError, OutputResult, COLUMNS};

use crate::config::OutputConfig;
use crate::crawler::AggregateResult;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Paths of the files written for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub raw_json: Option<PathBuf>,
}

impl OutputPaths {
    /// All written paths, in csv/json/raw order
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.csv, &self.json, &self.raw_json]
            .into_iter()
            .flatten()
    }
}

/// File stem shared by every export of one crawl: `up_{mid}_{YYYYmmdd_HHMMSS}`
pub fn file_stem(creator_id: &str, timestamp: &DateTime<Local>) -> String {
    format!("up_{}_{}", creator_id, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Writes the enabled exports for a finished crawl
///
/// # Arguments
///
/// * `aggregate` - The crawl result
/// * `creator_id` - Used in the file names
/// * `config` - Target directory and enabled formats
/// * `timestamp` - Used in the file names
///
/// # Returns
///
/// * `Ok(OutputPaths)` - Every enabled file was written
/// * `Err(OutputError)` - A write failed; nothing from this batch remains
pub fn write_outputs(
    aggregate: &AggregateResult,
    creator_id: &str,
    config: &OutputConfig,
    timestamp: &DateTime<Local>,
) -> OutputResult<OutputPaths> {
    let dir = Path::new(&config.directory);
    std::fs::create_dir_all(dir)?;

    let stem = file_stem(creator_id, timestamp);
    let mut paths = OutputPaths::default();

    if let Err(e) = write_enabled(aggregate, config, dir, &stem, &mut paths) {
        for path in paths.iter() {
            if let Err(remove_err) = std::fs::remove_file(path) {
                tracing::warn!("Failed to remove {}: {}", path.display(), remove_err);
            }
        }
        return Err(e);
    }

    for path in paths.iter() {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(paths)
}

// Each path is recorded before writing so a partially written file is
// cleaned up too.
fn write_enabled(
    aggregate: &AggregateResult,
    config: &OutputConfig,
    dir: &Path,
    stem: &str,
    paths: &mut OutputPaths,
) -> OutputResult<()> {
    if config.csv {
        let path = dir.join(format!("{}.csv", stem));
        paths.csv = Some(path.clone());
        write_csv(aggregate.records(), &path)?;
    }

    if config.json {
        let path = dir.join(format!("{}.json", stem));
        paths.json = Some(path.clone());
        write_json(aggregate.records(), &path)?;
    }

    if config.raw_json {
        let path = dir.join(format!("{}_raw.json", stem));
        paths.raw_json = Some(path.clone());
        write_raw_json(aggregate.raw_items(), &path)?;
    }

    Ok(())
}
