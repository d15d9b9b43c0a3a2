//! JSON exports: normalized rows and untouched platform records

use crate::crawler::VideoRecord;
use crate::output::traits::{ExportRow, OutputResult};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the records as a pretty JSON array of rows
pub fn write_json(records: &[VideoRecord], path: &Path) -> OutputResult<()> {
    let rows: Vec<ExportRow<'_>> = records.iter().map(ExportRow::from).collect();
    write_pretty(&rows, path)
}

/// Writes the raw platform objects as a pretty JSON array
pub fn write_raw_json(items: &[Value], path: &Path) -> OutputResult<()> {
    write_pretty(items, path)
}

fn write_pretty<T: serde::Serialize + ?Sized>(value: &T, path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
