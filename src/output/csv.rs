//! CSV export
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet software
//! detects the encoding of the (often CJK) titles.

use crate::crawler::VideoRecord;
use crate::output::traits::{OutputResult, COLUMNS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const BOM: &str = "\u{feff}";

/// Writes the records as CSV to `path`
pub fn write_csv(records: &[VideoRecord], path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_csv(records).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Formats the records as CSV, header first
pub fn format_csv(records: &[VideoRecord]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&COLUMNS.join(","));
    out.push('\n');

    for record in records {
        out.push_str(&escape_field(&record.title));
        out.push(',');
        out.push_str(&record.play_count.to_string());
        out.push(',');
        out.push_str(&escape_field(&record.duration_label));
        out.push('\n');
    }

    out
}

/// Quotes a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
