//! Export results as JSON and series as CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Series, TimeBase};
use crate::error::AppError;

/// Pretty JSON for any report type.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(2, format!("Failed to encode JSON: {e}")))
}

/// Write any report type to a JSON file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::new(2, format!("Failed to write JSON: {e}")))?;
    Ok(())
}

/// Write a time base and aligned series to a CSV file (same layout as ingest).
pub fn write_series_csv(path: &Path, time: &TimeBase, series: &[&Series]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(file, time, series)
}

/// Write `timestamp,NAME…`, a `units` row, then one row per time stamp.
/// Missing samples are written as empty cells.
pub fn write_series<W: Write>(out: W, time: &TimeBase, series: &[&Series]) -> Result<(), AppError> {
    if let Some(bad) = series.iter().find(|s| s.len() != time.len()) {
        return Err(AppError::new(
            2,
            format!(
                "Series '{}' has {} samples for {} time stamps.",
                bad.name,
                bad.len(),
                time.len()
            ),
        ));
    }

    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV: {e}"));
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["timestamp".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    writer.write_record(&header).map_err(write_err)?;

    let mut units = vec!["units".to_string()];
    units.extend(series.iter().map(|s| s.unit.clone()));
    writer.write_record(&units).map_err(write_err)?;

    for (i, t) in time.as_slice().iter().enumerate() {
        let mut row = vec![t.to_string()];
        row.extend(series.iter().map(|s| s.get(i).map(|v| v.to_string()).unwrap_or_default()));
        writer.write_record(&row).map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
