//! CSV ingest of telemetry data sets.
//!
//! Layout:
//!
//! ```text
//! timestamp,SOLAR,USAGE,METER
//! units,W,kW,kWh
//! 2024-03-01T00:00:00Z,120.5,,14.2
//! 2024-03-01T00:01:00Z,118.0,0.4,14.2
//! ```
//!
//! - the first column is the time base: epoch seconds or an RFC 3339 /
//!   `YYYY-MM-DD HH:MM:SS` (UTC) timestamp
//! - an optional second row starting with `units` labels each column
//! - empty, `null` and `nan` cells are missing samples
//! - rows with an unreadable timestamp are skipped and reported
//!
//! No analysis happens here.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{DataSet, Series, TimeBase};
use crate::error::AppError;

const UNITS_MARKER: &str = "units";
const MISSING_TOKENS: &[&str] = &["", "null", "nan", "none", "na"];

/// How cell values map onto missing samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Only empty / `null` / `nan` cells are missing.
    #[default]
    NullOnly,
    /// Also treat an exact `0` reading as missing (legacy feeds that encode
    /// gaps as zero).
    NullOrZero,
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the data set plus bookkeeping about what was read.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub data: DataSet,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Open and parse a CSV data set. The data set is named after the file stem.
pub fn load_data_set(path: &Path, policy: MissingPolicy) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let ingested = read_data_set(file, &name, policy)?;
    log::info!(
        "loaded '{}': {} series, {} of {} rows used",
        path.display(),
        ingested.data.len(),
        ingested.rows_used,
        ingested.rows_read
    );
    Ok(ingested)
}

/// Parse a CSV data set from any reader.
pub fn read_data_set<R: Read>(reader: R, name: &str, policy: MissingPolicy) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = series_names(&headers)?;

    let mut units = vec![String::new(); names.len()];
    let mut stamps = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if idx == 0 && is_units_row(&record) {
            for (unit, cell) in units.iter_mut().zip(record.iter().skip(1)) {
                *unit = cell.to_string();
            }
            continue;
        }
        rows_read += 1;

        let Some(stamp) = record.get(0).and_then(parse_timestamp) else {
            row_errors.push(RowError {
                line,
                message: format!("unreadable timestamp '{}'", record.get(0).unwrap_or("")),
            });
            continue;
        };

        stamps.push(stamp);
        for (col, column) in columns.iter_mut().enumerate() {
            let cell = record.get(col + 1).unwrap_or("");
            let value = match parse_cell(cell, policy) {
                Ok(v) => v,
                Err(message) => {
                    row_errors.push(RowError {
                        line,
                        message: format!("{}: {message}", names[col]),
                    });
                    None
                }
            };
            column.push(value);
        }
    }

    let rows_used = stamps.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No data rows with a readable timestamp."));
    }
    for err in &row_errors {
        log::warn!("line {}: {}", err.line, err.message);
    }

    let time = TimeBase::new(stamps).map_err(|e| AppError::new(2, format!("Invalid time column: {e}")))?;
    let mut data = DataSet::new(name, time);
    for ((name, unit), samples) in names.into_iter().zip(units).zip(columns) {
        data.insert(Series::new(name, unit, samples))?;
    }

    Ok(IngestedData {
        data,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn series_names(headers: &StringRecord) -> Result<Vec<String>, AppError> {
    if headers.len() < 2 {
        return Err(AppError::new(
            2,
            "CSV needs a time column followed by at least one series column.",
        ));
    }
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(headers.len() - 1);
    for raw in headers.iter().skip(1) {
        let name = normalize_header_name(raw);
        if name.is_empty() {
            return Err(AppError::new(2, "Empty series name in CSV header."));
        }
        if !seen.insert(name.clone()) {
            return Err(AppError::new(2, format!("Duplicate series name in CSV header: `{name}`")));
        }
        names.push(name);
    }
    Ok(names)
}

fn normalize_header_name(name: &str) -> String {
    // Some spreadsheet exports prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn is_units_row(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|cell| cell.eq_ignore_ascii_case(UNITS_MARKER))
}

fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim().trim_start_matches('\u{feff}');
    if let Ok(secs) = raw.parse::<f64>() {
        return secs.is_finite().then_some(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(epoch_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| {
            let utc = dt.and_utc();
            epoch_seconds(utc.timestamp(), utc.timestamp_subsec_nanos())
        })
}

fn epoch_seconds(secs: i64, nanos: u32) -> f64 {
    secs as f64 + f64::from(nanos) * 1e-9
}

fn parse_cell(raw: &str, policy: MissingPolicy) -> Result<Option<f64>, String> {
    if MISSING_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("not a number: '{raw}'"))?;
    if !value.is_finite() {
        return Ok(None);
    }
    if policy == MissingPolicy::NullOrZero && value == 0.0 {
        return Ok(None);
    }
    Ok(Some(value))
}
