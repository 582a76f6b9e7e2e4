//! CSV parser for uploaded historical observations.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::model::HistoricalRecord;
use crate::model::record::{COLUMNS, LEGACY_COLUMNS};

/// Checks the client-supplied file name: it must be present and end in `.csv`.
pub fn ensure_csv_filename(file_name: Option<&str>) -> Result<()> {
    let name = file_name.map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(MonitorError::EmptyFilename);
    }
    if !name.to_ascii_lowercase().ends_with(".csv") {
        return Err(MonitorError::NotCsv);
    }
    Ok(())
}

/// Decodes a CSV document into historical records.
///
/// The header row must name every required column, using either the current
/// or the legacy names. Any malformed row rejects the whole document.
///
/// # Errors
///
/// [`MonitorError::EmptyUpload`] for an empty body, [`MonitorError::MissingColumns`]
/// when the header lacks a column, [`MonitorError::InvalidRow`] for the first bad row.
pub fn parse_history(bytes: &[u8]) -> Result<Vec<HistoricalRecord>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(MonitorError::EmptyUpload);
    }

    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers = rdr.headers().map_err(row_error)?.clone();
    check_columns(&headers)?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: HistoricalRecord = result.map_err(row_error)?;
        records.push(record);
    }

    debug!(rows = records.len(), "CSV parsed");
    Ok(records)
}

fn check_columns(headers: &StringRecord) -> Result<()> {
    let missing: Vec<String> = COLUMNS
        .iter()
        .zip(LEGACY_COLUMNS.iter())
        .filter(|(current, legacy)| !headers.iter().any(|h| h == **current || h == **legacy))
        .map(|(current, _)| current.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MonitorError::MissingColumns(missing))
    }
}

fn row_error(e: csv::Error) -> MonitorError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    MonitorError::InvalidRow {
        line,
        reason: e.to_string(),
    }
}
