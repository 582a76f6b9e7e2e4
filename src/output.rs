//! CSV export of the accumulated history.

use chrono::{DateTime, TimeZone};
use csv::WriterBuilder;
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::model::HistoricalRecord;

/// Name of an export file, e.g. `historical_export_20240115_083000_0.csv`.
pub fn export_file_name<Tz: TimeZone>(at: &DateTime<Tz>, seq: u64) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("historical_export_{}_{}.csv", at.format("%Y%m%d_%H%M%S"), seq)
}

/// Name under which a raw upload is kept, e.g. `upload_20240115_083000_3.csv`.
pub fn upload_file_name<Tz: TimeZone>(at: &DateTime<Tz>, seq: u64) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("upload_{}_{}.csv", at.format("%Y%m%d_%H%M%S"), seq)
}

/// Serializes records as CSV with a header row in the canonical column order.
///
/// # Errors
///
/// [`MonitorError::NoData`] when `records` is empty; nothing is produced in that case.
pub fn history_to_csv(records: &[HistoricalRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(MonitorError::NoData);
    }

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MonitorError::Io(e.into_error()))?;

    debug!(records = records.len(), bytes = bytes.len(), "History serialized");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EstimatedMinutes, Saturation};
    use crate::parser::parse_history;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn sample() -> Vec<HistoricalRecord> {
        vec![
            HistoricalRecord {
                route: "T1".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
                saturation: Saturation::High,
                estimated_minutes: EstimatedMinutes::new(45).unwrap(),
            },
            HistoricalRecord {
                route: "ZZ".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
                time: NaiveTime::from_hms_opt(17, 5, 0).unwrap(),
                saturation: Saturation::Low,
                estimated_minutes: EstimatedMinutes::new(22).unwrap(),
            },
        ]
    }

    #[test]
    fn test_export_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 5).unwrap();
        assert_eq!(export_file_name(&at, 0), "historical_export_20240115_083005_0.csv");
        assert_ne!(export_file_name(&at, 0), export_file_name(&at, 1));
        assert_eq!(upload_file_name(&at, 2), "upload_20240115_083005_2.csv");
    }

    #[test]
    fn test_empty_history_is_no_data() {
        assert!(matches!(history_to_csv(&[]), Err(MonitorError::NoData)));
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = history_to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "route,date,time,saturation,estimated_minutes");
        assert_eq!(lines[1], "T1,2024-01-15,08:30,high,45");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_is_readable_by_parser() {
        let records = sample();
        let bytes = history_to_csv(&records).unwrap();
        assert_eq!(parse_history(&bytes).unwrap(), records);
    }

    #[test]
    fn test_export_preserves_seconds() {
        let csv = "route,date,time,saturation,estimated_minutes\n\
                   T1,2024-01-15,08:30:45,high,45\n\
                   T1,2024-01-15,09:00,medium,35\n";
        let records = parse_history(csv.as_bytes()).unwrap();
        let bytes = history_to_csv(&records).unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("T1,2024-01-15,08:30:45,high,45"));
        assert!(text.contains("T1,2024-01-15,09:00,medium,35"));
        assert_eq!(parse_history(&bytes).unwrap(), records);
    }
}
