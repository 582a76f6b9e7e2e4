//! One historical observation of a route, as read from or written to CSV.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::types::{EstimatedMinutes, Saturation};

/// Canonical column order for CSV input and output.
pub const COLUMNS: [&str; 5] = ["route", "date", "time", "saturation", "estimated_minutes"];

/// Column names written by the earlier Spanish-language exports, same order as [`COLUMNS`].
pub const LEGACY_COLUMNS: [&str; 5] = ["ruta", "fecha", "hora", "saturacion", "tiempo_estimado"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(alias = "ruta")]
    pub route: String,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "hora", with = "clock")]
    pub time: NaiveTime,
    #[serde(alias = "saturacion")]
    pub saturation: Saturation,
    #[serde(alias = "tiempo_estimado")]
    pub estimated_minutes: EstimatedMinutes,
}

/// `HH:MM` or `HH:MM:SS` both ways; seconds are written only when non-zero.
mod clock {
    use super::*;

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        if t.second() == 0 {
            s.collect_str(&t.format("%H:%M"))
        } else {
            s.collect_str(&t.format("%H:%M:%S"))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_row() {
        let json = r#"{"ruta":"T1","fecha":"2024-01-15","hora":"08:30","saturacion":"alta","tiempo_estimado":45}"#;
        let rec: HistoricalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.route, "T1");
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(rec.time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(rec.saturation, Saturation::High);
        assert_eq!(rec.estimated_minutes.get(), 45);
    }

    #[test]
    fn test_time_accepts_seconds() {
        let json = r#"{"route":"A1","date":"2024-01-15","time":"08:35:10","saturation":"low","estimated_minutes":25}"#;
        let rec: HistoricalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.time, NaiveTime::from_hms_opt(8, 35, 10).unwrap());
    }

    #[test]
    fn test_serialize_uses_short_time() {
        let rec = HistoricalRecord {
            route: "U1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            saturation: Saturation::Low,
            estimated_minutes: EstimatedMinutes::new(30).unwrap(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"time\":\"09:00\""));
        assert!(json.contains("\"saturation\":\"low\""));
    }

    #[test]
    fn test_serialize_keeps_seconds() {
        let rec = HistoricalRecord {
            route: "T1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(8, 30, 45).unwrap(),
            saturation: Saturation::High,
            estimated_minutes: EstimatedMinutes::new(45).unwrap(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"time\":\"08:30:45\""));
    }
}
