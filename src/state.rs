//! The monitor's owned state and the shared handle passed to request handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::aggregate::{AggregateSummary, aggregate_history};
use crate::error::{MonitorError, Result};
use crate::model::{HistoricalRecord, Profile, Route, RouteRegistry, Saturation};
use crate::output::{export_file_name, history_to_csv, upload_file_name};
use crate::parser::parse_history;
use crate::storage::FileStore;

/// Routes, profiles and history. All mutation goes through `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    routes: RouteRegistry,
    profiles: Vec<Profile>,
    history: Vec<HistoricalRecord>,
}

/// Counters shown on the dashboard and served by `/api/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_routes: usize,
    pub registered_profiles: usize,
    pub reports_today: u32,
    pub busiest_route: Option<String>,
    pub historical_records: usize,
}

/// Result of appending an upload to the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub records_count: usize,
    pub total_records: usize,
    pub aggregate: AggregateSummary,
}

impl Monitor {
    pub fn new(routes: RouteRegistry) -> Self {
        Self {
            routes,
            profiles: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn history(&self) -> &[HistoricalRecord] {
        &self.history
    }

    /// Simulates a live refresh by re-rolling every route.
    pub fn refresh_routes<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &RouteRegistry {
        self.routes.randomize_all(rng);
        &self.routes
    }

    pub fn report<R: Rng + ?Sized>(
        &mut self,
        code: &str,
        saturation: Saturation,
        rng: &mut R,
    ) -> Result<&Route> {
        self.routes.report(code, saturation, rng)
    }

    pub fn add_profile(&mut self, name: &str, preferred_route: &str) -> Result<&Profile> {
        let profile = Profile::new(name, preferred_route, &self.routes)?;
        self.profiles.push(profile);
        Ok(&self.profiles[self.profiles.len() - 1])
    }

    pub fn statistics<R: Rng + ?Sized>(&self, rng: &mut R) -> Statistics {
        Statistics {
            total_routes: self.routes.len(),
            registered_profiles: self.profiles.len(),
            reports_today: rng.gen_range(10..=50),
            busiest_route: self.routes.busiest().map(str::to_string),
            historical_records: self.history.len(),
        }
    }

    /// Appends already-parsed records and re-aggregates.
    pub fn ingest(&mut self, records: Vec<HistoricalRecord>) -> IngestSummary {
        let records_count = records.len();
        self.history.extend(records);
        let aggregate = aggregate_history(&mut self.routes, &self.history);
        IngestSummary {
            records_count,
            total_records: self.history.len(),
            aggregate,
        }
    }

    /// Re-aggregates the accumulated history.
    pub fn process(&mut self) -> Result<AggregateSummary> {
        if self.history.is_empty() {
            return Err(MonitorError::NoData);
        }
        Ok(aggregate_history(&mut self.routes, &self.history))
    }
}

/// Handler state. One lock guards all three stores so a read-then-write
/// (a report, an upload) happens as a single step.
pub struct AppState {
    pub monitor: RwLock<Monitor>,
    pub files: Box<dyn FileStore>,
    upload_seq: AtomicU64,
    export_seq: AtomicU64,
}

/// Written export: the file name and how many records it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub filename: String,
    pub records: usize,
}

impl AppState {
    pub fn new(monitor: Monitor, files: impl FileStore + 'static) -> Arc<Self> {
        Arc::new(Self {
            monitor: RwLock::new(monitor),
            files: Box::new(files),
            upload_seq: AtomicU64::new(0),
            export_seq: AtomicU64::new(0),
        })
    }

    /// Parses an upload, keeps a copy of the raw file and folds it into the history.
    ///
    /// The history is only touched once the whole document has parsed.
    pub async fn ingest_csv(&self, bytes: &[u8]) -> anyhow::Result<IngestSummary> {
        let records = parse_history(bytes)?;

        let seq = self.upload_seq.fetch_add(1, Ordering::Relaxed);
        let name = upload_file_name(&Local::now(), seq);
        self.files.put(&name, bytes).await?;

        let summary = self.monitor.write().await.ingest(records);
        info!(
            file = %name,
            added = summary.records_count,
            total = summary.total_records,
            "Historical data ingested"
        );
        Ok(summary)
    }

    /// Writes the history to a timestamped CSV file.
    pub async fn export(&self) -> anyhow::Result<ExportSummary> {
        let (bytes, records) = {
            let monitor = self.monitor.read().await;
            (history_to_csv(monitor.history())?, monitor.history().len())
        };

        let seq = self.export_seq.fetch_add(1, Ordering::Relaxed);
        let filename = export_file_name(&Local::now(), seq);
        self.files.put(&filename, &bytes).await?;
        info!(file = %filename, records, "History exported");
        Ok(ExportSummary { filename, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EstimatedMinutes;
    use chrono::{NaiveDate, NaiveTime};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rec(route: &str, saturation: Saturation, minutes: i64) -> HistoricalRecord {
        HistoricalRecord {
            route: route.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            saturation,
            estimated_minutes: EstimatedMinutes::new(minutes).unwrap(),
        }
    }

    #[test]
    fn test_statistics() {
        let mut m = Monitor::default();
        m.add_profile("Ana", "A1").unwrap();
        m.ingest(vec![rec("ZZ", Saturation::Low, 20)]);

        let stats = m.statistics(&mut StdRng::seed_from_u64(3));
        assert_eq!(stats.total_routes, 5);
        assert_eq!(stats.registered_profiles, 1);
        assert!((10..=50).contains(&stats.reports_today));
        assert_eq!(stats.busiest_route.as_deref(), Some("T1"));
        assert_eq!(stats.historical_records, 1);
    }

    #[test]
    fn test_ingest_counts_and_aggregates() {
        let mut m = Monitor::default();
        let first = m.ingest(vec![rec("T1", Saturation::High, 45)]);
        assert_eq!(first.records_count, 1);
        assert_eq!(first.total_records, 1);

        let second = m.ingest(vec![
            rec("T1", Saturation::Medium, 35),
            rec("T1", Saturation::Medium, 25),
        ]);
        assert_eq!(second.records_count, 2);
        assert_eq!(second.total_records, 3);

        let t1 = m.routes().get("T1").unwrap();
        assert_eq!(t1.saturation, Saturation::Medium);
        assert_eq!(t1.estimated_minutes.get(), 35);
    }

    #[test]
    fn test_process_without_history() {
        let mut m = Monitor::default();
        assert!(matches!(m.process(), Err(MonitorError::NoData)));
    }

    #[test]
    fn test_process_matches_ingest_aggregation() {
        let mut m = Monitor::default();
        m.ingest(vec![rec("S1", Saturation::Low, 21), rec("S1", Saturation::Low, 30)]);
        m.report("S1", Saturation::High, &mut StdRng::seed_from_u64(9))
            .unwrap();

        let summary = m.process().unwrap();
        assert_eq!(summary.routes_updated, vec!["S1".to_string()]);
        let s1 = m.routes().get("S1").unwrap();
        assert_eq!(s1.saturation, Saturation::Low);
        assert_eq!(s1.estimated_minutes.get(), 25);
    }

    #[test]
    fn test_profiles_are_appended() {
        let mut m = Monitor::default();
        m.add_profile("Ana", "T1").unwrap();
        m.add_profile("Ana", "T1").unwrap();
        assert_eq!(m.profiles().len(), 2);
        assert!(m.add_profile("", "T1").is_err());
        assert_eq!(m.profiles().len(), 2);
    }

    #[tokio::test]
    async fn test_back_to_back_exports_write_separate_files() {
        let dir = std::env::temp_dir().join("saturation_monitor_state_exports");
        let _ = std::fs::remove_dir_all(&dir);
        let files = crate::storage::LocalDirStore::create(&dir).await.unwrap();

        let mut monitor = Monitor::default();
        monitor.ingest(vec![rec("T1", Saturation::High, 45)]);
        let state = AppState::new(monitor, files);

        let first = state.export().await.unwrap();
        let second = state.export().await.unwrap();
        assert_ne!(first.filename, second.filename);
        assert!(dir.join(&first.filename).exists());
        assert!(dir.join(&second.filename).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
