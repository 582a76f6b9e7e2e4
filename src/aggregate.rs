//! Recomputes route state from accumulated historical records.
//!
//! For every registry route with at least one matching record, the saturation
//! becomes the most frequent label and the travel time becomes the mean of the
//! recorded minutes, rounded down. Ties on the most frequent label go to the
//! label seen first in history order. Routes without records keep their state.

use serde::Serialize;
use tracing::debug;

use crate::model::{EstimatedMinutes, HistoricalRecord, RouteRegistry, Saturation};

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub records_processed: usize,
    /// Registry codes that had records, in registry order.
    pub routes_updated: Vec<String>,
    /// Codes found in history that the registry does not know, first-seen order.
    pub unknown_routes: Vec<String>,
}

/// Applies the history to the registry in place.
pub fn aggregate_history(routes: &mut RouteRegistry, history: &[HistoricalRecord]) -> AggregateSummary {
    let mut routes_updated = Vec::new();

    let codes: Vec<String> = routes.codes().map(str::to_string).collect();
    for code in codes {
        let matching: Vec<&HistoricalRecord> = history.iter().filter(|r| r.route == code).collect();
        if matching.is_empty() {
            continue;
        }

        let Some(saturation) = most_frequent(matching.iter().map(|r| r.saturation)) else {
            continue;
        };
        let Some(minutes) = floor_mean(matching.iter().map(|r| r.estimated_minutes.get())) else {
            continue;
        };

        if let Some(route) = routes.get_mut(&code) {
            debug!(
                route = %code,
                samples = matching.len(),
                %saturation,
                minutes,
                "Route updated from history"
            );
            route.saturation = saturation;
            // mean of in-range values is itself in range
            route.estimated_minutes = EstimatedMinutes(minutes);
            routes_updated.push(code);
        }
    }

    let mut unknown_routes: Vec<String> = Vec::new();
    for rec in history {
        if !routes.contains(&rec.route) && !unknown_routes.contains(&rec.route) {
            unknown_routes.push(rec.route.clone());
        }
    }

    AggregateSummary {
        records_processed: history.len(),
        routes_updated,
        unknown_routes,
    }
}

/// Most frequent level; among equally frequent levels the first one seen wins.
pub fn most_frequent(levels: impl IntoIterator<Item = Saturation>) -> Option<Saturation> {
    // (level, count) in first-seen order
    let mut counts: Vec<(Saturation, usize)> = Vec::with_capacity(Saturation::ALL.len());
    for level in levels {
        match counts.iter_mut().find(|(l, _)| *l == level) {
            Some((_, n)) => *n += 1,
            None => counts.push((level, 1)),
        }
    }

    let mut best: Option<(Saturation, usize)> = None;
    for (level, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((level, n));
        }
    }
    best.map(|(level, _)| level)
}

/// Arithmetic mean rounded down. Returns `None` for empty input.
pub fn floor_mean(values: impl IntoIterator<Item = u32>) -> Option<u32> {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(s, c), v| (s + v as u64, c + 1));
    if count == 0 {
        return None;
    }
    Some((sum / count) as u32)
}
