//! Value types shared by routes, reports and historical records.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Three-level crowding indicator for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Saturation {
    Low,
    Medium,
    High,
}

impl Saturation {
    pub const ALL: [Saturation; 3] = [Saturation::Low, Saturation::Medium, Saturation::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Saturation::Low => "low",
            Saturation::Medium => "medium",
            Saturation::High => "high",
        }
    }

    /// Draws a level uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Saturation {
    type Err = MonitorError;

    /// Accepts the English names and the legacy `baja`/`media`/`alta` labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "baja" => Ok(Saturation::Low),
            "medium" | "media" => Ok(Saturation::Medium),
            "high" | "alta" => Ok(Saturation::High),
            _ => Err(MonitorError::InvalidSaturation(s.to_string())),
        }
    }
}

impl TryFrom<String> for Saturation {
    type Error = MonitorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Estimated travel time in whole minutes, bounded to a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct EstimatedMinutes(pub(crate) u32);

impl EstimatedMinutes {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1440;

    /// Range used when a route's travel time is simulated.
    pub const RANDOM_RANGE: RangeInclusive<u32> = 20..=50;

    pub fn new(minutes: i64) -> Result<Self, MonitorError> {
        if minutes < Self::MIN as i64 || minutes > Self::MAX as i64 {
            return Err(MonitorError::InvalidMinutes(minutes));
        }
        Ok(Self(minutes as u32))
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::RANDOM_RANGE))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for EstimatedMinutes {
    type Error = MonitorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EstimatedMinutes> for u32 {
    fn from(value: EstimatedMinutes) -> Self {
        value.0
    }
}

impl fmt::Display for EstimatedMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(latitude, longitude)` point on a route's path, serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lon(&self) -> f64 {
        self.1
    }
}
