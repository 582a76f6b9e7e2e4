//! Domain types: routes, saturation levels, profiles and historical records.

pub mod profile;
pub mod record;
pub mod route;
pub mod types;

pub use profile::Profile;
pub use record::HistoricalRecord;
pub use route::{Route, RouteRegistry};
pub use types::{EstimatedMinutes, GeoPoint, Saturation};
