//! The fixed route table and the operations that mutate it in place.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::model::types::{EstimatedMinutes, GeoPoint, Saturation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub code: String,
    pub name: String,
    pub saturation: Saturation,
    pub estimated_minutes: EstimatedMinutes,
    #[serde(default)]
    pub path: Vec<GeoPoint>,
}

/// Ordered set of routes. Routes are never added or removed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    /// Builds a registry, rejecting an empty list or duplicate codes.
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        if routes.is_empty() {
            return Err(MonitorError::InvalidRegistry("no routes defined".into()));
        }
        let mut seen = HashSet::new();
        for r in &routes {
            if !seen.insert(r.code.as_str()) {
                return Err(MonitorError::InvalidRegistry(format!(
                    "duplicate route code '{}'",
                    r.code
                )));
            }
        }
        Ok(Self { routes })
    }

    /// Loads a registry from a JSON array of routes at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let routes: Vec<Route> = serde_json::from_str(&content)?;
        debug!(count = routes.len(), "Loaded routes from file");
        Ok(Self::new(routes)?)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.code.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn get(&self, code: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.code == code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| r.code == code)
    }

    /// Assigns every route a random saturation and a random travel time.
    pub fn randomize_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for route in &mut self.routes {
            route.saturation = Saturation::random(rng);
            route.estimated_minutes = EstimatedMinutes::random(rng);
        }
    }

    /// Applies a visitor report: sets the saturation and re-rolls the travel time.
    pub fn report<R: Rng + ?Sized>(
        &mut self,
        code: &str,
        saturation: Saturation,
        rng: &mut R,
    ) -> Result<&Route> {
        let route = self
            .get_mut(code)
            .ok_or_else(|| MonitorError::UnknownRoute(code.to_string()))?;
        route.saturation = saturation;
        route.estimated_minutes = EstimatedMinutes::random(rng);
        Ok(route)
    }

    /// Code of the route with the longest estimated time. Earlier routes win ties.
    pub fn busiest(&self) -> Option<&str> {
        let mut best: Option<&Route> = None;
        for r in &self.routes {
            if best.is_none_or(|b| r.estimated_minutes > b.estimated_minutes) {
                best = Some(r);
            }
        }
        best.map(|r| r.code.as_str())
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self {
            routes: default_routes(),
        }
    }
}

/// Serialized as an object keyed by route code, in registry order.
impl Serialize for RouteRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.routes.len()))?;
        for r in &self.routes {
            map.serialize_entry(&r.code, r)?;
        }
        map.end()
    }
}

fn route(code: &str, name: &str, saturation: Saturation, minutes: u32, path: &[(f64, f64)]) -> Route {
    Route {
        code: code.to_string(),
        name: name.to_string(),
        saturation,
        estimated_minutes: EstimatedMinutes(minutes),
        path: path.iter().map(|&(lat, lon)| GeoPoint(lat, lon)).collect(),
    }
}

fn default_routes() -> Vec<Route> {
    vec![
        route(
            "T1",
            "Transmilenio Línea Troncal",
            Saturation::High,
            45,
            &[(4.7110, -74.0721), (4.6486, -74.0637), (4.6097, -74.0817)],
        ),
        route(
            "A1",
            "Ruta Alimentadora Norte",
            Saturation::Medium,
            25,
            &[(4.7546, -74.0456), (4.7338, -74.0501), (4.7110, -74.0721)],
        ),
        route(
            "U1",
            "Urbano Centro",
            Saturation::Low,
            30,
            &[(4.6097, -74.0817), (4.6020, -74.0721), (4.5981, -74.0760)],
        ),
        route(
            "S1",
            "SITP Portal Sur",
            Saturation::High,
            40,
            &[(4.5961, -74.1470), (4.6050, -74.1190), (4.6097, -74.0817)],
        ),
        route(
            "B2",
            "Bus Chapinero",
            Saturation::Medium,
            35,
            &[(4.6486, -74.0637), (4.6373, -74.0657), (4.6280, -74.0640)],
        ),
    ]
}
