use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{MonitorError, Result};
use crate::model::route::RouteRegistry;

/// A visitor profile. Profiles are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub preferred_route: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Validates the submitted fields against the registry and stamps the creation time.
    pub fn new(name: &str, preferred_route: &str, routes: &RouteRegistry) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MonitorError::InvalidProfile("name must not be empty".into()));
        }
        if !routes.contains(preferred_route) {
            return Err(MonitorError::InvalidProfile(format!(
                "unknown preferred route '{preferred_route}'"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            preferred_route: preferred_route.to_string(),
            created_at: Utc::now(),
        })
    }
}
