//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(alias = "ruta")]
    pub route: String,
    #[serde(alias = "nivel")]
    pub saturation: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "ruta_frecuente")]
    pub preferred_route: String,
}

/// Successful response: a message plus endpoint-specific fields.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    status: &'static str,
    message: String,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

impl Success<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, Empty {})
    }
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    status: &'static str,
    message: String,
}

impl ErrorBody {
    pub fn new(message: String) -> Self {
        Self {
            status: "error",
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadData {
    pub records_count: usize,
    pub total_records: usize,
    pub routes_updated: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessData {
    pub records_processed: usize,
    pub routes_updated: Vec<String>,
    pub unknown_routes: Vec<String>,
}
