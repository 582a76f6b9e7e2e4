use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use super::dto::ErrorBody;
use crate::error::MonitorError;

/// Any handler failure, rendered as `{status: "error", message}`.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.downcast_ref::<MonitorError>() {
            Some(MonitorError::UnknownRoute(_)) | Some(MonitorError::NoData) => {
                StatusCode::NOT_FOUND
            }
            Some(MonitorError::PayloadTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Some(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        let body = ErrorBody::new(self.0.to_string());
        (status, Json(body)).into_response()
    }
}
