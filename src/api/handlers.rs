use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use bytes::Bytes;
use tracing::{debug, info};

use super::ApiError;
use super::dashboard;
use super::dto::{Empty, ProcessData, ProfileRequest, ReportRequest, Success, UploadData};
use crate::error::MonitorError;
use crate::model::{RouteRegistry, Saturation};
use crate::parser::ensure_csv_filename;
use crate::state::{AppState, ExportSummary, Statistics};

type ApiResult<T> = Result<Json<T>, ApiError>;

const UPLOAD_FIELD: &str = "csv_file";

/// Turns an extractor failure into a typed error, keeping the body-limit case apart.
fn rejected(status: StatusCode, text: String) -> MonitorError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        MonitorError::PayloadTooLarge(text)
    } else {
        MonitorError::BadRequest(text)
    }
}

#[tracing::instrument(skip_all)]
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let monitor = state.monitor.read().await;
    let stats = monitor.statistics(&mut rand::thread_rng());
    Html(dashboard::render(monitor.routes(), &stats))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Re-rolls every route and returns the whole table.
#[tracing::instrument(skip_all)]
pub async fn routes(State(state): State<Arc<AppState>>) -> Json<RouteRegistry> {
    let mut monitor = state.monitor.write().await;
    let routes = monitor.refresh_routes(&mut rand::thread_rng()).clone();
    debug!(routes = routes.len(), "Routes refreshed");
    Json(routes)
}

#[tracing::instrument(skip_all)]
pub async fn report(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<Success<Empty>> {
    let Json(req) = body.map_err(|e| rejected(e.status(), e.body_text()))?;
    let saturation: Saturation = req.saturation.parse()?;

    let mut monitor = state.monitor.write().await;
    let route = monitor.report(&req.route, saturation, &mut rand::thread_rng())?;
    info!(
        route = %route.code,
        saturation = %route.saturation,
        minutes = route.estimated_minutes.get(),
        "Saturation report received"
    );
    Ok(Json(Success::message("Report received")))
}

#[tracing::instrument(skip_all)]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Success<Empty>> {
    let Json(req) = body.map_err(|e| rejected(e.status(), e.body_text()))?;

    let mut monitor = state.monitor.write().await;
    let profile = monitor.add_profile(&req.name, &req.preferred_route)?;
    info!(preferred_route = %profile.preferred_route, "Profile saved");
    Ok(Json(Success::message("Profile saved")))
}

#[tracing::instrument(skip_all)]
pub async fn statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    let monitor = state.monitor.read().await;
    Json(monitor.statistics(&mut rand::thread_rng()))
}

#[tracing::instrument(skip_all)]
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Success<UploadData>> {
    let mut multipart = multipart.map_err(|e| rejected(e.status(), e.body_text()))?;
    let bytes = read_upload_field(&mut multipart).await?;

    let summary = state.ingest_csv(&bytes).await?;
    Ok(Json(Success::new(
        "CSV file processed successfully",
        UploadData {
            records_count: summary.records_count,
            total_records: summary.total_records,
            routes_updated: summary.aggregate.routes_updated,
        },
    )))
}

/// Pulls the `csv_file` field out of the form and checks its name.
async fn read_upload_field(multipart: &mut Multipart) -> Result<Bytes, MonitorError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        ensure_csv_filename(field.file_name())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        debug!(bytes = bytes.len(), "Upload received");
        return Ok(bytes);
    }
    Err(MonitorError::MissingFile)
}

#[tracing::instrument(skip_all)]
pub async fn process_data(State(state): State<Arc<AppState>>) -> ApiResult<Success<ProcessData>> {
    let summary = state.monitor.write().await.process()?;
    info!(
        records = summary.records_processed,
        updated = summary.routes_updated.len(),
        "Historical data processed"
    );
    Ok(Json(Success::new(
        format!("Processed {} historical records", summary.records_processed),
        ProcessData {
            records_processed: summary.records_processed,
            routes_updated: summary.routes_updated,
            unknown_routes: summary.unknown_routes,
        },
    )))
}

#[tracing::instrument(skip_all)]
pub async fn export_data(State(state): State<Arc<AppState>>) -> ApiResult<Success<ExportSummary>> {
    let summary = state.export().await?;
    Ok(Json(Success::new(
        format!("Data exported as {}", summary.filename),
        summary,
    )))
}
