// GET handlers: version, live windows, history by date

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;

use super::AppState;
use crate::models::{Sample, SeriesPayload};
use crate::schema::DATE_FORMAT;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %e, "history task failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/current: latest collected sample.
pub(super) async fn current_handler(
    State(state): State<AppState>,
) -> Result<Json<Sample>, ApiError> {
    state
        .monitor
        .current_sample()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No sample collected yet"))
}

pub(super) async fn short_history_handler(State(state): State<AppState>) -> Json<SeriesPayload> {
    Json(SeriesPayload::from(
        state.monitor.short_history_snapshot().as_slice(),
    ))
}

pub(super) async fn long_history_handler(State(state): State<AppState>) -> Json<SeriesPayload> {
    Json(SeriesPayload::from(
        state.monitor.long_history_snapshot().as_slice(),
    ))
}

/// GET /api/available-dates: `["YYYY-MM-DD", ...]`, ascending.
pub(super) async fn available_dates_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let monitor = state.monitor.clone();
    let dates = tokio::task::spawn_blocking(move || monitor.available_dates())
        .await
        .map_err(join_error)?;
    Ok(Json(
        dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect(),
    ))
}

/// GET /api/log-data/{date}: one day of logged samples.
pub(super) async fn log_data_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<SeriesPayload>, ApiError> {
    let parsed = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid date {date}, expected YYYY-MM-DD"),
        )
    })?;
    let monitor = state.monitor.clone();
    let rows = tokio::task::spawn_blocking(move || monitor.log_data_for(parsed))
        .await
        .map_err(join_error)?;
    if rows.is_empty() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No data available for date {date}"),
        ));
    }
    Ok(Json(SeriesPayload::from(rows.as_slice())))
}
