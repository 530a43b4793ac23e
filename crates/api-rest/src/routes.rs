//! Route definitions and handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use field_analytics_domain::Report;
use serde::Serialize;

/// Assemble all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/reports", get(list_reports))
        .route(
            "/reports/basic/:period_start/:period_end",
            post(create_basic_report),
        )
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn create_basic_report(
    State(state): State<AppState>,
    Path((period_start, period_end)): Path<(String, String)>,
) -> ApiResult<Json<Report>> {
    let period_start = parse_date(&period_start)?;
    let period_end = parse_date(&period_end)?;

    let report = state
        .reports
        .create_basic_report(period_start, period_end)
        .await?;

    Ok(Json(report))
}

async fn list_reports(State(state): State<AppState>) -> ApiResult<Json<Vec<Report>>> {
    let reports = state.reports.list_reports().await?;
    Ok(Json(reports))
}

/// Parse a `YYYY-MM-DD` path segment as a UTC midnight instant; the engine
/// re-anchors it to the reporting timezone.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| ApiError::BadRequest(format!("invalid date {raw:?}: {err}")))?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
