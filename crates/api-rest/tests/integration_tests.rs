//! Route-level tests against in-memory engine fakes.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use field_analytics_api_rest::{create_app, AppState};
use field_analytics_application::{
    DedupePolicy, FileTransfer, FinishedTaskStore, ReportArtifact, ReportEngine, ReportRecord,
    ReportRow, ReportStore,
};
use field_analytics_common::config::ServerConfig;
use field_analytics_domain::{
    AnalyticsResult, FileId, FinishedTaskRecord, NewReport, Report, ReportId, ReportType,
    StoredFile,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Empty stores: reports listing succeeds with nothing, report creation runs
/// into an empty window.
struct Empty;

#[async_trait]
impl FinishedTaskStore for Empty {
    async fn append(&self, _: &FinishedTaskRecord, _: DedupePolicy) -> AnalyticsResult<()> {
        Ok(())
    }

    async fn by_period(
        &self,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<FinishedTaskRecord>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ReportStore for Empty {
    async fn add(&self, report: NewReport) -> AnalyticsResult<Report> {
        Ok(Report {
            id: ReportId::new(1),
            report_type: report.report_type,
            files: report.files,
            period_start: report.period_start,
            period_end: report.period_end,
            created_at: Utc.with_ymd_and_hms(2026, 3, 4, 7, 0, 0).unwrap(),
        })
    }

    async fn all(&self) -> AnalyticsResult<Vec<ReportRecord>> {
        Ok(vec![ReportRecord {
            id: ReportId::new(1),
            report_type: ReportType::Basic,
            file_ids: vec![FileId::new(31)],
            period_start: Utc.with_ymd_and_hms(2026, 3, 1, 21, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2026, 3, 2, 21, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 3, 7, 0, 0).unwrap(),
        }])
    }
}

#[async_trait]
impl FileTransfer for Empty {
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> AnalyticsResult<StoredFile> {
        Ok(StoredFile {
            id: FileId::new(31),
            file_name: file_name.to_owned(),
            file_size: content.len() as i64,
            bucket: "reports".to_owned(),
            url: "https://files.local/31".to_owned(),
        })
    }

    async fn by_ids(&self, ids: &[FileId]) -> AnalyticsResult<Vec<StoredFile>> {
        Ok(ids
            .iter()
            .map(|id| StoredFile {
                id: *id,
                file_name: "report.xlsx".to_owned(),
                file_size: 1,
                bucket: "reports".to_owned(),
                url: format!("https://files.local/{id}"),
            })
            .collect())
    }
}

impl ReportArtifact for Empty {
    fn render(&self, _: &[ReportRow]) -> AnalyticsResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

fn app() -> axum::Router {
    let empty = Arc::new(Empty);
    let engine = Arc::new(ReportEngine::new(
        empty.clone(),
        empty.clone(),
        empty.clone(),
        empty,
    ));
    create_app(AppState::new(engine), &ServerConfig::default())
}

#[tokio::test]
async fn health_answers_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn listing_reports_returns_resolved_files() {
    let response = app()
        .oneshot(Request::get("/reports").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let reports: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["type"], "basic");
    assert_eq!(reports[0]["files"][0]["id"], 31);
}

#[tokio::test]
async fn empty_window_maps_to_not_found() {
    let response = app()
        .oneshot(
            Request::post("/reports/basic/2026-03-02/2026-03-03")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "NO_DATA");
}

#[tokio::test]
async fn invalid_period_maps_to_bad_request() {
    let response = app()
        .oneshot(
            Request::post("/reports/basic/2026-03-03/2026-03-02")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_date_maps_to_bad_request() {
    let response = app()
        .oneshot(
            Request::post("/reports/basic/02.03.2026/2026-03-03")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
