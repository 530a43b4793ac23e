//! Report-index repository: the `reports` and `report_attachments` tables.
//!
//! The attachment table is the only many-to-many relation in the system and
//! has no identity beyond the `(report_id, file_id)` pair. Creation inserts
//! the report row, reads back its generated id, and inserts one attachment
//! row per file — all inside a single transaction, so a partially attached
//! report is never observable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_analytics_application::{ReportRecord, ReportStore};
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, FileId, NewReport, Report, ReportType,
};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::instrument;

const ADD_REPORT_SQL: &str = r#"
    INSERT INTO reports (report_type, period_start, period_end)
    VALUES ($1, $2, $3)
    RETURNING id, created_at
"#;

const ADD_ATTACHMENT_SQL: &str = r#"
    INSERT INTO report_attachments (report_id, file_id)
    VALUES ($1, $2)
"#;

const ALL_REPORTS_SQL: &str = r#"
    SELECT id, report_type, period_start, period_end, created_at
    FROM reports
    ORDER BY id
"#;

const ATTACHMENTS_BY_REPORTS_SQL: &str = r#"
    SELECT report_id, file_id
    FROM report_attachments
    WHERE report_id = ANY($1)
    ORDER BY report_id, file_id
"#;

/// PostgreSQL implementation of the report index.
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReportRow {
    id: i64,
    report_type: i32,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct AttachmentRow {
    report_id: i64,
    file_id: i64,
}

#[async_trait]
impl ReportStore for PgReportStore {
    #[instrument(skip(self, report))]
    async fn add(&self, report: NewReport) -> AnalyticsResult<Report> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| AnalyticsError::persistence("begin report transaction", err))?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(ADD_REPORT_SQL)
            .bind(report.report_type.code())
            .bind(report.period_start)
            .bind(report.period_end)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| AnalyticsError::persistence("add report", err))?;

        for file in &report.files {
            sqlx::query(ADD_ATTACHMENT_SQL)
                .bind(id)
                .bind(file.id.get())
                .execute(&mut *tx)
                .await
                .map_err(|err| AnalyticsError::persistence("add report attachment", err))?;
        }

        tx.commit()
            .await
            .map_err(|err| AnalyticsError::persistence("commit report transaction", err))?;

        Ok(Report {
            id: id.into(),
            report_type: report.report_type,
            files: report.files,
            period_start: report.period_start,
            period_end: report.period_end,
            created_at,
        })
    }

    #[instrument(skip(self))]
    async fn all(&self) -> AnalyticsResult<Vec<ReportRecord>> {
        let reports: Vec<ReportRow> = sqlx::query_as(ALL_REPORTS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| AnalyticsError::persistence("get all reports", err))?;

        let ids: Vec<i64> = reports.iter().map(|report| report.id).collect();
        let attachments: Vec<AttachmentRow> = sqlx::query_as(ATTACHMENTS_BY_REPORTS_SQL)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| AnalyticsError::persistence("get attachments by reports", err))?;

        let mut files_by_report: HashMap<i64, Vec<FileId>> = HashMap::new();
        for attachment in attachments {
            files_by_report
                .entry(attachment.report_id)
                .or_default()
                .push(attachment.file_id.into());
        }

        reports
            .into_iter()
            .map(|row| {
                let report_type = ReportType::from_code(row.report_type)
                    .map_err(AnalyticsError::DataConsistency)?;

                // A report with no attachment rows is a valid empty set, not
                // a corruption signal.
                let file_ids = files_by_report.remove(&row.id).unwrap_or_default();

                Ok(ReportRecord {
                    id: row.id.into(),
                    report_type,
                    file_ids,
                    period_start: row.period_start,
                    period_end: row.period_end,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}
