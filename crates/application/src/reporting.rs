//! Report engine: period aggregation into spreadsheet artifacts, and the
//! report index reader.
//!
//! `create_basic_report` reads a time-windowed slice of the fact store,
//! projects it into tabular rows, renders and uploads the artifact, and
//! records the report with its attachments transactionally. `list_reports`
//! reconstructs stored reports with file metadata re-resolved from the file
//! service.

use crate::ports::{FileTransfer, FinishedTaskStore, ReportArtifact, ReportStore};
use chrono::{DateTime, Utc};
use field_analytics_common::datetime::{
    format_local_date, format_local_datetime, reporting_midnight, whole_days,
};
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, FinishedTaskRecord, InspectionType, NewReport, Report,
    ReportType, Resolution, StoredFile,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Header row of the basic report, a fixed business contract.
pub const REPORT_COLUMNS: [&str; 9] = [
    "#",
    "Address",
    "Subscriber",
    "Account number",
    "Started at",
    "Finished at",
    "Work type",
    "Work result",
    "Inspectors",
];

/// One rendered row of the basic report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub number: usize,
    pub address: String,
    pub subscriber_name: String,
    pub account_number: String,
    pub started_at: String,
    pub finished_at: String,
    pub work_type: String,
    pub work_result: String,
    pub inspectors: String,
}

/// Generates reports over the fact store and reads the report index.
pub struct ReportEngine {
    facts: Arc<dyn FinishedTaskStore>,
    reports: Arc<dyn ReportStore>,
    files: Arc<dyn FileTransfer>,
    artifact: Arc<dyn ReportArtifact>,
}

impl ReportEngine {
    pub fn new(
        facts: Arc<dyn FinishedTaskStore>,
        reports: Arc<dyn ReportStore>,
        files: Arc<dyn FileTransfer>,
        artifact: Arc<dyn ReportArtifact>,
    ) -> Self {
        Self {
            facts,
            reports,
            files,
            artifact,
        }
    }

    /// Create a basic report over `[period_start, period_end)`.
    ///
    /// Both bounds are normalized to midnight in the reporting timezone
    /// before anything else, so day boundaries follow the business calendar
    /// regardless of the caller's input timezone. Concurrent invocations over
    /// overlapping periods are allowed and each produce their own report.
    #[instrument(skip(self))]
    pub async fn create_basic_report(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> AnalyticsResult<Report> {
        let period_start = reporting_midnight(period_start);
        let period_end = reporting_midnight(period_end);

        let days = whole_days(period_start, period_end);
        if days < 1 {
            return Err(AnalyticsError::InvalidPeriod { days });
        }

        let tasks = self.facts.by_period(period_start, period_end).await?;
        if tasks.is_empty() {
            return Err(AnalyticsError::NoData {
                period_start,
                period_end,
            });
        }

        let rows: Vec<ReportRow> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| project_row(task, index + 1))
            .collect();
        let content = self.artifact.render(&rows)?;

        let file_name = format!(
            "Report {}-{}.xlsx",
            format_local_date(period_start),
            format_local_date(period_end)
        );
        let uploaded = self.files.upload(&file_name, content).await?;

        let report = self
            .reports
            .add(NewReport {
                report_type: ReportType::Basic,
                files: vec![uploaded],
                period_start,
                period_end,
            })
            .await?;

        info!(
            report_id = %report.id,
            rows = rows.len(),
            file = %file_name,
            "basic report created"
        );

        Ok(report)
    }

    /// List all generated reports with fully resolved file metadata.
    ///
    /// A report without attachments resolves to an empty file list; a report
    /// referencing a file the file service no longer knows is a consistency
    /// failure.
    #[instrument(skip(self))]
    pub async fn list_reports(&self) -> AnalyticsResult<Vec<Report>> {
        let records = self.reports.all().await?;

        let file_ids: Vec<_> = records
            .iter()
            .flat_map(|record| record.file_ids.iter().copied())
            .collect();
        let files = if file_ids.is_empty() {
            Vec::new()
        } else {
            self.files.by_ids(&file_ids).await?
        };
        let files_by_id: HashMap<_, _> = files.into_iter().map(|file| (file.id, file)).collect();

        records
            .into_iter()
            .map(|record| {
                let files = record
                    .file_ids
                    .iter()
                    .map(|id| {
                        files_by_id.get(id).cloned().ok_or_else(|| {
                            AnalyticsError::DataConsistency(format!(
                                "report {} references unknown file {id}",
                                record.id
                            ))
                        })
                    })
                    .collect::<AnalyticsResult<Vec<StoredFile>>>()?;

                Ok(Report {
                    id: record.id,
                    report_type: record.report_type,
                    files,
                    period_start: record.period_start,
                    period_end: record.period_end,
                    created_at: record.created_at,
                })
            })
            .collect()
    }
}

/// Project one fact record into a report row.
pub fn project_row(record: &FinishedTaskRecord, number: usize) -> ReportRow {
    let (work_type, work_result) = classify(record);

    let inspectors = record
        .brigade
        .inspectors
        .iter()
        .map(|inspector| full_name(&inspector.surname, &inspector.name, &inspector.patronymic))
        .collect::<Vec<_>>()
        .join(", ");

    let subscriber = &record.object.subscriber;

    ReportRow {
        number,
        address: record.object.address.clone(),
        subscriber_name: full_name(&subscriber.surname, &subscriber.name, &subscriber.patronymic),
        account_number: subscriber.account_number.clone(),
        started_at: format_local_datetime(record.started_at),
        finished_at: format_local_datetime(record.finished_at),
        work_type: work_type.to_string(),
        work_result: work_result.to_string(),
        inspectors,
    }
}

/// Derive the work type and work result cells from the inspection
/// classification.
fn classify(record: &FinishedTaskRecord) -> (&'static str, &'static str) {
    match record.inspection.kind {
        InspectionType::Resumption => {
            if record.inspection.resolution == Resolution::Resumed {
                ("Resumption", "Resumption")
            } else {
                ("Resumption", "Access denied")
            }
        }
        InspectionType::Limitation => {
            if record.inspection.resolution != Resolution::Limited {
                ("Disconnection", "Disconnection")
            } else {
                ("Disconnection", "Access denied")
            }
        }
        _ => {
            if record.inspection.is_violation_detected {
                ("Check of previously imposed restriction", "Violated")
            } else {
                ("Check of previously imposed restriction", "Not violated")
            }
        }
    }
}

/// Join name parts with single spaces, dropping an empty patronymic.
fn full_name(surname: &str, name: &str, patronymic: &str) -> String {
    if patronymic.is_empty() {
        format!("{surname} {name}")
    } else {
        format!("{surname} {name} {patronymic}")
    }
}
