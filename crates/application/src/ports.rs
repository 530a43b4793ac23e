//! Ports consumed by the engines.
//!
//! Each external concern is a narrow capability interface with one or two
//! operations. The engines depend only on these traits, never on concrete
//! transport clients, so tests run against deterministic fakes and the
//! infrastructure implementations stay swappable.

use crate::reporting::ReportRow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_analytics_domain::{
    AnalyticsResult, Brigade, BrigadeId, FileId, FinishedTaskRecord, Inspection, NewReport,
    ObjectExtended, ObjectId, Report, ReportId, ReportType, StoredFile, TaskId,
};

/// How the fact store treats a record whose task id is already present.
///
/// The source pipeline appended unconditionally, so redelivery of the same
/// finished event produced duplicate fact rows. That behavior is preserved as
/// the default and surfaced as configuration rather than silently fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupePolicy {
    /// Append unconditionally; redelivery duplicates the row.
    #[default]
    AllowDuplicates,
    /// Drop the append when a row with the same task id already exists.
    SkipDuplicates,
}

/// Inspection service: the inspection concluding a task, by task id.
#[async_trait]
pub trait InspectionLookup: Send + Sync {
    async fn by_task_id(&self, task_id: TaskId) -> AnalyticsResult<Inspection>;
}

/// Brigade service: a brigade with its inspector roster, by id.
#[async_trait]
pub trait BrigadeLookup: Send + Sync {
    async fn by_id(&self, id: BrigadeId) -> AnalyticsResult<Brigade>;
}

/// Subscriber service: an object with its contracted subscriber, by id.
#[async_trait]
pub trait ObjectLookup: Send + Sync {
    async fn by_id(&self, id: ObjectId) -> AnalyticsResult<ObjectExtended>;
}

/// File service: artifact upload and batched metadata resolution.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> AnalyticsResult<StoredFile>;

    async fn by_ids(&self, ids: &[FileId]) -> AnalyticsResult<Vec<StoredFile>>;
}

/// The append-only analytical fact store.
#[async_trait]
pub trait FinishedTaskStore: Send + Sync {
    /// Append one enriched record. Never updates an existing row.
    async fn append(
        &self,
        record: &FinishedTaskRecord,
        policy: DedupePolicy,
    ) -> AnalyticsResult<()>;

    /// All records with `finished_at` in `[period_start, period_end)`.
    async fn by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<FinishedTaskRecord>>;
}

/// A report as the index stores it: metadata plus the raw file id relation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub id: ReportId,
    pub report_type: ReportType,
    pub file_ids: Vec<FileId>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// The relational report index.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a report and its attachment rows in a single transaction.
    ///
    /// Implementations must guarantee that no partially attached report is
    /// ever observable: any failure rolls back the report row as well.
    async fn add(&self, report: NewReport) -> AnalyticsResult<Report>;

    /// All stored reports with their attached file ids.
    async fn all(&self) -> AnalyticsResult<Vec<ReportRecord>>;
}

/// Renderer of the tabular report artifact.
///
/// The column layout is a business contract owned by the template, not
/// derivable from the data; implementations fill it row by row under the
/// fixed header.
pub trait ReportArtifact: Send + Sync {
    fn render(&self, rows: &[ReportRow]) -> AnalyticsResult<Vec<u8>>;
}
