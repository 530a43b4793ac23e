//! Generated report metadata and file references.

use crate::identifiers::{FileId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// The daily operational summary over a period.
    Basic,
}

impl ReportType {
    /// Numeric code used by the report index.
    pub fn code(self) -> i32 {
        match self {
            Self::Basic => 1,
        }
    }

    /// Decode a report index code.
    pub fn from_code(code: i32) -> Result<Self, String> {
        match code {
            1 => Ok(Self::Basic),
            other => Err(format!("unknown report type code: {other}")),
        }
    }
}

/// A file owned by the file service.
///
/// The report index stores only the identifier relation; the remaining
/// metadata is re-resolved from the file service on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: FileId,
    pub file_name: String,
    pub file_size: i64,
    pub bucket: String,
    pub url: String,
}

/// A generated report together with its attached files.
///
/// Reports are immutable artifacts: once created they are never edited or
/// deleted, and overlapping reports over the same period are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub files: Vec<StoredFile>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A report about to be persisted; the index assigns id and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub report_type: ReportType,
    pub files: Vec<StoredFile>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}
