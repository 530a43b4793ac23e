//! Error taxonomy for the field analytics service.
//!
//! Every layer reports failures through [`AnalyticsError`]; each variant maps
//! to one failure class of the pipeline. Errors are wrapped with the
//! operation that produced them and propagated — the event-consumption loop
//! and the report timer are the only terminal sinks.

use chrono::{DateTime, Utc};
use std::fmt::{self, Display};

/// Result alias used across the service.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Which of the three enrichment lookups failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentSource {
    Inspection,
    Brigade,
    Object,
}

impl Display for EnrichmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inspection => f.write_str("inspection"),
            Self::Brigade => f.write_str("brigade"),
            Self::Object => f.write_str("object"),
        }
    }
}

/// Unified error type for the enrichment and reporting pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The event payload violates the channel contract (bad shape or a task
    /// status that is invalid for the event kind). Never retried.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// The event carried a type code outside the closed lifecycle union.
    #[error("unknown event type: {0}")]
    UnknownEventType(i32),

    /// One of the three enrichment lookups failed or returned an incomplete
    /// record. Never retried by the core; redelivery is the transport's job.
    #[error("{lookup} lookup failed: {message}")]
    Enrichment {
        lookup: EnrichmentSource,
        message: String,
    },

    /// A report was requested over a window shorter than one whole day.
    #[error("report period must span at least one whole day, got {days}")]
    InvalidPeriod { days: i64 },

    /// A report was requested over a window with no finished tasks. An empty
    /// report is meaningless to the business and must not be created.
    #[error("no finished tasks found from {period_start} to {period_end}")]
    NoData {
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    },

    /// A storage engine was unavailable or rejected the operation.
    #[error("{operation}: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },

    /// A stored report references data that can no longer be resolved; an
    /// internal invariant was breached and must be logged loudly.
    #[error("data consistency violation: {0}")]
    DataConsistency(String),

    /// The tabular artifact could not be rendered.
    #[error("render report artifact: {0}")]
    Artifact(String),
}

impl AnalyticsError {
    /// Wrap an enrichment lookup failure with the lookup it came from.
    pub fn enrichment(lookup: EnrichmentSource, err: impl Display) -> Self {
        Self::Enrichment {
            lookup,
            message: err.to_string(),
        }
    }

    /// Wrap a storage failure with the operation that hit it.
    pub fn persistence(operation: &'static str, err: impl Display) -> Self {
        Self::Persistence {
            operation,
            message: err.to_string(),
        }
    }

    /// Stable code for API responses and log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "MALFORMED_EVENT",
            Self::UnknownEventType(_) => "UNKNOWN_EVENT_TYPE",
            Self::Enrichment { .. } => "ENRICHMENT_FAILURE",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::NoData { .. } => "NO_DATA",
            Self::Persistence { .. } => "PERSISTENCE_FAILURE",
            Self::DataConsistency(_) => "DATA_CONSISTENCY",
            Self::Artifact(_) => "ARTIFACT_FAILURE",
        }
    }
}
