//! Field Analytics Domain Types
//!
//! This crate provides the core domain model for the field analytics service.
//! It defines the task-lifecycle event union, the entities fetched from the
//! enrichment services, the denormalized finished-task record, report
//! metadata, and the error taxonomy shared across all layers.
//!
//! ## Architecture
//!
//! The domain layer is organized into the following modules:
//!
//! - **identifiers**: Strongly-typed numeric identifiers for all entities
//! - **task**: Task snapshots and the closed task-lifecycle event union
//! - **inspection**: Inspection classification and results
//! - **brigade**: Brigades and their assigned inspectors
//! - **object**: Serviced objects and their subscribers
//! - **record**: The denormalized finished-task record (fact row)
//! - **report**: Generated report metadata and file references
//! - **errors**: The error taxonomy shared by every layer

pub mod brigade;
pub mod errors;
pub mod identifiers;
pub mod inspection;
pub mod object;
pub mod record;
pub mod report;
pub mod task;

pub use brigade::{Brigade, Inspector};
pub use errors::{AnalyticsError, AnalyticsResult, EnrichmentSource};
pub use identifiers::{
    BrigadeId, FileId, InspectionId, InspectorId, ObjectId, ReportId, SubscriberId, TaskId,
};
pub use inspection::{Inspection, InspectionType, MethodBy, ReasonType, Resolution};
pub use object::{ObjectExtended, Subscriber, SubscriberStatus};
pub use record::FinishedTaskRecord;
pub use report::{NewReport, Report, ReportType, StoredFile};
pub use task::{Task, TaskEvent, TaskEventEnvelope, TaskStatus};
