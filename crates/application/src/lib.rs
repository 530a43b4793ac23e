//! Application layer for the field analytics service.
//!
//! This crate holds the two engines with real invariants — enrichment of
//! finished-task events and period report generation — plus the narrow ports
//! they consume. Transport, SQL and rendering details live behind the ports
//! in the infrastructure crate; tests substitute deterministic fakes.

pub mod enrichment;
pub mod ports;
pub mod reporting;

pub use enrichment::EnrichmentEngine;
pub use ports::{
    BrigadeLookup, DedupePolicy, FileTransfer, FinishedTaskStore, InspectionLookup, ObjectLookup,
    ReportArtifact, ReportRecord, ReportStore,
};
pub use reporting::{ReportEngine, ReportRow, REPORT_COLUMNS};
