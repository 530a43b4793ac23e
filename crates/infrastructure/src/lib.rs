//! Infrastructure layer for the field analytics service.
//!
//! This crate provides the concrete implementations behind the application
//! ports:
//!
//! - Database access for the two storage engines (PostgreSQL with sqlx)
//! - Repository implementations for the fact store and the report index,
//!   including the record-mapping layer
//! - HTTP capability clients for the inspection, brigade, subscriber and
//!   file services (reqwest)
//! - The xlsx report artifact writer
//!
//! All failures are mapped into the domain error taxonomy at this boundary;
//! nothing above this crate sees sqlx or reqwest error types.

pub mod artifact;
pub mod consumers;
pub mod database;
pub mod repositories;

pub use artifact::XlsxReportWriter;
pub use consumers::{BrigadeClient, FileClient, InspectionClient, SubscriberClient};
pub use database::AnalyticsDatabases;
pub use repositories::{PgFinishedTaskStore, PgReportStore};
