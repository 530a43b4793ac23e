//! Background tasks of the field analytics service.
//!
//! Two independent supervised tasks owned by the process lifecycle:
//!
//! - [`TaskEventConsumer`] - the long-lived event-consumption loop over the
//!   task event channel
//! - [`ReportScheduler`] - the daily report timer
//!
//! Both expose `start`/`stop` with idempotent guards: starting a running task
//! or stopping a stopped one is an explicit error, not a silent no-op. The
//! guard is what prevents double-start races during process bring-up.

pub mod consumer;
pub mod scheduler;

pub use consumer::TaskEventConsumer;
pub use scheduler::{ReportScheduler, Schedule};
