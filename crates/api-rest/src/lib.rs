//! REST surface of the field analytics service.
//!
//! A thin layer: route definitions, path parsing, error-to-status mapping and
//! JSON marshaling. All behavior lives in the application engines reachable
//! through [`state::AppState`].

pub mod app;
pub mod error;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
