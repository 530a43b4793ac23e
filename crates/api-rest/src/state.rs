//! Shared application state for route handlers.

use field_analytics_application::ReportEngine;
use std::sync::Arc;

/// State injected into every handler via axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// Report generation and listing.
    pub reports: Arc<ReportEngine>,
}

impl AppState {
    pub fn new(reports: Arc<ReportEngine>) -> Self {
        Self { reports }
    }
}
