//! HTTP clients for the cluster services.
//!
//! One module per capability: inspection, brigade, subscriber (objects) and
//! file. Each client wraps a shared `reqwest::Client`, speaks the service's
//! JSON wire form, and maps responses into domain types. Wire DTOs are kept
//! separate from domain types on purpose — upstream optionality ends at this
//! boundary.

pub mod brigade;
pub mod file;
pub mod inspection;
pub mod subscriber;

pub use brigade::BrigadeClient;
pub use file::FileClient;
pub use inspection::InspectionClient;
pub use subscriber::SubscriberClient;

use field_analytics_common::config::ClusterConfig;
use field_analytics_domain::{AnalyticsError, AnalyticsResult};

/// Build the HTTP client shared by all capability clients.
pub fn http_client(config: &ClusterConfig) -> AnalyticsResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|err| AnalyticsError::persistence("build http client", err))
}

fn base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
