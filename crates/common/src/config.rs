//! Configuration management for the service.
//!
//! Settings are assembled from an optional TOML file plus environment
//! variables prefixed `FIELD_ANALYTICS__` (double underscore separates
//! nesting, e.g. `FIELD_ANALYTICS__SERVER__PORT=9090`). Every field that has
//! a sensible default carries one; connection strings and cluster URLs are
//! required.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub databases: DatabasesConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from an optional file path and the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FIELD_ANALYTICS")
                .prefix_separator("__")
                .separator("__"),
        );

        builder
            .build()
            .context("assemble configuration sources")?
            .try_deserialize()
            .context("deserialize configuration")
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout applied by the HTTP middleware.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Connection settings for the two storage engines.
///
/// The fact store and the report index are independent databases; no
/// transaction ever spans both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasesConfig {
    /// Analytical fact store (append-only write path).
    pub facts_url: String,
    /// Relational report index.
    pub reports_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl DatabasesConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Task event channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Queue key the task service publishes lifecycle events to.
    #[serde(default = "default_tasks_queue")]
    pub tasks_queue: String,
    /// Upper bound for handling a single event, fetches included.
    #[serde(default = "default_handle_timeout")]
    pub handle_timeout_secs: u64,
    /// How long a fetch blocks waiting for the next event.
    #[serde(default = "default_blocking_timeout")]
    pub blocking_timeout_secs: u64,
}

impl ChannelConfig {
    pub fn handle_timeout(&self) -> Duration {
        Duration::from_secs(self.handle_timeout_secs)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            tasks_queue: default_tasks_queue(),
            handle_timeout_secs: default_handle_timeout(),
            blocking_timeout_secs: default_blocking_timeout(),
        }
    }
}

/// Base URLs of the cluster services consumed for enrichment and files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub inspection_url: String,
    pub brigade_url: String,
    pub subscriber_url: String,
    pub file_url: String,
    #[serde(default = "default_cluster_timeout")]
    pub request_timeout_secs: u64,
}

impl ClusterConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Local wall-clock time (`HH:MM`) the daily report job fires at.
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
    /// Upper bound for one report generation run.
    #[serde(default = "default_report_timeout")]
    pub task_timeout_secs: u64,
    /// When set, redelivered finished events are dropped on the `task_id`
    /// natural key instead of producing duplicate fact rows.
    #[serde(default)]
    pub dedupe_finished_tasks: bool,
}

impl ReportingConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            daily_at: default_daily_at(),
            task_timeout_secs: default_report_timeout(),
            dedupe_finished_tasks: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_acquire_timeout() -> u64 {
    15
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_tasks_queue() -> String {
    "field-analytics:events:tasks".to_string()
}

fn default_handle_timeout() -> u64 {
    120
}

fn default_blocking_timeout() -> u64 {
    5
}

fn default_cluster_timeout() -> u64 {
    60
}

fn default_daily_at() -> String {
    "07:00".to_string()
}

fn default_report_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}
