//! Shared utilities for the field analytics service.
//!
//! - `config` - configuration loading (TOML file + environment overrides)
//! - `datetime` - reporting-timezone date handling and display formats
//! - `telemetry` - tracing subscriber initialization

pub mod config;
pub mod datetime;
pub mod telemetry;

pub use config::{
    AppConfig, ChannelConfig, ClusterConfig, DatabasesConfig, LogConfig, ReportingConfig,
    ServerConfig,
};
