//! Connection pools for the two storage engines.
//!
//! The analytical fact store and the relational report index are independent
//! databases on independent pools. No transaction ever spans both: the fact
//! store is append-only and independently replayable, and the report
//! transaction always commits last in the reporting flow, so recovery never
//! has to reconcile partial cross-store writes.

use field_analytics_common::config::DatabasesConfig;
use field_analytics_domain::{AnalyticsError, AnalyticsResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// The service's two connection pools.
#[derive(Clone)]
pub struct AnalyticsDatabases {
    facts: PgPool,
    reports: PgPool,
}

impl AnalyticsDatabases {
    /// Connect both pools.
    pub async fn connect(config: &DatabasesConfig) -> AnalyticsResult<Self> {
        info!(max_connections = config.max_connections, "connecting storage pools");

        let facts = Self::pool(config, &config.facts_url)
            .await
            .map_err(|err| AnalyticsError::persistence("connect fact store", err))?;
        let reports = Self::pool(config, &config.reports_url)
            .await
            .map_err(|err| AnalyticsError::persistence("connect report index", err))?;

        Ok(Self { facts, reports })
    }

    async fn pool(config: &DatabasesConfig, url: &str) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(url)
            .await
    }

    /// Pool of the analytical fact store.
    #[inline]
    pub fn facts(&self) -> &PgPool {
        &self.facts
    }

    /// Pool of the relational report index.
    #[inline]
    pub fn reports(&self) -> &PgPool {
        &self.reports
    }

    /// Close both pools in dependency order: fact store first, then the
    /// report index.
    pub async fn close(&self) {
        info!("closing storage pools");
        self.facts.close().await;
        self.reports.close().await;
    }
}

impl std::fmt::Debug for AnalyticsDatabases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsDatabases")
            .field("facts_size", &self.facts.size())
            .field("reports_size", &self.reports.size())
            .finish()
    }
}
