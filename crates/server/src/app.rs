//! Process assembly and lifecycle.
//!
//! Wires the storage pools, capability clients and engines together, then
//! runs the HTTP server alongside the two supervised background tasks.
//! Shutdown happens in dependency order and always proceeds to completion:
//! stop the timer so no new report jobs fire, drain the event consumer under
//! a bounded grace period, let the HTTP server finish in-flight requests,
//! then close the stores - fact store first, report index last.

use anyhow::{Context, Result};
use axum::Router;
use field_analytics_api_rest::{create_app, AppState};
use field_analytics_application::{DedupePolicy, EnrichmentEngine, ReportEngine};
use field_analytics_common::config::AppConfig;
use field_analytics_infrastructure::{
    consumers, AnalyticsDatabases, BrigadeClient, FileClient, InspectionClient, PgFinishedTaskStore,
    PgReportStore, SubscriberClient, XlsxReportWriter,
};
use field_analytics_worker::{ReportScheduler, TaskEventConsumer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// The assembled process.
pub struct App {
    config: AppConfig,
    databases: AnalyticsDatabases,
    consumer: Arc<TaskEventConsumer>,
    scheduler: Arc<ReportScheduler>,
    router: Router,
}

impl App {
    /// Connect storage, build clients and engines, assemble the router.
    pub async fn init(config: AppConfig) -> Result<Self> {
        let databases = AnalyticsDatabases::connect(&config.databases)
            .await
            .context("init databases")?;

        let http = consumers::http_client(&config.cluster).context("init http client")?;
        let inspections = Arc::new(InspectionClient::new(
            http.clone(),
            &config.cluster.inspection_url,
        ));
        let brigades = Arc::new(BrigadeClient::new(http.clone(), &config.cluster.brigade_url));
        let objects = Arc::new(SubscriberClient::new(
            http.clone(),
            &config.cluster.subscriber_url,
        ));
        let files = Arc::new(FileClient::new(http, &config.cluster.file_url));

        let facts = Arc::new(PgFinishedTaskStore::new(databases.facts().clone()));
        let report_index = Arc::new(PgReportStore::new(databases.reports().clone()));

        let dedupe = if config.reporting.dedupe_finished_tasks {
            DedupePolicy::SkipDuplicates
        } else {
            DedupePolicy::AllowDuplicates
        };
        let enrichment = Arc::new(EnrichmentEngine::new(
            inspections,
            brigades,
            objects,
            facts.clone(),
            dedupe,
        ));
        let reports = Arc::new(ReportEngine::new(
            facts,
            report_index,
            files,
            Arc::new(XlsxReportWriter::new()),
        ));

        let consumer = Arc::new(TaskEventConsumer::new(enrichment, config.channel.clone()));
        let scheduler = Arc::new(ReportScheduler::new(reports.clone(), config.reporting.clone()));
        let router = create_app(AppState::new(reports), &config.server);

        Ok(Self {
            config,
            databases,
            consumer,
            scheduler,
            router,
        })
    }

    /// Start the background tasks and serve HTTP until shutdown.
    pub async fn run(self) -> Result<()> {
        let App {
            config,
            databases,
            consumer,
            scheduler,
            router,
        } = self;

        consumer.start().await.context("start task event consumer")?;
        scheduler.start().await.context("start report scheduler")?;

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        info!(%addr, "http server listening");

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("serve http");

        // Shutdown errors are logged, never escalated: teardown must finish.
        info!("shutting down");
        if let Err(err) = scheduler.stop().await {
            error!(error = %err, "failed to stop report scheduler");
        }
        if let Err(err) = consumer.stop(SHUTDOWN_GRACE).await {
            error!(error = %err, "failed to stop task event consumer");
        }
        databases.close().await;
        info!("shutdown complete");

        served
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    } else {
        info!("received shutdown signal");
    }
}
