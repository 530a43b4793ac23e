//! Daily report scheduler.
//!
//! A tick-based timer that fires the basic report job once a day at the
//! configured local wall-clock time. Matching is minute-granular: a tick
//! fires when the current minute matches and the previous tick's minute did
//! not, so one firing per scheduled minute regardless of tick phase.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Timelike, Utc};
use field_analytics_application::ReportEngine;
use field_analytics_common::config::ReportingConfig;
use field_analytics_common::datetime::reporting_tz;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const TICK_INTERVAL: Duration = Duration::from_secs(20);

/// Daily wall-clock schedule in the reporting timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    hour: u32,
    minute: u32,
}

impl Schedule {
    /// A schedule firing every day at the given local time.
    pub fn daily(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            bail!("invalid schedule time {hour:02}:{minute:02}");
        }
        Ok(Self { hour, minute })
    }

    /// Parse an `HH:MM` expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let (hour, minute) = expr
            .split_once(':')
            .with_context(|| format!("invalid schedule expression {expr:?}, expected HH:MM"))?;

        let hour: u32 = hour
            .parse()
            .with_context(|| format!("invalid hour in schedule expression {expr:?}"))?;
        let minute: u32 = minute
            .parse()
            .with_context(|| format!("invalid minute in schedule expression {expr:?}"))?;

        Self::daily(hour, minute)
    }

    /// Whether the schedule matches the given local time.
    pub fn matches(&self, time: &DateTime<FixedOffset>) -> bool {
        time.hour() == self.hour && time.minute() == self.minute
    }
}

/// Supervised daily report timer.
pub struct ReportScheduler {
    engine: Arc<ReportEngine>,
    config: ReportingConfig,
    running: AtomicBool,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReportScheduler {
    pub fn new(engine: Arc<ReportEngine>, config: ReportingConfig) -> Self {
        Self {
            engine,
            config,
            running: AtomicBool::new(false),
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Start the timer loop.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("report scheduler already running");
        }

        let schedule = match Schedule::parse(&self.config.daily_at) {
            Ok(schedule) => schedule,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err.context("parse daily report time"));
            }
        };

        let (tx, rx) = watch::channel(false);
        *self.shutdown.lock().await = Some(tx);

        let engine = self.engine.clone();
        let config = self.config.clone();
        *self.handle.lock().await = Some(tokio::spawn(run(schedule, engine, config, rx)));

        info!(daily_at = %self.config.daily_at, "report scheduler started");
        Ok(())
    }

    /// Stop the timer loop; no further firings after this returns.
    pub async fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            bail!("report scheduler not running");
        }

        if let Some(tx) = self.shutdown.lock().await.take() {
            let _ = tx.send(true);
        }

        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }

        info!("report scheduler stopped");
        Ok(())
    }
}

async fn run(
    schedule: Schedule,
    engine: Arc<ReportEngine>,
    config: ReportingConfig,
    shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    let mut last_check = Utc::now().with_timezone(&reporting_tz());

    loop {
        interval.tick().await;
        if *shutdown.borrow() {
            break;
        }

        let now = Utc::now().with_timezone(&reporting_tz());
        if schedule.matches(&now) && !schedule.matches(&last_check) {
            daily_report(&engine, &config).await;
        }
        last_check = now;
    }
}

/// Build the basic report for the day that starts now.
async fn daily_report(engine: &ReportEngine, config: &ReportingConfig) {
    let now = Utc::now();
    let result = tokio::time::timeout(
        config.task_timeout(),
        engine.create_basic_report(now, now + ChronoDuration::days(1)),
    )
    .await;

    match result {
        Ok(Ok(report)) => {
            info!(report_id = %report.id, created_at = %report.created_at, "daily report created");
        }
        Ok(Err(err)) => error!(error = %err, "failed to create daily report"),
        Err(_) => warn!(
            timeout_secs = config.task_timeout_secs,
            "daily report generation timed out"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use field_analytics_application::{
        FileTransfer, FinishedTaskStore, ReportArtifact, ReportRecord, ReportRow, ReportStore,
    };
    use field_analytics_domain::{
        AnalyticsError, AnalyticsResult, FileId, FinishedTaskRecord, NewReport, Report, StoredFile,
    };

    struct Idle;

    #[async_trait]
    impl FinishedTaskStore for Idle {
        async fn append(
            &self,
            _: &FinishedTaskRecord,
            _: field_analytics_application::DedupePolicy,
        ) -> AnalyticsResult<()> {
            Ok(())
        }

        async fn by_period(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> AnalyticsResult<Vec<FinishedTaskRecord>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ReportStore for Idle {
        async fn add(&self, _: NewReport) -> AnalyticsResult<Report> {
            Err(AnalyticsError::persistence("add report", "unused"))
        }

        async fn all(&self) -> AnalyticsResult<Vec<ReportRecord>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl FileTransfer for Idle {
        async fn upload(&self, _: &str, _: Vec<u8>) -> AnalyticsResult<StoredFile> {
            Err(AnalyticsError::persistence("upload file", "unused"))
        }

        async fn by_ids(&self, _: &[FileId]) -> AnalyticsResult<Vec<StoredFile>> {
            Ok(Vec::new())
        }
    }

    impl ReportArtifact for Idle {
        fn render(&self, _: &[ReportRow]) -> AnalyticsResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn scheduler() -> ReportScheduler {
        let idle = Arc::new(Idle);
        let engine = Arc::new(ReportEngine::new(
            idle.clone(),
            idle.clone(),
            idle.clone(),
            idle,
        ));
        ReportScheduler::new(engine, ReportingConfig::default())
    }

    #[test]
    fn parses_wall_clock_expressions() {
        assert_eq!(Schedule::parse("07:00").unwrap(), Schedule::daily(7, 0).unwrap());
        assert_eq!(Schedule::parse("23:59").unwrap(), Schedule::daily(23, 59).unwrap());

        assert!(Schedule::parse("7").is_err());
        assert!(Schedule::parse("24:00").is_err());
        assert!(Schedule::parse("aa:bb").is_err());
    }

    #[test]
    fn matches_only_the_scheduled_minute() {
        let schedule = Schedule::daily(7, 30).unwrap();
        let tz = reporting_tz();

        let fire = tz.with_ymd_and_hms(2026, 3, 2, 7, 30, 15).unwrap();
        let miss = tz.with_ymd_and_hms(2026, 3, 2, 7, 31, 0).unwrap();

        assert!(schedule.matches(&fire));
        assert!(!schedule.matches(&miss));
    }

    #[tokio::test]
    async fn start_and_stop_guards_are_explicit_errors() {
        let scheduler = scheduler();

        scheduler.start().await.unwrap();
        let err = scheduler.start().await.unwrap_err();
        assert!(err.to_string().contains("already running"));

        scheduler.stop().await.unwrap();
        let err = scheduler.stop().await.unwrap_err();
        assert!(err.to_string().contains("not running"));
    }

    #[tokio::test]
    async fn invalid_daily_time_fails_start_and_releases_the_guard() {
        let idle = Arc::new(Idle);
        let engine = Arc::new(ReportEngine::new(
            idle.clone(),
            idle.clone(),
            idle.clone(),
            idle,
        ));
        let scheduler = ReportScheduler::new(
            engine,
            ReportingConfig {
                daily_at: "25:99".to_owned(),
                ..Default::default()
            },
        );

        assert!(scheduler.start().await.is_err());
        // The failed start released the guard, so a corrected restart is
        // possible without a stop.
        assert!(scheduler.stop().await.is_err());
    }
}
