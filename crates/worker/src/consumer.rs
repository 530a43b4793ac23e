//! Task event consumption loop.
//!
//! Events arrive over a Redis list as an at-least-once channel: one event at
//! a time per consumer, ordering preserved within the stream. Each handling
//! is bounded by the configured timeout. The loop is a terminal sink - parse
//! errors, unknown event types, handler failures and timeouts are logged and
//! dropped; retry is the channel's redelivery, never ours.

use anyhow::{bail, Context, Result};
use field_analytics_application::EnrichmentEngine;
use field_analytics_common::config::ChannelConfig;
use field_analytics_domain::TaskEvent;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Supervised consumer of the task event channel.
pub struct TaskEventConsumer {
    engine: Arc<EnrichmentEngine>,
    config: ChannelConfig,
    running: AtomicBool,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskEventConsumer {
    pub fn new(engine: Arc<EnrichmentEngine>, config: ChannelConfig) -> Self {
        Self {
            engine,
            config,
            running: AtomicBool::new(false),
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Connect to the channel and start the consumption loop.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("task event consumer already running");
        }

        let connected = async {
            let client = redis::Client::open(self.config.redis_url.as_str())
                .context("create redis client")?;
            ConnectionManager::new(client)
                .await
                .context("connect to event channel")
        }
        .await;

        let redis = match connected {
            Ok(redis) => redis,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };

        let (tx, rx) = watch::channel(false);
        *self.shutdown.lock().await = Some(tx);

        let engine = self.engine.clone();
        let config = self.config.clone();
        *self.handle.lock().await = Some(tokio::spawn(consume_loop(redis, engine, config, rx)));

        info!(queue = %self.config.tasks_queue, "task event consumer started");
        Ok(())
    }

    /// Signal shutdown and wait up to `grace` for the loop to drain.
    pub async fn stop(&self, grace: Duration) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            bail!("task event consumer not running");
        }

        if let Some(tx) = self.shutdown.lock().await.take() {
            let _ = tx.send(true);
        }

        if let Some(handle) = self.handle.lock().await.take() {
            if tokio::time::timeout(grace, handle).await.is_err() {
                warn!("task event consumer did not drain within the grace period");
            }
        }

        info!("task event consumer stopped");
        Ok(())
    }
}

async fn consume_loop(
    mut redis: ConnectionManager,
    engine: Arc<EnrichmentEngine>,
    config: ChannelConfig,
    shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        // BRPOP returns within the blocking timeout, so shutdown is observed
        // between fetches.
        let fetched: Result<Option<(String, String)>, redis::RedisError> = redis
            .brpop(&config.tasks_queue, config.blocking_timeout_secs as f64)
            .await;

        match fetched {
            Ok(Some((_, payload))) => handle_payload(&engine, &config, payload.as_bytes()).await,
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "failed to fetch task event");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    info!("task event consumer drained");
}

async fn handle_payload(engine: &EnrichmentEngine, config: &ChannelConfig, payload: &[u8]) {
    let event = match TaskEvent::decode(payload) {
        Ok(event) => event,
        Err(err) => {
            error!(error = %err, "failed to decode task event");
            return;
        }
    };

    match tokio::time::timeout(config.handle_timeout(), engine.handle(event)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(error = %err, "failed to handle task event"),
        Err(_) => error!(
            timeout_secs = config.handle_timeout_secs,
            "task event handling timed out"
        ),
    }
}
