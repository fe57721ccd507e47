//! Snapshot recording
//!
//! A record is a point-in-time copy of the counters, appended as one line to
//! the day's log and optionally forwarded to an external endpoint. The local
//! append is the result that matters; forwarding runs detached and only logs.

mod daily_log;
mod webhook;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::types::Counters;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub use daily_log::{DailyLog, DATE_FORMAT, LOG_EXTENSION};
pub use webhook::{WebhookError, WebhookForwarder};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// One durable snapshot line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEntry {
    /// Local civil time, whole seconds
    pub timestamp: NaiveDateTime,
    pub first: i64,
    pub last: i64,
    pub diff: i64,
}

/// JSON body sent to the reporting endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecordPayload {
    pub datetime: String,
    pub first: i64,
    pub last: i64,
    pub diff: i64,
}

impl RecordEntry {
    pub fn capture(counters: &Counters, at: NaiveDateTime) -> Self {
        Self {
            timestamp: at.trunc_subsecs(0),
            first: counters.first,
            last: counters.last,
            diff: counters.diff(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// `YYYY-MM-DD HH:MM:SS first last diff\n`
    pub fn to_log_line(&self) -> String {
        format!(
            "{} {} {} {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.first,
            self.last,
            self.diff
        )
    }

    pub fn payload(&self) -> RecordPayload {
        RecordPayload {
            datetime: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            first: self.first,
            last: self.last,
            diff: self.diff,
        }
    }
}

/// Best-effort sink for records beyond the local log
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, entry: &RecordEntry) -> Result<(), WebhookError>;

    /// Name used in log lines
    fn name(&self) -> &str;
}

#[derive(Clone)]
pub struct Recorder {
    log: Arc<DailyLog>,
    forwarder: Option<Arc<dyn Forwarder>>,
}

impl Recorder {
    pub fn new(log: DailyLog) -> Self {
        Self {
            log: Arc::new(log),
            forwarder: None,
        }
    }

    pub fn with_forwarder(mut self, forwarder: Arc<dyn Forwarder>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    /// Log under `record_dir`, plus webhook forwarding when a URL is configured.
    /// A webhook that can't be set up is logged and left out.
    pub fn from_config(config: &AppConfig) -> Self {
        let recorder = Self::new(DailyLog::new(config.record_dir.clone()));

        let Some(url) = config.webhook_url.clone() else {
            return recorder;
        };

        match WebhookForwarder::new(url, config.webhook_timeout) {
            Ok(forwarder) => {
                tracing::info!("Forwarding records to {}", forwarder.url());
                recorder.with_forwarder(Arc::new(forwarder))
            }
            Err(e) => {
                tracing::warn!("Webhook disabled: {}", e);
                recorder
            }
        }
    }

    pub fn log(&self) -> &DailyLog {
        &self.log
    }

    /// Append `counters` stamped with the current time, then hand the entry to
    /// the forwarder.
    pub async fn record(&self, counters: Counters) -> Result<RecordEntry, RecordError> {
        let (entry, result) = self.log.append_now(&counters).await;

        self.spawn_forward(entry);

        match result {
            Ok(path) => {
                tracing::info!(
                    "Recorded first={} last={} diff={} to {}",
                    entry.first,
                    entry.last,
                    entry.diff,
                    path.display()
                );
                Ok(entry)
            }
            Err(e) => {
                tracing::error!("Failed to append record: {}", e);
                Err(e)
            }
        }
    }

    fn spawn_forward(&self, entry: RecordEntry) {
        let Some(forwarder) = self.forwarder.clone() else {
            return;
        };

        tokio::spawn(async move {
            match forwarder.forward(&entry).await {
                Ok(()) => tracing::debug!("Forwarded record via {}", forwarder.name()),
                Err(e) => tracing::warn!("Forwarding via {} failed: {}", forwarder.name(), e),
            }
        });
    }
}

/// Spawn the background task that records every `period`, whether or not any
/// observer has recording switched on. The first record lands one period in.
pub fn spawn_interval_recorder(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // Failures are already logged; keep ticking
            let _ = state.record_now().await;
        }
    })
}
