use super::snapshot::{detect_transitions, Notification, Snapshot};
use crate::line::ChatTransport;
use crate::store::{RemoteStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Status information for the change monitor.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MonitorStatus {
    /// Last successful poll timestamp
    pub last_poll: Option<DateTime<Utc>>,
    /// Last fetch error message (cleared on the next successful poll)
    pub last_error: Option<String>,
    /// Total number of successful polls
    pub poll_count: u64,
    /// Total number of failed fetches
    pub error_count: u64,
    /// Broadcasts accepted by the transport
    pub notifications_sent: u64,
    /// Broadcasts the transport rejected
    pub notifications_failed: u64,
    /// Snapshot the next poll will be compared against
    pub previous: Snapshot,
}

pub type SharedMonitorStatus = Arc<Mutex<MonitorStatus>>;

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Store read failed; previous snapshot kept
    FetchFailed(StoreError),
    /// Store read succeeded; these transitions were detected and broadcast
    Polled { notifications: Vec<Notification> },
}

/// Polls the device tree and broadcasts sensor transitions.
///
/// Owns the previous snapshot exclusively. It starts zeroed, so non-zero
/// readings on the first poll are reported as transitions.
pub struct ChangeMonitor {
    store: Arc<dyn RemoteStore>,
    transport: Arc<dyn ChatTransport>,
    poll_interval: Duration,
    previous: Snapshot,
    status: SharedMonitorStatus,
}

impl ChangeMonitor {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        transport: Arc<dyn ChatTransport>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            poll_interval,
            previous: Snapshot::default(),
            status: Arc::new(Mutex::new(MonitorStatus::default())),
        }
    }

    /// Returns a clone of the status tracker for external monitoring.
    pub fn status(&self) -> SharedMonitorStatus {
        Arc::clone(&self.status)
    }

    /// Snapshot the next tick compares against
    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    /// Run one poll: fetch, compare, broadcast, remember.
    ///
    /// A fetch failure leaves the previous snapshot untouched. Broadcast
    /// failures are logged and do not affect the snapshot update.
    pub async fn tick(&mut self) -> TickOutcome {
        let current = match self.store.get_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to read device state");
                let mut status = self.status.lock().await;
                status.last_error = Some(e.to_string());
                status.error_count += 1;
                return TickOutcome::FetchFailed(e);
            }
        };

        let notifications = detect_transitions(&self.previous, &current);
        debug!(
            previous = ?self.previous,
            current = ?current,
            transitions = notifications.len(),
            "Compared device state"
        );

        let mut sent = 0;
        for notification in &notifications {
            match self.transport.broadcast(notification.message).await {
                Ok(()) => {
                    sent += 1;
                    info!(
                        path = notification.field.path(),
                        value = notification.value,
                        message = %notification.message,
                        "Notification sent"
                    );
                }
                Err(e) => {
                    error!(
                        path = notification.field.path(),
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }

        self.previous = current;

        let mut status = self.status.lock().await;
        status.last_poll = Some(Utc::now());
        status.last_error = None;
        status.poll_count += 1;
        status.notifications_sent += sent;
        status.notifications_failed += notifications.len() as u64 - sent;
        status.previous = current;

        TickOutcome::Polled { notifications }
    }

    /// Poll on the configured interval until `shutdown` turns true.
    ///
    /// The first poll happens immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Starting change monitor"
        );

        let mut ticker = interval(self.poll_interval);
        // A slow store read pushes the schedule back rather than bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Change monitor stopped");
    }

    /// Spawn the polling loop as a background task.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
