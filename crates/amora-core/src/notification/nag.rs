//! Notification permission poller.
//!
//! Polls the platform's notification permission on a fixed cadence (60 s by
//! default). While permission is anything but granted, the reminder is
//! visible and cannot be dismissed. Reminder changes are published on a
//! `watch` channel for the UI layer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use amora_types::error::NotificationError;
use amora_types::notification::{PermissionState, ReminderState};

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Reads the current notification permission.
pub trait PermissionProbe: Send + Sync + 'static {
    fn permission(
        &self,
    ) -> impl std::future::Future<Output = Result<PermissionState, NotificationError>> + Send;
}

/// Drives the reminder from periodic permission reads.
pub struct NagPoller<P: PermissionProbe> {
    probe: Arc<P>,
    interval: Duration,
}

impl<P: PermissionProbe> NagPoller<P> {
    pub fn new(probe: P, interval: Duration) -> Self {
        Self {
            probe: Arc::new(probe),
            interval,
        }
    }

    /// Reminder state for a permission: visible unless granted.
    pub fn evaluate(permission: PermissionState) -> ReminderState {
        match permission {
            PermissionState::Granted => ReminderState::Hidden,
            PermissionState::Default | PermissionState::Denied => ReminderState::Visible,
        }
    }

    /// Read the permission once. A failed read keeps `previous`.
    pub async fn poll_once(&self, previous: ReminderState) -> ReminderState {
        match self.probe.permission().await {
            Ok(permission) => Self::evaluate(permission),
            Err(e) => {
                tracing::warn!(error = %e, "notification permission probe failed");
                previous
            }
        }
    }

    /// Start polling. The first read happens immediately.
    ///
    /// The reminder starts visible and is only hidden by a read that
    /// reports the permission as granted.
    pub fn spawn(self, cancel: CancellationToken) -> NagHandle {
        let (tx, rx) = watch::channel(ReminderState::Visible);
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let previous = *tx.borrow();
                        let next = self.poll_once(previous).await;
                        tx.send_if_modified(|current| {
                            if *current == next {
                                return false;
                            }
                            tracing::info!(from = %current, to = %next, "notification reminder changed");
                            *current = next;
                            true
                        });
                    }
                }
            }
            tracing::debug!("notification poller stopped");
        });

        NagHandle {
            reminder: rx,
            cancel,
            task: Some(task),
        }
    }
}

/// Handle to a running poller.
#[derive(Debug)]
pub struct NagHandle {
    reminder: watch::Receiver<ReminderState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl NagHandle {
    /// Latest reminder state.
    pub fn reminder(&self) -> ReminderState {
        *self.reminder.borrow()
    }

    /// A receiver that is notified on every reminder change.
    pub fn subscribe(&self) -> watch::Receiver<ReminderState> {
        self.reminder.clone()
    }

    /// Cancel polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "notification poller task ended abnormally");
            }
        }
    }
}

impl Drop for NagHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
