//! Owned decay loop for the mood engine.
//!
//! `DecayTicker` spawns a tokio task that calls [`ActivityMoodEngine::tick`]
//! on a fixed cadence. The task stops when [`DecayTicker::stop`] is called or
//! the ticker is dropped, so remounting a view never leaks a timer.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;

use super::engine::ActivityMoodEngine;

/// Handle to a running decay loop.
#[derive(Debug)]
pub struct DecayTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl DecayTicker {
    /// Spawn the decay loop on the current tokio runtime.
    pub fn start<C: Clock>(engine: ActivityMoodEngine<C>, period: Duration) -> Self {
        Self::start_with_token(engine, period, CancellationToken::new())
    }

    /// Spawn the decay loop under an existing token (e.g. an app-wide
    /// shutdown token). Cancelling the parent stops the loop.
    pub fn start_with_token<C: Clock>(
        engine: ActivityMoodEngine<C>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            tracing::debug!(period_ms = period.as_millis() as u64, "decay ticker started");
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => engine.tick(),
                }
            }
            tracing::debug!("decay ticker stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the loop and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "decay ticker task ended abnormally");
            }
        }
    }
}

impl Drop for DecayTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mood::engine::TICK_INTERVAL;

    fn idle_engine(level: u8) -> ActivityMoodEngine<ManualClock> {
        let clock = ManualClock::new();
        let engine = ActivityMoodEngine::with_seed(clock.clone(), level);
        clock.advance(Duration::from_secs(6));
        engine
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_decays_idle_engine() {
        let engine = idle_engine(50);
        let ticker = DecayTicker::start(engine.clone(), TICK_INTERVAL);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(engine.activity_level(), 44);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_decay() {
        let engine = idle_engine(50);
        let ticker = DecayTicker::start(engine.clone(), TICK_INTERVAL);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.stop().await;
        let level = engine.activity_level();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.activity_level(), level);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_loop() {
        let engine = idle_engine(80);
        let ticker = DecayTicker::start(engine.clone(), TICK_INTERVAL);
        assert!(ticker.is_running());
        drop(ticker);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.activity_level(), 80);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_token_cancels_loop() {
        let engine = idle_engine(80);
        let shutdown = CancellationToken::new();
        let ticker =
            DecayTicker::start_with_token(engine.clone(), TICK_INTERVAL, shutdown.child_token());

        shutdown.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!ticker.is_running());
        assert_eq!(engine.activity_level(), 80);
    }
}
