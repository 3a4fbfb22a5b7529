//! Shared race control state.
//!
//! [`RaceControl`] is wrapped in an [`Arc`](std::sync::Arc) and shared
//! between the race loop and whatever else needs to steer it (a Ctrl-C
//! handler, a presentation task). Other tasks can pause and resume the
//! race, change the tick interval, or request a stop. The race loop reads
//! every field on its hot path without taking a lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, Notify};

use crate::config::RaceConfig;

/// Longest tick interval accepted at runtime, in milliseconds.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Why the race loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceEndReason {
    /// Every horse crossed the finish line.
    AllFinished,
    /// The engine's tick budget ran out.
    TickLimitReached,
    /// The wall-clock budget ran out.
    TimeLimitReached,
    /// Another task requested a stop.
    StopRequested,
}

/// Shared control state for one race loop.
#[derive(Debug)]
pub struct RaceControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    tick_interval_ms: AtomicU64,
    started_at: DateTime<Utc>,
    /// Wall-clock budget in seconds (0 = unlimited).
    max_real_time_seconds: u64,
    end_reason: Mutex<Option<RaceEndReason>>,
}

impl RaceControl {
    /// Create control state from race configuration. The wall-clock budget
    /// starts counting now.
    pub fn new(config: &RaceConfig) -> Self {
        Self::with_limits(config.tick_interval_ms, config.max_real_time_seconds)
    }

    /// Create control state with explicit limits.
    pub fn with_limits(tick_interval_ms: u64, max_real_time_seconds: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the race is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the race. The loop sleeps until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the race and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the race is no longer paused.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a stop. A paused loop is woken so it can observe the request.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record why the loop ended.
    pub async fn set_end_reason(&self, reason: RaceEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Why the loop ended, if it has.
    pub async fn end_reason(&self) -> Option<RaceEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds (0 = no sleep).
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds.
    ///
    /// Returns the previous interval, or `None` if `ms` exceeds
    /// [`MAX_TICK_INTERVAL_MS`].
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms > MAX_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether the wall-clock budget is spent.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole wall-clock seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Clock skew can make this negative.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured wall-clock budget.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn initial_state_is_running() {
        let control = RaceControl::new(&RaceConfig::default());
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert_eq!(control.tick_interval_ms(), 50);
    }

    #[test]
    fn pause_and_resume() {
        let control = RaceControl::with_limits(0, 0);
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
    }

    #[test]
    fn stop_request_clears_pause() {
        let control = RaceControl::with_limits(0, 0);
        control.pause();
        control.request_stop();
        assert!(control.is_stop_requested());
        assert!(!control.is_paused());
    }

    #[test]
    fn set_tick_interval() {
        let control = RaceControl::with_limits(50, 0);
        assert_eq!(control.set_tick_interval_ms(0), Some(50));
        assert_eq!(control.tick_interval_ms(), 0);
    }

    #[test]
    fn reject_oversized_interval() {
        let control = RaceControl::with_limits(50, 0);
        assert!(control.set_tick_interval_ms(MAX_TICK_INTERVAL_MS.saturating_add(1)).is_none());
        assert_eq!(control.tick_interval_ms(), 50);
    }

    #[test]
    fn time_limit_zero_means_unlimited() {
        let control = RaceControl::with_limits(0, 0);
        assert!(!control.time_limit_reached());
    }

    #[tokio::test]
    async fn end_reason_is_recorded() {
        let control = RaceControl::with_limits(0, 0);
        assert!(control.end_reason().await.is_none());
        control.set_end_reason(RaceEndReason::StopRequested).await;
        assert_eq!(control.end_reason().await, Some(RaceEndReason::StopRequested));
    }

    #[tokio::test]
    async fn resume_wakes_waiting_task() {
        let control = Arc::new(RaceControl::with_limits(0, 0));
        control.pause();

        let waiter = {
            let control = Arc::clone(&control);
            tokio::spawn(async move { control.wait_if_paused().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        control.resume();

        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}
