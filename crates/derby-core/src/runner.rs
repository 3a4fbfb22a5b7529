//! Race loop runner with external controls.
//!
//! [`run_race`] is the host loop that drives a [`RaceEngine`] to completion
//! with support for:
//!
//! - **Tick cadence**: sleep a runtime-adjustable interval between ticks
//! - **Time modes**: fixed simulated `dt` or real elapsed time per tick
//! - **Pause/resume** and **stop** through a shared [`RaceControl`]
//! - **Wall-clock budget**: halt once `max_real_time_seconds` is spent
//!
//! The engine's own tick budget still applies, so the loop always ends.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::{RaceConfig, TimeMode};
use crate::control::{RaceControl, RaceEndReason};
use crate::engine::{
    CompletionReason, EngineError, ParticipantRaceState, RaceEngine, RaceReport, RaceStatus,
    TickSummary,
};
use crate::movement::MovementSource;

/// Errors that can occur during a race run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The engine rejected a request.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// The simulated tick length is not a usable duration.
    #[error("invalid tick length {secs}s")]
    InvalidTick {
        /// The rejected length in seconds.
        secs: f64,
    },
}

/// How the runner feeds time to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Time mode.
    pub time_mode: TimeMode,
    /// Race time per tick in simulated mode.
    pub tick: Duration,
}

impl RunSettings {
    /// Build settings from race configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidTick`] if `tick_secs` is negative,
    /// non-finite, or too large for a [`Duration`].
    pub fn from_config(config: &RaceConfig) -> Result<Self, RunnerError> {
        let tick = Duration::try_from_secs_f64(config.tick_secs).map_err(|_err| {
            RunnerError::InvalidTick {
                secs: config.tick_secs,
            }
        })?;
        Ok(Self {
            time_mode: config.time_mode,
            tick,
        })
    }

    /// Simulated mode with the given tick length.
    pub const fn simulated(tick: Duration) -> Self {
        Self {
            time_mode: TimeMode::Simulated,
            tick,
        }
    }
}

/// Result of a race run.
#[derive(Debug)]
pub struct RaceRunResult {
    /// Why the loop ended.
    pub end_reason: RaceEndReason,
    /// The engine's completed-race snapshot.
    pub report: RaceReport,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this loop.
    pub total_ticks: u64,
}

/// Callback invoked after each tick.
///
/// Presentation collaborators can use this to animate positions or stream
/// checkpoint crossings while the race runs.
pub trait TickObserver: Send {
    /// Called after every tick with the engine's current per-horse state.
    fn on_tick(&mut self, summary: &TickSummary, states: &[ParticipantRaceState]);
}

/// A no-op observer.
pub struct NoOpObserver;

impl TickObserver for NoOpObserver {
    fn on_tick(&mut self, _summary: &TickSummary, _states: &[ParticipantRaceState]) {}
}

/// Drive `engine` until the race completes or the loop is stopped.
///
/// A stop request or a spent wall-clock budget halts the engine, so the
/// returned report always describes a completed race.
///
/// # Errors
///
/// Returns [`RunnerError::Engine`] if the engine cannot produce its report.
pub async fn run_race<S: MovementSource>(
    engine: &mut RaceEngine<S>,
    settings: &RunSettings,
    control: &Arc<RaceControl>,
    observer: &mut dyn TickObserver,
) -> Result<RaceRunResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut last_tick_at = Instant::now();

    info!(
        field_size = engine.states().len(),
        time_mode = ?settings.time_mode,
        tick_secs = settings.tick.as_secs_f64(),
        tick_interval_ms = control.tick_interval_ms(),
        max_real_time_seconds = control.max_real_time_seconds(),
        "Race loop starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Race paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Race resumed");
            // Time spent paused is not race time.
            last_tick_at = Instant::now();
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            engine.halt();
            return finish(engine, control, RaceEndReason::StopRequested, last_summary, total_ticks)
                .await;
        }

        // --- Check time limit (before tick) ---
        if control.time_limit_reached() {
            info!(
                max_seconds = control.max_real_time_seconds(),
                elapsed = control.elapsed_seconds(),
                "Real-time limit reached"
            );
            engine.halt();
            return finish(engine, control, RaceEndReason::TimeLimitReached, last_summary, total_ticks)
                .await;
        }

        // --- Execute tick ---
        let now = Instant::now();
        let dt = match settings.time_mode {
            TimeMode::Simulated => settings.tick,
            TimeMode::WallClock => now.saturating_duration_since(last_tick_at),
        };
        last_tick_at = now;

        let summary = engine.step(dt);
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify observer ---
        observer.on_tick(&summary, engine.states());

        // --- Check completion ---
        if let RaceStatus::Completed(reason) = summary.status {
            let end_reason = match reason {
                CompletionReason::AllFinished => RaceEndReason::AllFinished,
                CompletionReason::TickLimitReached => RaceEndReason::TickLimitReached,
                CompletionReason::Halted => RaceEndReason::StopRequested,
            };
            return finish(engine, control, end_reason, Some(summary), total_ticks).await;
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }
}

async fn finish<S>(
    engine: &RaceEngine<S>,
    control: &RaceControl,
    end_reason: RaceEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> Result<RaceRunResult, RunnerError> {
    control.set_end_reason(end_reason).await;
    Ok(RaceRunResult {
        end_reason,
        report: engine.report()?,
        final_summary,
        total_ticks,
    })
}

/// Log the outcome of a race run.
pub fn log_race_end(result: &RaceRunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        elapsed = result.report.elapsed,
        finishers = result.report.timings.len(),
        did_not_finish = result.report.did_not_finish.len(),
        live_winner = result.report.live_winner().map(|id| id.into_inner()),
        "Race ended"
    );

    if result.final_summary.is_none() {
        warn!("Race ended with no ticks executed");
    }
    if !result.report.did_not_finish.is_empty() {
        warn!(
            horses = ?result.report.did_not_finish,
            "Horses did not finish"
        );
    }
}
