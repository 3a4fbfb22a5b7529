//! Race progression engine: the per-tick state machine that moves horses,
//! records checkpoint crossings, and assigns live finishing ranks.
//!
//! The engine never schedules itself. A host loop calls [`RaceEngine::step`]
//! (or [`RaceEngine::advance`]) at its own cadence, passing the race time
//! that elapsed since the previous tick.
//!
//! # State machine
//!
//! ```text
//! NotStarted --first tick--> Running --all finished------> Completed(AllFinished)
//!                                    --tick budget spent--> Completed(TickLimitReached)
//!              (any state) --halt()-------------------------> Completed(Halted)
//! ```
//!
//! The first tick captures the start instant, so anything recorded during it
//! has elapsed time zero. Later ticks add their `dt` before moving horses.
//!
//! # Timing rules
//!
//! - Leg slots are write-once: the first tick at which a horse's position
//!   reaches a checkpoint records the elapsed time, later ticks never
//!   overwrite it.
//! - Live ranks follow crossing order. Horses are evaluated in roster order,
//!   so two horses crossing on the same tick are ranked by roster position,
//!   not by how far past the line they ended up.

use std::time::Duration;

use derby_types::{Checkpoint, FinalizedTimingRecord, HorseId, Roster, TimingSheet, TrackContext};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DerbyConfig;
use crate::movement::{MovementModel, MovementSource};

/// Errors raised while setting up or reading a race.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Track length is not a finite positive number.
    #[error("invalid track length {length}: must be a finite positive number")]
    InvalidTrack {
        /// The rejected length.
        length: f64,
    },

    /// The same horse id appears twice in the roster.
    #[error("duplicate participant in roster: {0}")]
    DuplicateParticipant(HorseId),

    /// The roster has more entrants than ranks can represent.
    #[error("roster too large: {len} participants")]
    RosterTooLarge {
        /// Number of participants supplied.
        len: usize,
    },

    /// Engine settings are out of range.
    #[error("invalid engine settings: {reason}")]
    InvalidSettings {
        /// Explanation of what is wrong.
        reason: String,
    },

    /// Results were requested before the race completed.
    #[error("race still in progress (status: {status:?})")]
    RaceInProgress {
        /// Status at the time of the request.
        status: RaceStatus,
    },
}

/// Why a race stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Every horse crossed the finish line.
    AllFinished,
    /// The tick budget ran out with horses still on the track.
    TickLimitReached,
    /// The host loop stopped the race.
    Halted,
}

/// Lifecycle state of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    /// No tick has run yet.
    NotStarted,
    /// Horses are on the track.
    Running,
    /// No further ticks will change state.
    Completed(CompletionReason),
}

impl RaceStatus {
    /// Whether the race has completed for any reason.
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A horse's finishing data, set exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinishRecord {
    /// Live rank in crossing order (1 = first across the line).
    pub rank: u32,
    /// Elapsed race time at the crossing.
    pub overall_time: f64,
}

/// Mutable race state of one horse, owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantRaceState {
    horse_id: HorseId,
    base_speed: f64,
    position: f64,
    leg_times: [Option<f64>; 3],
    finish: Option<FinishRecord>,
}

impl ParticipantRaceState {
    fn new(horse_id: HorseId, base_speed: f64) -> Self {
        Self {
            horse_id,
            base_speed,
            position: 0.0,
            leg_times: [None; 3],
            finish: None,
        }
    }

    /// The horse.
    pub const fn horse_id(&self) -> HorseId {
        self.horse_id
    }

    /// Speed used for movement (after any configured floor).
    pub const fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// Cumulative distance travelled.
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Whether the horse has crossed the finish line.
    pub const fn is_finished(&self) -> bool {
        self.finish.is_some()
    }

    /// Finishing data, if finished.
    pub const fn finish(&self) -> Option<FinishRecord> {
        self.finish
    }

    /// Live rank, if finished.
    pub fn final_rank(&self) -> Option<u32> {
        self.finish.map(|f| f.rank)
    }

    /// Finish time, if finished.
    pub fn overall_time(&self) -> Option<f64> {
        self.finish.map(|f| f.overall_time)
    }

    /// Recorded time at a checkpoint, if reached.
    pub fn time_at(&self, checkpoint: Checkpoint) -> Option<f64> {
        match checkpoint {
            Checkpoint::Leg1 => self.leg_times.first().copied().flatten(),
            Checkpoint::Leg2 => self.leg_times.get(1).copied().flatten(),
            Checkpoint::Leg3 => self.leg_times.get(2).copied().flatten(),
            Checkpoint::Finish => self.overall_time(),
        }
    }

    fn timing_record(&self) -> Option<FinalizedTimingRecord> {
        self.finish.map(|finish| FinalizedTimingRecord {
            overall_time: finish.overall_time,
            leg1: self.time_at(Checkpoint::Leg1),
            leg2: self.time_at(Checkpoint::Leg2),
            leg3: self.time_at(Checkpoint::Leg3),
            live_rank: Some(finish.rank),
        })
    }
}

/// A checkpoint (or the finish) reached during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckpointCrossing {
    /// The horse.
    pub horse_id: HorseId,
    /// The checkpoint reached.
    pub checkpoint: Checkpoint,
    /// Elapsed race time recorded.
    pub elapsed: f64,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// Tick number (1 for the first tick). Unchanged for ticks on a
    /// completed race.
    pub tick: u64,
    /// Elapsed race time after this tick.
    pub elapsed: f64,
    /// Status after this tick.
    pub status: RaceStatus,
    /// Checkpoints and finishes recorded this tick, in evaluation order.
    pub crossings: Vec<CheckpointCrossing>,
}

/// Frozen view of a completed race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceReport {
    /// Why the race stopped.
    pub reason: CompletionReason,
    /// Ticks executed.
    pub ticks: u64,
    /// Elapsed race time at completion.
    pub elapsed: f64,
    /// Timing records of every finisher, in crossing order.
    pub timings: TimingSheet,
    /// Horses that did not finish, in roster order.
    pub did_not_finish: Vec<HorseId>,
}

impl RaceReport {
    /// The horse ranked first live, if any horse finished.
    pub fn live_winner(&self) -> Option<HorseId> {
        self.timings.entries().first().map(|e| e.horse_id)
    }
}

/// Tunable engine parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// The movement model.
    pub model: MovementModel,
    /// Tick budget. Must be at least 1.
    pub max_ticks: u64,
    /// Speed floor applied at setup.
    pub min_base_speed: Option<f64>,
}

impl EngineSettings {
    /// Derive settings from configuration.
    pub const fn from_config(config: &DerbyConfig) -> Self {
        Self {
            model: MovementModel::from_config(&config.movement),
            max_ticks: config.race.max_ticks,
            min_base_speed: config.movement.min_base_speed,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&DerbyConfig::default())
    }
}

/// One race's progression engine. Create a fresh engine per race.
#[derive(Debug)]
pub struct RaceEngine<S> {
    track: TrackContext,
    leg_thresholds: [f64; 3],
    settings: EngineSettings,
    source: S,
    states: Vec<ParticipantRaceState>,
    field_size: u32,
    finish_order: Vec<HorseId>,
    status: RaceStatus,
    tick: u64,
    elapsed: Duration,
}

impl<S: MovementSource> RaceEngine<S> {
    /// Set up a race for the roster on the given track.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTrack`] for a non-positive or
    /// non-finite length, [`EngineError::DuplicateParticipant`] if a horse
    /// id repeats, [`EngineError::RosterTooLarge`] if ranks cannot be
    /// represented, or [`EngineError::InvalidSettings`] for a zero tick
    /// budget.
    pub fn new(
        roster: &Roster,
        track: TrackContext,
        settings: EngineSettings,
        source: S,
    ) -> Result<Self, EngineError> {
        if !track.has_valid_length() {
            return Err(EngineError::InvalidTrack {
                length: track.length,
            });
        }
        if settings.max_ticks == 0 {
            return Err(EngineError::InvalidSettings {
                reason: "max_ticks must be at least 1".to_owned(),
            });
        }
        if let Some(duplicate) = roster.first_duplicate() {
            return Err(EngineError::DuplicateParticipant(duplicate));
        }
        let field_size = u32::try_from(roster.len())
            .map_err(|_err| EngineError::RosterTooLarge { len: roster.len() })?;

        let states = roster
            .iter()
            .map(|p| {
                let speed = settings
                    .min_base_speed
                    .map_or(p.base_speed, |floor| p.base_speed.max(floor));
                ParticipantRaceState::new(p.horse_id, speed)
            })
            .collect();

        let leg_thresholds = Checkpoint::LEGS.map(|c| track.checkpoint_distance(c));

        debug!(
            field_size,
            length = track.length,
            weather_multiplier = track.weather_multiplier,
            max_ticks = settings.max_ticks,
            "Race engine initialized"
        );

        Ok(Self {
            track,
            leg_thresholds,
            settings,
            source,
            states,
            field_size,
            finish_order: Vec::new(),
            status: RaceStatus::NotStarted,
            tick: 0,
            elapsed: Duration::ZERO,
        })
    }

    /// Run one tick and return its status.
    pub fn advance(&mut self, dt: Duration) -> RaceStatus {
        self.step(dt).status
    }

    /// Run one tick and return everything it recorded.
    ///
    /// `dt` is ignored on the first tick, which defines the start instant.
    /// Ticks on a completed race change nothing.
    pub fn step(&mut self, dt: Duration) -> TickSummary {
        match self.status {
            RaceStatus::Completed(_) => {
                return TickSummary {
                    tick: self.tick,
                    elapsed: self.elapsed.as_secs_f64(),
                    status: self.status,
                    crossings: Vec::new(),
                };
            }
            RaceStatus::NotStarted => {
                self.status = RaceStatus::Running;
                info!(
                    field_size = self.field_size,
                    length = self.track.length,
                    "Race started"
                );
            }
            RaceStatus::Running => {
                self.elapsed = self.elapsed.saturating_add(dt);
            }
        }

        self.tick = self.tick.saturating_add(1);
        let elapsed = self.elapsed.as_secs_f64();
        let mut crossings = Vec::new();

        for state in self.states.iter_mut().filter(|s| !s.is_finished()) {
            let draw = self.source.draw();
            let movement = self.settings.model.distance(
                draw,
                state.base_speed,
                self.track.weather_multiplier,
            );
            state.position += movement;

            let legs = state
                .leg_times
                .iter_mut()
                .zip(self.leg_thresholds.iter())
                .zip(Checkpoint::LEGS);
            for ((slot, &threshold), checkpoint) in legs {
                if state.position >= threshold && slot.is_none() {
                    *slot = Some(elapsed);
                    debug!(
                        tick = self.tick,
                        horse_id = %state.horse_id,
                        checkpoint = checkpoint.label(),
                        elapsed,
                        "Checkpoint reached"
                    );
                    crossings.push(CheckpointCrossing {
                        horse_id: state.horse_id,
                        checkpoint,
                        elapsed,
                    });
                }
            }

            if state.position >= self.track.length && state.finish.is_none() {
                let rank = u32::try_from(self.finish_order.len())
                    .unwrap_or(u32::MAX)
                    .saturating_add(1);
                state.finish = Some(FinishRecord {
                    rank,
                    overall_time: elapsed,
                });
                self.finish_order.push(state.horse_id);
                info!(
                    tick = self.tick,
                    horse_id = %state.horse_id,
                    rank,
                    elapsed,
                    "Horse crossed the finish line"
                );
                crossings.push(CheckpointCrossing {
                    horse_id: state.horse_id,
                    checkpoint: Checkpoint::Finish,
                    elapsed,
                });
            }
        }

        if self.finish_order.len() == self.states.len() {
            self.status = RaceStatus::Completed(CompletionReason::AllFinished);
            info!(tick = self.tick, elapsed, "All horses finished");
        } else if self.tick >= self.settings.max_ticks {
            self.status = RaceStatus::Completed(CompletionReason::TickLimitReached);
            warn!(
                tick = self.tick,
                max_ticks = self.settings.max_ticks,
                still_running = self.states.len().saturating_sub(self.finish_order.len()),
                "Tick limit reached, unfinished horses marked did-not-finish"
            );
        }

        TickSummary {
            tick: self.tick,
            elapsed,
            status: self.status,
            crossings,
        }
    }

    /// Run ticks of `dt` until the race completes.
    pub fn run_to_completion(&mut self, dt: Duration) -> RaceStatus {
        loop {
            let status = self.advance(dt);
            if status.is_completed() {
                return status;
            }
        }
    }
}

impl<S> RaceEngine<S> {
    /// Stop the race. Finished horses keep their data; the rest become
    /// did-not-finish. No effect on a race that already completed.
    pub fn halt(&mut self) -> RaceStatus {
        if !self.status.is_completed() {
            self.status = RaceStatus::Completed(CompletionReason::Halted);
            warn!(
                tick = self.tick,
                finished = self.finish_order.len(),
                field_size = self.field_size,
                "Race halted"
            );
        }
        self.status
    }

    /// Current status.
    pub const fn status(&self) -> RaceStatus {
        self.status
    }

    /// Ticks executed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed race time.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Track the race is run on.
    pub const fn track(&self) -> &TrackContext {
        &self.track
    }

    /// Per-horse state, in roster order. Values may be mid-race.
    pub fn states(&self) -> &[ParticipantRaceState] {
        &self.states
    }

    /// State of one horse.
    pub fn state(&self, horse_id: HorseId) -> Option<&ParticipantRaceState> {
        self.states.iter().find(|s| s.horse_id == horse_id)
    }

    /// Horses that have finished, in crossing order.
    pub fn finish_order(&self) -> &[HorseId] {
        &self.finish_order
    }

    /// The first horse across the line, if any.
    pub fn live_winner(&self) -> Option<HorseId> {
        self.finish_order.first().copied()
    }

    /// Snapshot the completed race.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaceInProgress`] unless the race has completed.
    pub fn report(&self) -> Result<RaceReport, EngineError> {
        let RaceStatus::Completed(reason) = self.status else {
            return Err(EngineError::RaceInProgress {
                status: self.status,
            });
        };

        let timings = self
            .finish_order
            .iter()
            .filter_map(|id| {
                self.state(*id)
                    .and_then(ParticipantRaceState::timing_record)
                    .map(|record| (*id, record))
            })
            .collect();

        let did_not_finish = self
            .states
            .iter()
            .filter(|s| !s.is_finished())
            .map(|s| s.horse_id)
            .collect();

        Ok(RaceReport {
            reason,
            ticks: self.tick,
            elapsed: self.elapsed.as_secs_f64(),
            timings,
            did_not_finish,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use derby_types::Participant;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::movement::{RngMovementSource, ScriptedMovementSource};

    const DT: Duration = Duration::from_millis(50);

    fn roster(speeds: &[f64]) -> Roster {
        speeds
            .iter()
            .zip(1_u64..)
            .map(|(&speed, id)| Participant::new(HorseId(id), format!("Horse {id}"), speed))
            .collect()
    }

    fn settings(max_ticks: u64) -> EngineSettings {
        EngineSettings {
            max_ticks,
            ..EngineSettings::default()
        }
    }

    fn seeded_engine(speeds: &[f64], seed: u64) -> RaceEngine<RngMovementSource<SmallRng>> {
        RaceEngine::new(
            &roster(speeds),
            TrackContext::new(100.0, 0.7),
            EngineSettings::default(),
            RngMovementSource::new(SmallRng::seed_from_u64(seed)),
        )
        .unwrap()
    }

    #[test]
    fn first_tick_starts_race_at_time_zero() {
        let mut engine = RaceEngine::new(
            &roster(&[10.0]),
            TrackContext::new(100.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        assert_eq!(engine.status(), RaceStatus::NotStarted);

        let summary = engine.step(Duration::from_secs(5));
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.status, RaceStatus::Running);
        assert_eq!(engine.elapsed(), Duration::ZERO);

        engine.step(DT);
        assert_eq!(engine.elapsed(), DT);
    }

    #[test]
    fn position_is_non_decreasing_every_tick() {
        let mut engine = seeded_engine(&[12.0, 10.0, 8.0, 11.0, 9.5], 7);
        let mut previous: Vec<f64> = engine.states().iter().map(|s| s.position()).collect();
        while !engine.advance(DT).is_completed() {
            let current: Vec<f64> = engine.states().iter().map(|s| s.position()).collect();
            assert!(current.iter().zip(&previous).all(|(c, p)| c >= p));
            previous = current;
        }
    }

    #[test]
    fn leg_times_are_ordered_for_finishers() {
        for seed in 0..20 {
            let mut engine = seeded_engine(&[12.0, 10.0, 8.0, 11.0, 9.5], seed);
            engine.run_to_completion(DT);
            for state in engine.states() {
                let times: Vec<f64> = Checkpoint::ALL
                    .iter()
                    .map(|c| state.time_at(*c).unwrap())
                    .collect();
                assert!(times.windows(2).all(|w| w.first() <= w.get(1)));
            }
        }
    }

    #[test]
    fn leg_slots_are_write_once() {
        // Speed 10, scale 0.1: one unit per normal tick on a 4-unit track.
        let mut engine = RaceEngine::new(
            &roster(&[10.0]),
            TrackContext::new(4.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();

        engine.advance(DT); // position 1.0, leg 1 at t=0
        let leg1 = engine.states().first().unwrap().time_at(Checkpoint::Leg1);
        assert_eq!(leg1, Some(0.0));

        engine.advance(DT); // position 2.0, leg 2
        engine.advance(DT); // position 3.0, leg 3
        let state = engine.states().first().unwrap();
        assert_eq!(state.time_at(Checkpoint::Leg1), leg1);
        assert!(state.time_at(Checkpoint::Leg2).is_some_and(|t| (t - 0.05).abs() < 1e-9));
        assert!(state.time_at(Checkpoint::Leg3).is_some_and(|t| (t - 0.1).abs() < 1e-9));
    }

    #[test]
    fn big_step_records_all_legs_on_same_tick() {
        let mut engine = RaceEngine::new(
            &roster(&[100.0]),
            TrackContext::new(5.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        let summary = engine.step(DT);
        assert_eq!(summary.crossings.len(), 4);
        assert_eq!(summary.status, RaceStatus::Completed(CompletionReason::AllFinished));
        let report = engine.report().unwrap();
        let record = report.timings.get(HorseId(1)).unwrap();
        assert_eq!(record.leg1, Some(0.0));
        assert_eq!(record.leg3, Some(0.0));
        assert_eq!(record.live_rank, Some(1));
    }

    #[test]
    fn live_ranks_form_a_permutation() {
        for seed in 0..20 {
            let mut engine = seeded_engine(&[12.0, 10.0, 8.0, 11.0, 9.5, 10.5], seed);
            let status = engine.run_to_completion(DT);
            assert_eq!(status, RaceStatus::Completed(CompletionReason::AllFinished));
            let mut ranks: Vec<u32> = engine.states().iter().filter_map(|s| s.final_rank()).collect();
            ranks.sort_unstable();
            assert_eq!(ranks, (1..=6).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn same_tick_finishers_ranked_by_roster_order() {
        // Both horses cover the 1-unit track on the first tick.
        let mut engine = RaceEngine::new(
            &roster(&[10.0, 50.0]),
            TrackContext::new(1.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        engine.advance(DT);
        assert_eq!(engine.finish_order(), &[HorseId(1), HorseId(2)]);
        assert_eq!(engine.live_winner(), Some(HorseId(1)));
        assert_eq!(engine.state(HorseId(2)).unwrap().final_rank(), Some(2));
    }

    #[test]
    fn scripted_bands_move_exact_distances() {
        let mut engine = RaceEngine::new(
            &roster(&[10.0]),
            TrackContext::new(100.0, 0.5),
            EngineSettings::default(),
            ScriptedMovementSource::new([0.01, 0.1, 0.5], 0.0),
        )
        .unwrap();
        engine.advance(DT);
        assert!((engine.states().first().unwrap().position() - 0.0).abs() < 1e-12);
        engine.advance(DT);
        assert!((engine.states().first().unwrap().position() - 0.5).abs() < 1e-12);
        engine.advance(DT);
        assert!((engine.states().first().unwrap().position() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn negative_weather_never_reduces_position() {
        let mut engine = RaceEngine::new(
            &roster(&[10.0]),
            TrackContext::new(100.0, -2.0),
            EngineSettings::default(),
            ScriptedMovementSource::new([0.9, 0.1, 0.1], 0.1),
        )
        .unwrap();
        engine.advance(DT);
        let after_normal = engine.states().first().unwrap().position();
        engine.advance(DT);
        engine.advance(DT);
        assert!((engine.states().first().unwrap().position() - after_normal).abs() < 1e-12);
    }

    #[test]
    fn stalled_horse_hits_tick_limit_and_is_dnf() {
        let mut engine = RaceEngine::new(
            &roster(&[10.0, 0.0]),
            TrackContext::new(2.0, 1.0),
            settings(50),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        let status = engine.run_to_completion(DT);
        assert_eq!(status, RaceStatus::Completed(CompletionReason::TickLimitReached));
        assert_eq!(engine.tick(), 50);

        let report = engine.report().unwrap();
        assert_eq!(report.did_not_finish, vec![HorseId(2)]);
        assert_eq!(report.timings.len(), 1);
        assert!(report.timings.contains(HorseId(1)));
    }

    #[test]
    fn min_speed_floor_rescues_stalled_horse() {
        let mut engine = RaceEngine::new(
            &roster(&[0.0]),
            TrackContext::new(2.0, 1.0),
            EngineSettings {
                min_base_speed: Some(5.0),
                ..settings(50)
            },
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        assert!((engine.states().first().unwrap().base_speed() - 5.0).abs() < 1e-12);
        assert_eq!(
            engine.run_to_completion(DT),
            RaceStatus::Completed(CompletionReason::AllFinished)
        );
    }

    #[test]
    fn empty_roster_completes_on_first_tick() {
        let mut engine = RaceEngine::new(
            &Roster::default(),
            TrackContext::new(100.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        assert_eq!(
            engine.advance(DT),
            RaceStatus::Completed(CompletionReason::AllFinished)
        );
        let report = engine.report().unwrap();
        assert!(report.timings.is_empty());
        assert!(report.did_not_finish.is_empty());
        assert!(report.live_winner().is_none());
    }

    #[test]
    fn halt_leaves_inspectable_partial_state() {
        let mut engine = RaceEngine::new(
            &roster(&[100.0, 1.0]),
            TrackContext::new(10.0, 1.0),
            EngineSettings::default(),
            ScriptedMovementSource::constant(0.9),
        )
        .unwrap();
        engine.advance(DT);
        assert_eq!(engine.status(), RaceStatus::Running);

        assert_eq!(engine.halt(), RaceStatus::Completed(CompletionReason::Halted));
        let before = engine.states().to_vec();
        assert_eq!(engine.advance(DT), RaceStatus::Completed(CompletionReason::Halted));
        assert_eq!(engine.states(), before.as_slice());

        let report = engine.report().unwrap();
        assert_eq!(report.reason, CompletionReason::Halted);
        assert_eq!(report.did_not_finish, vec![HorseId(2)]);
        assert_eq!(report.live_winner(), Some(HorseId(1)));
        assert!(engine.state(HorseId(2)).unwrap().final_rank().is_none());
    }

    #[test]
    fn report_before_completion_is_an_error() {
        let mut engine = seeded_engine(&[10.0], 1);
        assert!(matches!(
            engine.report(),
            Err(EngineError::RaceInProgress {
                status: RaceStatus::NotStarted
            })
        ));
        engine.advance(DT);
        assert!(engine.report().is_err());
    }

    #[test]
    fn rejects_invalid_setup() {
        let source = || ScriptedMovementSource::constant(0.9);
        assert!(matches!(
            RaceEngine::new(&roster(&[10.0]), TrackContext::new(0.0, 1.0), EngineSettings::default(), source()),
            Err(EngineError::InvalidTrack { .. })
        ));
        assert!(matches!(
            RaceEngine::new(&roster(&[10.0]), TrackContext::new(f64::NAN, 1.0), EngineSettings::default(), source()),
            Err(EngineError::InvalidTrack { .. })
        ));
        assert!(matches!(
            RaceEngine::new(&roster(&[10.0]), TrackContext::new(10.0, 1.0), settings(0), source()),
            Err(EngineError::InvalidSettings { .. })
        ));

        let mut dup = roster(&[10.0, 11.0]);
        dup.participants.push(Participant::new(HorseId(1), "Again", 9.0));
        assert!(matches!(
            RaceEngine::new(&dup, TrackContext::new(10.0, 1.0), EngineSettings::default(), source()),
            Err(EngineError::DuplicateParticipant(HorseId(1)))
        ));
    }

    #[test]
    fn report_lists_finishers_in_crossing_order() {
        let mut engine = seeded_engine(&[12.0, 6.0, 9.0], 11);
        engine.run_to_completion(DT);
        let report = engine.report().unwrap();
        let order: Vec<HorseId> = report.timings.entries().iter().map(|e| e.horse_id).collect();
        assert_eq!(order, engine.finish_order());
        for (entry, expected_rank) in report.timings.entries().iter().zip(1_u32..) {
            assert_eq!(entry.record.live_rank, Some(expected_rank));
        }
    }
}
