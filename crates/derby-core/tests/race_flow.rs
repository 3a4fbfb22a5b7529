//! End-to-end tests: run a seeded race through the engine and the async
//! runner, then derive results from the engine's timing sheet.
//!
//! These exercise the hand-off between the two stages: every finisher's
//! live rank and exact-time rank reach the leaderboard, and derived
//! positions line up with the track geometry.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use derby_core::config::DerbyConfig;
use derby_core::control::{RaceControl, RaceEndReason};
use derby_core::engine::{CompletionReason, EngineSettings, RaceEngine, RaceStatus};
use derby_core::movement::{RngMovementSource, ScriptedMovementSource};
use derby_core::results::derive_results;
use derby_core::runner::{NoOpObserver, RunSettings, run_race};
use derby_types::{Checkpoint, HorseId, Participant, Roster, TrackContext, Weather};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn field() -> Roster {
    [
        ("Golden Sixty", 11.5),
        ("Romantic Warrior", 12.0),
        ("Beauty Joy", 10.5),
        ("California Spangle", 11.0),
        ("Lucky Sweynesse", 10.0),
    ]
    .into_iter()
    .zip(1_u64..)
    .map(|((name, speed), id)| Participant::new(HorseId(id), name, speed))
    .collect()
}

fn track() -> TrackContext {
    TrackContext::new(200.0, Weather::Rain.multiplier())
}

#[test]
fn seeded_race_produces_consistent_results() {
    let mut engine = RaceEngine::new(
        &field(),
        track(),
        EngineSettings::default(),
        RngMovementSource::new(SmallRng::seed_from_u64(2024)),
    )
    .unwrap();

    let status = engine.run_to_completion(Duration::from_millis(50));
    assert_eq!(status, RaceStatus::Completed(CompletionReason::AllFinished));

    let report = engine.report().unwrap();
    assert_eq!(report.timings.len(), 5);
    assert!(report.did_not_finish.is_empty());

    let results = derive_results(&report.timings, &track()).unwrap();
    assert_eq!(results.ranking().len(), 5);

    // Exact-time rank 1 holds the minimum finish time.
    let winner = results.ranking().first().unwrap();
    assert!(results
        .ranking()
        .iter()
        .all(|r| winner.finish_time <= r.finish_time));

    // Live ranks are a permutation of 1..=5 and survive derivation.
    let mut live: Vec<u32> = results.ranking().iter().filter_map(|r| r.live_rank).collect();
    live.sort_unstable();
    assert_eq!(live, vec![1, 2, 3, 4, 5]);

    // Engine times are multiples of the tick, and a race this long never
    // crosses a checkpoint on the start tick, so no positions are missing.
    assert!(results.issues().is_empty());
    for stage in results.replay() {
        let furthest = stage
            .positions
            .iter()
            .filter_map(|(_, p)| *p)
            .fold(f64::MIN, f64::max);
        assert!((furthest - stage.checkpoint_distance).abs() < 1e-9);
    }
}

#[test]
fn same_seed_reproduces_the_race() {
    let run = |seed| {
        let mut engine = RaceEngine::new(
            &field(),
            track(),
            EngineSettings::default(),
            RngMovementSource::new(SmallRng::seed_from_u64(seed)),
        )
        .unwrap();
        engine.run_to_completion(Duration::from_millis(50));
        engine.report().unwrap()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn tick_ties_split_live_and_exact_rankings() {
    // Both horses cross the finish on the same tick; horse 1 is evaluated
    // first and takes live rank 1 even though they share the exact time.
    let roster: Roster = [
        Participant::new(HorseId(1), "Inside Draw", 10.0),
        Participant::new(HorseId(2), "Outside Draw", 10.0),
    ]
    .into_iter()
    .collect();
    let track = TrackContext::new(4.0, 1.0);
    let mut engine = RaceEngine::new(
        &roster,
        track,
        EngineSettings::default(),
        ScriptedMovementSource::constant(0.9),
    )
    .unwrap();
    engine.run_to_completion(Duration::from_millis(50));

    let report = engine.report().unwrap();
    let results = derive_results(&report.timings, &track).unwrap();
    let ranks: Vec<(HorseId, u32, Option<u32>)> = results
        .ranking()
        .iter()
        .map(|r| (r.horse_id, r.rank, r.live_rank))
        .collect();
    assert_eq!(
        ranks,
        vec![(HorseId(1), 1, Some(1)), (HorseId(2), 2, Some(2))]
    );

    // Both horses reached leg 1 on the start tick, which records time zero.
    assert_eq!(results.issues().len(), 2);
    assert!(results
        .get(HorseId(2))
        .unwrap()
        .checkpoint_positions
        .at(Checkpoint::Leg1)
        .is_none());
}

#[tokio::test]
async fn runner_with_config_drives_race_to_completion() {
    let config = DerbyConfig::parse(
        "race:\n  tick_secs: 0.1\n  tick_interval_ms: 0\n  max_ticks: 10000\n",
    )
    .unwrap();
    let mut engine = RaceEngine::new(
        &field(),
        track(),
        EngineSettings::from_config(&config),
        RngMovementSource::new(SmallRng::seed_from_u64(99)),
    )
    .unwrap();
    let control = Arc::new(RaceControl::new(&config.race));
    let settings = RunSettings::from_config(&config.race).unwrap();

    let result = run_race(&mut engine, &settings, &control, &mut NoOpObserver)
        .await
        .unwrap();
    assert_eq!(result.end_reason, RaceEndReason::AllFinished);

    let results = derive_results(&result.report.timings, &track()).unwrap();
    let summary = results.summary().unwrap();
    assert_eq!(summary.field_size, 5);
    assert_eq!(Some(summary.winner), results.winner());
}

#[tokio::test]
async fn stopped_race_ranks_only_finishers() {
    let mut engine = RaceEngine::new(
        &field(),
        track(),
        EngineSettings::default(),
        RngMovementSource::new(SmallRng::seed_from_u64(5)),
    )
    .unwrap();

    // Run part of the race by hand, then stop it through the runner.
    for _ in 0..10 {
        engine.advance(Duration::from_millis(50));
    }
    let control = Arc::new(RaceControl::with_limits(0, 0));
    control.request_stop();
    let result = run_race(
        &mut engine,
        &RunSettings::simulated(Duration::from_millis(50)),
        &control,
        &mut NoOpObserver,
    )
    .await
    .unwrap();

    assert_eq!(result.end_reason, RaceEndReason::StopRequested);
    assert_eq!(result.report.reason, CompletionReason::Halted);
    assert_eq!(result.report.did_not_finish.len(), 5);

    let results = derive_results(&result.report.timings, &track()).unwrap();
    assert!(results.is_empty());
    assert!(results.summary().is_none());
}
