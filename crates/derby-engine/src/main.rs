//! Race runner binary for the Derby race simulation.
//!
//! This is the main entry point that wires together the track provider,
//! the roster provider, the progression engine, and the race loop. It
//! loads configuration, runs one race to completion, derives the results,
//! logs the leaderboard, and writes the results as JSON to stdout.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `derby-config.yaml` (or `DERBY_CONFIG`)
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Resolve the seed
//! 4. Select venue and weather, build the race card
//! 5. Assemble the roster
//! 6. Create the race engine
//! 7. Create race control and install the Ctrl-C handler
//! 8. Run the race loop
//! 9. Derive results, log the leaderboard, write JSON

mod error;
mod roster;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use derby_core::config::{DerbyConfig, LogFormat, LoggingConfig, TrackConfig};
use derby_core::control::RaceControl;
use derby_core::engine::{EngineSettings, RaceEngine};
use derby_core::movement::RngMovementSource;
use derby_core::results::{RaceResults, derive_results};
use derby_core::runner::{self, NoOpObserver, RunSettings};
use derby_track::{TrackConditions, TrackError, VenueCatalog, WeatherSystem};
use derby_types::{HorseId, RaceCard, RaceSummary, ReplayStage, Roster, Venue, Weather};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "derby-config.yaml";

/// Everything written to stdout once the race is over.
#[derive(Debug, Serialize)]
struct RaceOutput<'a> {
    card: &'a RaceCard,
    seed: u64,
    end_reason: derby_core::control::RaceEndReason,
    ticks: u64,
    elapsed: f64,
    did_not_finish: &'a [HorseId],
    summary: Option<RaceSummary>,
    results: &'a RaceResults,
    replay: Vec<ReplayStage>,
}

/// Application entry point for the race runner.
///
/// # Errors
///
/// Returns an error if any setup step, the race loop, or results output
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path();
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("derby-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Resolve the seed.
    let seed = config.race.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        seed,
        tick_secs = config.race.tick_secs,
        tick_interval_ms = config.race.tick_interval_ms,
        time_mode = ?config.race.time_mode,
        max_ticks = config.race.max_ticks,
        "Race settings resolved"
    );
    let mut setup_rng = SmallRng::seed_from_u64(seed);

    // 4. Select venue and weather.
    let conditions = select_conditions(&config.track, seed, &mut setup_rng)?;
    let field_size_hint = u32::try_from(config.roster.entrants.len())
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(config.roster.field_size);
    let card = conditions.race_card(chrono::Utc::now().date_naive(), field_size_hint);
    info!(
        race_id = %card.race_id,
        venue = %card.venue.name,
        distance = card.venue.distance,
        weather = ?card.weather,
        weather_multiplier = card.weather.multiplier(),
        "Track conditions selected"
    );

    // 5. Assemble the roster.
    let roster = roster::build_roster(&config.roster, &mut setup_rng)?;

    // 6. Create the race engine.
    let movement = RngMovementSource::new(SmallRng::seed_from_u64(seed.wrapping_add(1)));
    let mut engine = RaceEngine::new(
        &roster,
        conditions.context(),
        EngineSettings::from_config(&config),
        movement,
    )
    .map_err(AppError::from)?;

    // 7. Create race control and install the Ctrl-C handler.
    let control = Arc::new(RaceControl::new(&config.race));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping race");
                    control.request_stop();
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
            }
        });
    }
    let settings = RunSettings::from_config(&config.race).map_err(AppError::from)?;

    // 8. Run the race loop.
    let result = runner::run_race(&mut engine, &settings, &control, &mut NoOpObserver)
        .await
        .map_err(AppError::from)?;
    runner::log_race_end(&result);

    // 9. Derive results and write them out.
    let results = derive_results(&result.report.timings, &conditions.context())
        .map_err(AppError::from)?;
    log_leaderboard(&results, &roster);

    let output = RaceOutput {
        card: &card,
        seed,
        end_reason: result.end_reason,
        ticks: result.report.ticks,
        elapsed: result.report.elapsed,
        did_not_finish: &result.report.did_not_finish,
        summary: results.summary(),
        results: &results,
        replay: results.replay(),
    };
    let json = serde_json::to_string_pretty(&output).map_err(AppError::from)?;
    println!("{json}");

    info!(
        end_reason = ?result.end_reason,
        winner = results.winner().map(HorseId::into_inner),
        "derby-engine shutdown complete"
    );

    Ok(())
}

/// Configuration path: `DERBY_CONFIG` if set, else `derby-config.yaml`.
fn config_path() -> PathBuf {
    std::env::var_os("DERBY_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration and report whether a file was found. Without a
/// file the defaults are used, with `DERBY_SEED` still applied.
fn load_config(path: &Path) -> Result<(DerbyConfig, bool), AppError> {
    if path.exists() {
        Ok((DerbyConfig::from_file(path)?, true))
    } else {
        Ok((DerbyConfig::parse("")?, false))
    }
}

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// carries only the results JSON.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Choose venue and weather from configuration, falling back to the
/// catalogue and seeded weather generation for unset fields.
fn select_conditions(
    track: &TrackConfig,
    seed: u64,
    rng: &mut SmallRng,
) -> Result<TrackConditions, TrackError> {
    let weather = match track.weather.as_deref() {
        Some(name) => {
            Weather::from_name(name).ok_or_else(|| TrackError::UnknownWeather(name.to_owned()))?
        }
        None => WeatherSystem::new(seed).generate(),
    };

    let catalog = VenueCatalog::standard();
    let venue = match (track.venue.as_deref(), track.length) {
        (Some(name), distance) => catalog.find(name, distance)?,
        (None, Some(distance)) => Venue {
            name: "Custom".to_owned(),
            distance,
        },
        (None, None) => catalog.pick(rng)?,
    };

    TrackConditions::new(venue, weather)
}

/// Log one line per ranked horse, fastest first.
fn log_leaderboard(results: &RaceResults, roster: &Roster) {
    for row in results.ranking() {
        let name = roster
            .get(row.horse_id)
            .map_or("<unknown>", |p| p.name.as_str());
        info!(
            rank = row.rank,
            live_rank = row.live_rank,
            horse_id = %row.horse_id,
            horse = name,
            finish_time = row.finish_time,
            "Leaderboard"
        );
    }
    for issue in results.issues() {
        warn!(%issue, "Incomplete checkpoint data");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn configured_venue_and_weather_are_used() {
        let track = TrackConfig {
            venue: Some("Happy Valley".to_owned()),
            length: Some(1650.0),
            weather: Some("storm".to_owned()),
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let conditions = select_conditions(&track, 1, &mut rng).unwrap();
        assert_eq!(conditions.venue.name, "Happy Valley");
        assert_eq!(conditions.weather, Weather::Storm);
        assert!((conditions.context().length - 1650.0).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_length_without_venue() {
        let track = TrackConfig {
            venue: None,
            length: Some(500.0),
            weather: Some("clear".to_owned()),
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let conditions = select_conditions(&track, 1, &mut rng).unwrap();
        assert_eq!(conditions.venue.name, "Custom");
        assert!((conditions.context().weather_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unset_track_is_picked_from_catalogue() {
        let mut rng = SmallRng::seed_from_u64(9);
        let conditions = select_conditions(&TrackConfig::default(), 9, &mut rng).unwrap();
        assert!(VenueCatalog::standard().venues().contains(&conditions.venue));
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut rng = SmallRng::seed_from_u64(1);
        let bad_weather = TrackConfig {
            weather: Some("hail".to_owned()),
            ..TrackConfig::default()
        };
        assert!(matches!(
            select_conditions(&bad_weather, 1, &mut rng),
            Err(TrackError::UnknownWeather(_))
        ));
        let bad_venue = TrackConfig {
            venue: Some("Ascot".to_owned()),
            ..TrackConfig::default()
        };
        assert!(matches!(
            select_conditions(&bad_venue, 1, &mut rng),
            Err(TrackError::UnknownVenue(_))
        ));
    }
}
