//! Race progression, race loop, and results derivation for the Derby race
//! simulation.
//!
//! A race runs in two stages. The [`RaceEngine`] advances every horse tick
//! by tick until all finish (or the race is stopped) and hands back a
//! [`RaceReport`] holding the timing sheet. [`derive_results`] then ranks
//! the sheet by exact time and normalizes checkpoint positions for replay.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `derby-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`RaceControl`] shared stop/pause/interval state.
//! - [`engine`] -- The per-tick progression state machine.
//! - [`movement`] -- Movement bands and the [`MovementSource`] trait.
//! - [`results`] -- Ranking, checkpoint normalization, replay stages.
//! - [`runner`] -- The async host loop that drives an engine.
//!
//! [`RaceEngine`]: engine::RaceEngine
//! [`RaceReport`]: engine::RaceReport
//! [`derive_results`]: results::derive_results
//! [`RaceControl`]: control::RaceControl
//! [`MovementSource`]: movement::MovementSource

pub mod config;
pub mod control;
pub mod engine;
pub mod movement;
pub mod results;
pub mod runner;
