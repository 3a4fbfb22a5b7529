//! Venues, weather, and race cards for the Derby race simulation.
//!
//! This crate is the track/weather provider: it decides where a race is
//! run and in what going, and reduces that to the [`TrackContext`] the
//! progression engine consumes.
//!
//! # Modules
//!
//! - [`conditions`] -- [`TrackConditions`] and race card postponement.
//! - [`environment`] -- Seeded weighted weather generation.
//! - [`error`] -- Error types for track operations.
//! - [`venue`] -- The venue catalogue.
//!
//! [`TrackContext`]: derby_types::TrackContext

pub mod conditions;
pub mod environment;
pub mod error;
pub mod venue;

pub use conditions::{TrackConditions, postpone};
pub use environment::{WeatherSystem, WeatherWeights};
pub use error::TrackError;
pub use venue::VenueCatalog;
