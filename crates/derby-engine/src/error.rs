//! Error types for the race runner binary.
//!
//! [`AppError`] wraps every failure mode of startup, the race loop, and
//! results output so `main` can propagate with `?`.

/// Top-level error for the race runner binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: derby_core::config::ConfigError,
    },

    /// Venue or weather selection failed.
    #[error("track error: {source}")]
    Track {
        /// The underlying track error.
        #[from]
        source: derby_track::TrackError,
    },

    /// The engine rejected the race setup.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: derby_core::engine::EngineError,
    },

    /// The race loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: derby_core::runner::RunnerError,
    },

    /// Results could not be derived.
    #[error("derivation error: {source}")]
    Derivation {
        /// The underlying derivation error.
        #[from]
        source: derby_core::results::DerivationError,
    },

    /// Results could not be serialized.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The field of runners could not be assembled.
    #[error("roster error: {message}")]
    Roster {
        /// Description of the roster failure.
        message: String,
    },
}
