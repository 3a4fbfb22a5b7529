//! Error types for the `derby-track` crate.

/// Errors that can occur while preparing track conditions or race cards.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The requested venue is not in the catalogue.
    #[error("unknown venue: {0}")]
    UnknownVenue(String),

    /// The requested weather condition name is not recognised.
    #[error("unknown weather condition: {0}")]
    UnknownWeather(String),

    /// A track length that is not a finite positive number.
    #[error("invalid track length {length}: must be a finite positive number")]
    InvalidLength {
        /// The rejected length.
        length: f64,
    },

    /// Moving a race date would leave the supported calendar range.
    #[error("cannot postpone race by {days} days: date out of range")]
    DateOutOfRange {
        /// Requested postponement in days.
        days: u32,
    },
}
