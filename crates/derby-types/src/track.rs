//! Track geometry, weather, and timing checkpoints.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Track context consumed by the progression engine and results derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackContext {
    /// Track length in track units (metres for catalogue venues).
    pub length: f64,
    /// Multiplier applied on weather-penalized ticks. `1.0` is neutral.
    pub weather_multiplier: f64,
}

impl TrackContext {
    /// Create a track context.
    pub const fn new(length: f64, weather_multiplier: f64) -> Self {
        Self {
            length,
            weather_multiplier,
        }
    }

    /// Whether the length is a finite positive number.
    pub fn has_valid_length(&self) -> bool {
        self.length.is_finite() && self.length > 0.0
    }

    /// Distance from the start at which the given checkpoint lies.
    pub fn checkpoint_distance(&self, checkpoint: Checkpoint) -> f64 {
        self.length * checkpoint.fraction()
    }
}

/// One of the four timing points of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Checkpoint {
    /// End of the first leg (25% of the track).
    Leg1,
    /// End of the second leg (50% of the track).
    Leg2,
    /// End of the third leg (75% of the track).
    Leg3,
    /// The finish line.
    Finish,
}

impl Checkpoint {
    /// All checkpoints in track order.
    pub const ALL: [Self; 4] = [Self::Leg1, Self::Leg2, Self::Leg3, Self::Finish];

    /// The three intermediate legs in track order.
    pub const LEGS: [Self; 3] = [Self::Leg1, Self::Leg2, Self::Leg3];

    /// Fraction of the track length at which this checkpoint lies.
    pub const fn fraction(self) -> f64 {
        match self {
            Self::Leg1 => 0.25,
            Self::Leg2 => 0.5,
            Self::Leg3 => 0.75,
            Self::Finish => 1.0,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leg1 => "First Leg",
            Self::Leg2 => "Second Leg",
            Self::Leg3 => "Third Leg",
            Self::Finish => "Finish",
        }
    }
}

/// Going condition on race day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Dry and sunny.
    Clear,
    /// Cloud cover, good going.
    Overcast,
    /// Soft turf after earlier rain.
    Soft,
    /// Active rain.
    Rain,
    /// Heavy rain and wind.
    Storm,
}

impl Weather {
    /// Every condition, mildest first.
    pub const ALL: [Self; 5] = [
        Self::Clear,
        Self::Overcast,
        Self::Soft,
        Self::Rain,
        Self::Storm,
    ];

    /// Movement multiplier on penalized ticks.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Clear => 1.0,
            Self::Overcast => 0.9,
            Self::Soft => 0.8,
            Self::Rain => 0.7,
            Self::Storm => 0.5,
        }
    }

    /// Parse a condition name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "clear" | "sunny" => Some(Self::Clear),
            "overcast" | "cloudy" => Some(Self::Overcast),
            "soft" => Some(Self::Soft),
            "rain" | "rainy" => Some(Self::Rain),
            "storm" | "stormy" => Some(Self::Storm),
            _ => None,
        }
    }
}

/// A racecourse configuration: a named venue and race distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Venue {
    /// Venue name.
    pub name: String,
    /// Race distance in metres.
    pub distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn checkpoint_distances_follow_fractions() {
        let track = TrackContext::new(1200.0, 1.0);
        assert!(approx(track.checkpoint_distance(Checkpoint::Leg1), 300.0));
        assert!(approx(track.checkpoint_distance(Checkpoint::Leg2), 600.0));
        assert!(approx(track.checkpoint_distance(Checkpoint::Leg3), 900.0));
        assert!(approx(track.checkpoint_distance(Checkpoint::Finish), 1200.0));
    }

    #[test]
    fn checkpoints_are_in_track_order() {
        let fractions: Vec<f64> = Checkpoint::ALL.iter().map(|c| c.fraction()).collect();
        assert!(fractions.windows(2).all(|w| w.first() < w.get(1)));
    }

    #[test]
    fn track_length_validation() {
        assert!(TrackContext::new(1000.0, 1.0).has_valid_length());
        assert!(!TrackContext::new(0.0, 1.0).has_valid_length());
        assert!(!TrackContext::new(-5.0, 1.0).has_valid_length());
        assert!(!TrackContext::new(f64::NAN, 1.0).has_valid_length());
        assert!(!TrackContext::new(f64::INFINITY, 1.0).has_valid_length());
    }

    #[test]
    fn weather_names_parse() {
        assert_eq!(Weather::from_name("Rainy"), Some(Weather::Rain));
        assert_eq!(Weather::from_name(" clear "), Some(Weather::Clear));
        assert_eq!(Weather::from_name("monsoon"), None);
    }

    #[test]
    fn weather_never_boosts_movement() {
        for weather in Weather::ALL {
            assert!(weather.multiplier() <= 1.0);
            assert!(weather.multiplier() > 0.0);
        }
    }
}
