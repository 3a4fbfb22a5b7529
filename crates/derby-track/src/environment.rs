//! Race-day weather generation.
//!
//! Weather is drawn once per race from a weighted table using a seeded
//! RNG, so the same seed always yields the same going:
//!
//! | Weather  | Weight |
//! |----------|--------|
//! | Clear    | 40     |
//! | Overcast | 25     |
//! | Soft     | 15     |
//! | Rain     | 15     |
//! | Storm    | 5      |

use derby_types::Weather;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Weighted weather table.
#[derive(Debug, Clone)]
pub struct WeatherWeights {
    entries: Vec<(Weather, u32)>,
}

impl WeatherWeights {
    /// The standard race-day distribution.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                (Weather::Clear, 40),
                (Weather::Overcast, 25),
                (Weather::Soft, 15),
                (Weather::Rain, 15),
                (Weather::Storm, 5),
            ],
        }
    }

    /// Build a custom table. Zero-weight entries never get selected.
    pub const fn new(entries: Vec<(Weather, u32)>) -> Self {
        Self { entries }
    }

    /// Select the weather for a roll in `[0, total_weight())`.
    fn select(&self, roll: u32) -> Weather {
        let mut cumulative: u32 = 0;
        for &(weather, weight) in &self.entries {
            cumulative = cumulative.saturating_add(weight);
            if roll < cumulative {
                return weather;
            }
        }
        Weather::Clear
    }

    /// Sum of all weights.
    fn total_weight(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |total, &(_, weight)| total.saturating_add(weight))
    }
}

/// Seeded weather generator.
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    rng: StdRng,
    weights: WeatherWeights,
}

impl WeatherSystem {
    /// Create a generator with the standard weights.
    pub fn new(seed: u64) -> Self {
        Self::with_weights(seed, WeatherWeights::standard())
    }

    /// Create a generator with custom weights.
    pub fn with_weights(seed: u64, weights: WeatherWeights) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            weights,
        }
    }

    /// Draw the next race-day weather.
    pub fn generate(&mut self) -> Weather {
        let total = self.weights.total_weight();
        if total == 0 {
            return Weather::Clear;
        }
        let roll = self.rng.random_range(0..total);
        self.weights.select(roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_weather() {
        let mut a = WeatherSystem::new(42);
        let mut b = WeatherSystem::new(42);
        for _ in 0..20 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn zero_weights_default_to_clear() {
        let mut system = WeatherSystem::with_weights(1, WeatherWeights::new(vec![]));
        assert_eq!(system.generate(), Weather::Clear);
    }

    #[test]
    fn single_entry_always_selected() {
        let weights = WeatherWeights::new(vec![(Weather::Clear, 0), (Weather::Storm, 10)]);
        let mut system = WeatherSystem::with_weights(7, weights);
        for _ in 0..50 {
            assert_eq!(system.generate(), Weather::Storm);
        }
    }

    #[test]
    fn standard_table_produces_every_condition() {
        let mut system = WeatherSystem::new(3);
        let seen: std::collections::BTreeSet<Weather> =
            (0..2000).map(|_| system.generate()).collect();
        assert_eq!(seen.len(), Weather::ALL.len());
    }
}
