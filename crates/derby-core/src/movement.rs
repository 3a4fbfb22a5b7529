//! Randomized movement model and the random sources that drive it.
//!
//! Every tick each running horse takes one uniform draw `r` in `[0, 1)`:
//!
//! | Draw                                   | Stride    | Distance                          |
//! |----------------------------------------|-----------|-----------------------------------|
//! | `r < stumble_below`                    | Stumble   | 0                                 |
//! | `stumble_below <= r < penalized_below` | Penalized | `base_speed * weather * scale`    |
//! | otherwise                              | Normal    | `base_speed * scale`              |
//!
//! Distances are clamped at zero so a malformed (negative) weather
//! multiplier or speed can never move a horse backwards.
//!
//! Draws come from a [`MovementSource`]. [`RngMovementSource`] wraps any
//! `rand` RNG; [`ScriptedMovementSource`] replays a fixed sequence so tests
//! can hit each band exactly.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::MovementConfig;

/// A source of uniform draws in `[0, 1)`.
pub trait MovementSource {
    /// Produce the next draw.
    fn draw(&mut self) -> f64;
}

/// Draws from a `rand` RNG.
#[derive(Debug, Clone)]
pub struct RngMovementSource<R> {
    rng: R,
}

impl<R: Rng> RngMovementSource<R> {
    /// Wrap an RNG.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MovementSource for RngMovementSource<R> {
    fn draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of draws, then repeats a fallback value.
#[derive(Debug, Clone)]
pub struct ScriptedMovementSource {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedMovementSource {
    /// Replay `draws` in order, then return `fallback` forever.
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback,
        }
    }

    /// Always return the same draw.
    pub const fn constant(draw: f64) -> Self {
        Self {
            draws: VecDeque::new(),
            fallback: draw,
        }
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl MovementSource for ScriptedMovementSource {
    fn draw(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

/// Which band a draw fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// No movement this tick.
    Stumble,
    /// Weather-scaled movement.
    Penalized,
    /// Full movement.
    Normal,
}

/// The three-band movement model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementModel {
    step_scale: f64,
    stumble_below: f64,
    penalized_below: f64,
}

impl MovementModel {
    /// Build the model from configuration.
    pub const fn from_config(config: &MovementConfig) -> Self {
        Self {
            step_scale: config.step_scale,
            stumble_below: config.stumble_below,
            penalized_below: config.penalized_below,
        }
    }

    /// Classify a draw.
    pub fn stride(&self, draw: f64) -> Stride {
        if draw < self.stumble_below {
            Stride::Stumble
        } else if draw < self.penalized_below {
            Stride::Penalized
        } else {
            Stride::Normal
        }
    }

    /// Distance covered for a draw. Never negative, never NaN.
    pub fn distance(&self, draw: f64, base_speed: f64, weather_multiplier: f64) -> f64 {
        let raw = match self.stride(draw) {
            Stride::Stumble => 0.0,
            Stride::Penalized => base_speed * weather_multiplier * self.step_scale,
            Stride::Normal => base_speed * self.step_scale,
        };
        // f64::max returns the non-NaN operand.
        raw.max(0.0)
    }
}

impl Default for MovementModel {
    fn default() -> Self {
        Self::from_config(&MovementConfig::default())
    }
}
