//! Configuration loading and typed config structures for the Derby
//! simulation.
//!
//! The canonical configuration lives in `derby-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file) yields a
//! runnable five-horse race.

use std::path::Path;

use derby_types::Participant;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed correctly but is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DerbyConfig {
    /// Race loop timing and bounds.
    #[serde(default)]
    pub race: RaceConfig,

    /// Movement model parameters.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Venue and weather selection.
    #[serde(default)]
    pub track: TrackConfig,

    /// Field of runners.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DerbyConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `DERBY_SEED` in the environment overrides `race.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.race.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.race.validate()?;
        self.movement.validate()?;
        self.track.validate()
    }
}

/// How the host loop measures time between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// Each tick advances the race clock by `tick_secs`.
    #[default]
    Simulated,
    /// Each tick advances the race clock by the real time since the last tick.
    WallClock,
}

/// Race loop timing and bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RaceConfig {
    /// Seed for the movement and weather RNGs. `None` draws one at startup.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Race time added per tick in simulated mode, in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,

    /// Real-time pause between ticks in milliseconds (0 = no pause).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How elapsed time is measured.
    #[serde(default)]
    pub time_mode: TimeMode,

    /// Tick budget after which unfinished horses are declared DNF.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Wall-clock budget in seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl RaceConfig {
    /// Override the seed from `DERBY_SEED` when set.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DERBY_SEED") {
            let seed = val.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                reason: format!("DERBY_SEED must be an unsigned integer: {e}"),
            })?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_secs.is_finite() || self.tick_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("race.tick_secs must be positive, got {}", self.tick_secs),
            });
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::Invalid {
                reason: "race.max_ticks must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_secs: default_tick_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            time_mode: TimeMode::default(),
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
        }
    }
}

/// Movement model parameters.
///
/// A uniform draw `r` below `stumble_below` is a stumble (no movement); a
/// draw below `penalized_below` moves at weather-scaled speed; anything
/// else moves at full speed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementConfig {
    /// Fraction of base speed covered per normal step.
    #[serde(default = "default_step_scale")]
    pub step_scale: f64,

    /// Upper bound of the stumble band.
    #[serde(default = "default_stumble_below")]
    pub stumble_below: f64,

    /// Upper bound of the weather-penalized band.
    #[serde(default = "default_penalized_below")]
    pub penalized_below: f64,

    /// Speed floor applied to every participant at race setup.
    #[serde(default)]
    pub min_base_speed: Option<f64>,
}

impl MovementConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.step_scale.is_finite() || self.step_scale <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("movement.step_scale must be positive, got {}", self.step_scale),
            });
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.stumble_below)
            || !in_unit(self.penalized_below)
            || self.stumble_below > self.penalized_below
        {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "movement bands must satisfy 0 <= stumble_below ({}) <= penalized_below ({}) <= 1",
                    self.stumble_below, self.penalized_below
                ),
            });
        }
        if let Some(floor) = self.min_base_speed {
            if !floor.is_finite() || floor <= 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("movement.min_base_speed must be positive, got {floor}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_scale: default_step_scale(),
            stumble_below: default_stumble_below(),
            penalized_below: default_penalized_below(),
            min_base_speed: None,
        }
    }
}

/// Venue and weather selection. Unset fields are chosen at random.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackConfig {
    /// Venue name from the catalogue.
    #[serde(default)]
    pub venue: Option<String>,

    /// Race distance. Selects a catalogue course when `venue` is set,
    /// otherwise defines a custom track of this length.
    #[serde(default)]
    pub length: Option<f64>,

    /// Fixed weather condition name.
    #[serde(default)]
    pub weather: Option<String>,
}

impl TrackConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.length {
            Some(length) if !length.is_finite() || length <= 0.0 => Err(ConfigError::Invalid {
                reason: format!("track.length must be positive, got {length}"),
            }),
            _ => Ok(()),
        }
    }
}

/// Field of runners.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterConfig {
    /// Number of horses to generate when no entrants are listed.
    #[serde(default = "default_field_size")]
    pub field_size: u32,

    /// Explicit entrants, in evaluation order.
    #[serde(default)]
    pub entrants: Vec<Participant>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            field_size: default_field_size(),
            entrants: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_tick_secs() -> f64 {
    0.05
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_max_ticks() -> u64 {
    100_000
}

const fn default_step_scale() -> f64 {
    0.1
}

const fn default_stumble_below() -> f64 {
    0.05
}

const fn default_penalized_below() -> f64 {
    0.2
}

const fn default_field_size() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}
