//! Roster provider: assembles the field of runners for a race.
//!
//! Entrants listed in `derby-config.yaml` are used as given. Otherwise a
//! field of `roster.field_size` horses is generated with unique names drawn
//! from a built-in pool, sequential ids, random base speeds, and random
//! descriptive attributes.

use std::ops::RangeInclusive;

use derby_core::config::RosterConfig;
use derby_types::{HorseAttributes, HorseId, Participant, Roster};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::error::AppError;

// -----------------------------------------------------------------------
// Pools and ranges
// -----------------------------------------------------------------------

/// Built-in pool of horse names. Generated fields draw from it without
/// replacement so names are unique within a race.
const NAME_POOL: &[&str] = &[
    "Golden Sixty", "Romantic Warrior", "Beauty Joy", "California Spangle",
    "Lucky Sweynesse", "Sky Darci", "Voyage Bubble", "Ka Ying Rising",
    "Helios Express", "Beauty Eternal", "Hot King Prawn", "Waikuku",
    "Wellington", "Senor Toba", "Healthy Happy", "Red Lion",
    "Stronger", "Money Catcher", "Lucky With You", "Packing Angel",
    "Sword Point", "Mugen", "Russian Emperor", "Glorious Dragon",
];

/// Horse types recorded on race cards.
const HORSE_TYPES: &[&str] = &["Gelding", "Horse", "Colt", "Mare", "Filly"];

/// Base speed range for generated horses, in track units per second.
const SPEED_RANGE: RangeInclusive<f64> = 8.0..=14.0;

/// Age range for generated horses, in years.
const AGE_RANGE: RangeInclusive<u32> = 2..=9;

/// Carried weight range for generated horses, in pounds.
const WEIGHT_RANGE: RangeInclusive<u32> = 113..=133;

/// Jockey id range for generated horses.
const JOCKEY_RANGE: RangeInclusive<u64> = 1..=40;

// -----------------------------------------------------------------------
// Building
// -----------------------------------------------------------------------

/// Build the race roster from configuration.
///
/// # Errors
///
/// Returns [`AppError::Roster`] if configured entrants repeat a horse id
/// or the requested field is larger than the name pool.
pub fn build_roster(config: &RosterConfig, rng: &mut impl Rng) -> Result<Roster, AppError> {
    if !config.entrants.is_empty() {
        let roster = Roster::new(config.entrants.clone());
        if let Some(duplicate) = roster.first_duplicate() {
            return Err(AppError::Roster {
                message: format!("horse id {duplicate} is listed more than once"),
            });
        }
        info!(field_size = roster.len(), "Using configured entrants");
        return Ok(roster);
    }

    let roster = generate_field(config.field_size, rng)?;
    info!(field_size = roster.len(), "Generated field");
    Ok(roster)
}

/// Generate `field_size` horses with unique names and ids `1..=field_size`.
///
/// # Errors
///
/// Returns [`AppError::Roster`] if `field_size` exceeds the name pool.
pub fn generate_field(field_size: u32, rng: &mut impl Rng) -> Result<Roster, AppError> {
    let wanted = usize::try_from(field_size).unwrap_or(usize::MAX);
    if wanted > NAME_POOL.len() {
        return Err(AppError::Roster {
            message: format!(
                "field size {field_size} exceeds the {} available names",
                NAME_POOL.len()
            ),
        });
    }

    let names: Vec<&str> = NAME_POOL.choose_multiple(rng, wanted).copied().collect();
    let participants = names
        .into_iter()
        .zip(1_u64..)
        .map(|(name, id)| {
            let attributes = HorseAttributes {
                age: Some(rng.random_range(AGE_RANGE)),
                horse_type: HORSE_TYPES.choose(rng).map(|t| (*t).to_owned()),
                actual_weight: Some(rng.random_range(WEIGHT_RANGE)),
                jockey_id: Some(rng.random_range(JOCKEY_RANGE)),
            };
            Participant::new(HorseId(id), name, rng.random_range(SPEED_RANGE))
                .with_attributes(attributes)
        })
        .collect();
    Ok(participants)
}
