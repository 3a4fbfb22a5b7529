//! Race participants and the roster that lists them.
//!
//! The engine only reads `horse_id` and `base_speed`. The descriptive
//! attributes travel with the participant so analytics and presentation
//! collaborators can look them up by id after the race.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::HorseId;

/// Descriptive attributes of a horse, opaque to the progression engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HorseAttributes {
    /// Age in years.
    pub age: Option<u32>,
    /// Breed or origin type (e.g. "NZ", "AUS", "GB").
    pub horse_type: Option<String>,
    /// Carried weight in pounds.
    pub actual_weight: Option<u32>,
    /// Identifier of the jockey riding the horse.
    pub jockey_id: Option<u64>,
}

/// A single entrant in a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Identifier, unique within a race.
    pub horse_id: HorseId,
    /// Display name.
    pub name: String,
    /// Base speed in track units per second of race time.
    pub base_speed: f64,
    /// Descriptive attributes.
    #[serde(default)]
    pub attributes: HorseAttributes,
}

impl Participant {
    /// Create a participant with no descriptive attributes.
    pub fn new(horse_id: HorseId, name: impl Into<String>, base_speed: f64) -> Self {
        Self {
            horse_id,
            name: name.into(),
            base_speed,
            attributes: HorseAttributes::default(),
        }
    }

    /// Attach descriptive attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: HorseAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Ordered list of participants for one race.
///
/// Order is significant: the engine evaluates participants in roster order
/// within a tick, which decides live ranks when two horses cross the finish
/// on the same tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Roster {
    /// Participants in evaluation order.
    pub participants: Vec<Participant>,
}

impl Roster {
    /// Create a roster from an ordered list of participants.
    pub const fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster has no participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Iterate participants in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Look up a participant by id.
    pub fn get(&self, horse_id: HorseId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.horse_id == horse_id)
    }

    /// Return the first id that appears more than once, if any.
    pub fn first_duplicate(&self) -> Option<HorseId> {
        let mut seen = std::collections::BTreeSet::new();
        self.participants
            .iter()
            .map(|p| p.horse_id)
            .find(|id| !seen.insert(*id))
    }

    /// Age of the given horse, or `None` if unknown.
    pub fn age_of(&self, horse_id: HorseId) -> Option<u32> {
        self.get(horse_id).and_then(|p| p.attributes.age)
    }

    /// Type of the given horse, or `None` if unknown.
    pub fn type_of(&self, horse_id: HorseId) -> Option<&str> {
        self.get(horse_id)
            .and_then(|p| p.attributes.horse_type.as_deref())
    }

    /// Carried weight of the given horse, or `None` if unknown.
    pub fn weight_of(&self, horse_id: HorseId) -> Option<u32> {
        self.get(horse_id).and_then(|p| p.attributes.actual_weight)
    }

    /// Jockey of the given horse, or `None` if unknown.
    pub fn jockey_of(&self, horse_id: HorseId) -> Option<u64> {
        self.get(horse_id).and_then(|p| p.attributes.jockey_id)
    }
}

impl FromIterator<Participant> for Roster {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
