//! Race card: the identity and scheduling details of a race.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::RaceId;
use crate::track::{Venue, Weather};

/// Identity and scheduling details of a single race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RaceCard {
    /// Unique race identifier.
    pub race_id: RaceId,
    /// Scheduled race date.
    pub date: NaiveDate,
    /// Venue and distance.
    pub venue: Venue,
    /// Going condition on race day.
    pub weather: Weather,
    /// Number of declared runners.
    pub field_size: u32,
}
