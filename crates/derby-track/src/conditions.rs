//! Track conditions and race cards.
//!
//! [`TrackConditions`] pairs a venue with the going and reduces both to the
//! [`TrackContext`] the engine consumes. Race cards carry the date and can
//! be postponed.

use chrono::{Days, NaiveDate};
use derby_types::{RaceCard, RaceId, TrackContext, Venue, Weather};
use tracing::info;

use crate::error::TrackError;

/// Venue and weather for one race.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackConditions {
    /// Venue and distance.
    pub venue: Venue,
    /// Going condition.
    pub weather: Weather,
}

impl TrackConditions {
    /// Create conditions, validating the venue distance.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidLength`] if the distance is not a finite
    /// positive number.
    pub fn new(venue: Venue, weather: Weather) -> Result<Self, TrackError> {
        if !venue.distance.is_finite() || venue.distance <= 0.0 {
            return Err(TrackError::InvalidLength {
                length: venue.distance,
            });
        }
        Ok(Self { venue, weather })
    }

    /// The context consumed by the progression engine.
    pub const fn context(&self) -> TrackContext {
        TrackContext::new(self.venue.distance, self.weather.multiplier())
    }

    /// Build the race card for a race on the given date.
    pub fn race_card(&self, date: NaiveDate, field_size: u32) -> RaceCard {
        RaceCard {
            race_id: RaceId::new(),
            date,
            venue: self.venue.clone(),
            weather: self.weather,
            field_size,
        }
    }
}

/// Move a race card's date `days` days later.
///
/// # Errors
///
/// Returns [`TrackError::DateOutOfRange`] if the new date overflows the
/// calendar.
pub fn postpone(card: &mut RaceCard, days: u32) -> Result<NaiveDate, TrackError> {
    let new_date = card
        .date
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or(TrackError::DateOutOfRange { days })?;
    info!(race_id = %card.race_id, from = %card.date, to = %new_date, "Race postponed");
    card.date = new_date;
    Ok(new_date)
}
