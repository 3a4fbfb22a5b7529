//! Venue catalogue.
//!
//! The catalogue lists the course configurations of the two Hong Kong
//! racecourses used by the historical race data: Sha Tin runs 1000 m to
//! 2400 m, Happy Valley 1000 m to 2200 m.

use derby_types::Venue;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::TrackError;

/// Course distances offered at Sha Tin, in metres.
const SHA_TIN_DISTANCES: [f64; 6] = [1000.0, 1200.0, 1400.0, 1600.0, 2000.0, 2400.0];

/// Course distances offered at Happy Valley, in metres.
const HAPPY_VALLEY_DISTANCES: [f64; 5] = [1000.0, 1200.0, 1650.0, 1800.0, 2200.0];

/// A fixed list of venues a race can be staged at.
#[derive(Debug, Clone)]
pub struct VenueCatalog {
    venues: Vec<Venue>,
}

impl VenueCatalog {
    /// The standard catalogue: every Sha Tin and Happy Valley distance.
    pub fn standard() -> Self {
        let sha_tin = SHA_TIN_DISTANCES.iter().map(|&distance| Venue {
            name: "Sha Tin".to_owned(),
            distance,
        });
        let happy_valley = HAPPY_VALLEY_DISTANCES.iter().map(|&distance| Venue {
            name: "Happy Valley".to_owned(),
            distance,
        });
        Self {
            venues: sha_tin.chain(happy_valley).collect(),
        }
    }

    /// All venues in the catalogue.
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Find a venue by name (case-insensitive) and, optionally, distance.
    ///
    /// Without a distance the shortest course at that venue is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::UnknownVenue`] if no venue matches.
    pub fn find(&self, name: &str, distance: Option<f64>) -> Result<Venue, TrackError> {
        let wanted = name.trim().to_lowercase();
        let mut matching = self
            .venues
            .iter()
            .filter(|v| v.name.to_lowercase() == wanted);
        let found = match distance {
            Some(d) => matching.find(|v| (v.distance - d).abs() < f64::EPSILON),
            None => matching.min_by(|a, b| a.distance.total_cmp(&b.distance)),
        };
        found
            .cloned()
            .ok_or_else(|| TrackError::UnknownVenue(name.to_owned()))
    }

    /// Pick a venue uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::UnknownVenue`] if the catalogue is empty.
    pub fn pick(&self, rng: &mut impl Rng) -> Result<Venue, TrackError> {
        self.venues
            .choose(rng)
            .cloned()
            .ok_or_else(|| TrackError::UnknownVenue("<empty catalogue>".to_owned()))
    }
}
