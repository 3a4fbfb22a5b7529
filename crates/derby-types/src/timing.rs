//! Timing records handed from the progression engine to results derivation,
//! and the derived, display-ready result types.
//!
//! All times are elapsed race time in seconds since the start instant.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::HorseId;
use crate::track::Checkpoint;

/// Immutable per-horse timing snapshot produced when a race completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FinalizedTimingRecord {
    /// Elapsed time at the finish line.
    pub overall_time: f64,
    /// Elapsed time at the end of the first leg.
    pub leg1: Option<f64>,
    /// Elapsed time at the end of the second leg.
    pub leg2: Option<f64>,
    /// Elapsed time at the end of the third leg.
    pub leg3: Option<f64>,
    /// Rank assigned live by the engine in crossing order.
    #[serde(default)]
    pub live_rank: Option<u32>,
}

impl FinalizedTimingRecord {
    /// Create a record with all three leg times set and no live rank.
    pub const fn new(overall_time: f64, leg1: f64, leg2: f64, leg3: f64) -> Self {
        Self {
            overall_time,
            leg1: Some(leg1),
            leg2: Some(leg2),
            leg3: Some(leg3),
            live_rank: None,
        }
    }

    /// Attach the engine's live rank.
    #[must_use]
    pub const fn with_live_rank(mut self, rank: u32) -> Self {
        self.live_rank = Some(rank);
        self
    }

    /// Recorded time at the given checkpoint.
    pub const fn time_at(&self, checkpoint: Checkpoint) -> Option<f64> {
        match checkpoint {
            Checkpoint::Leg1 => self.leg1,
            Checkpoint::Leg2 => self.leg2,
            Checkpoint::Leg3 => self.leg3,
            Checkpoint::Finish => Some(self.overall_time),
        }
    }
}

/// One row of a [`TimingSheet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimingEntry {
    /// The horse these timings belong to.
    pub horse_id: HorseId,
    /// The timings.
    pub record: FinalizedTimingRecord,
}

/// Timing records keyed by horse id, in encounter (insertion) order.
///
/// Insertion order is preserved because it breaks exact-time ties when
/// ranking. Re-inserting an existing id replaces its record in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimingSheet {
    /// Entries in encounter order.
    entries: Vec<TimingEntry>,
}

impl TimingSheet {
    /// Create an empty sheet.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace the record for a horse. Returns the previous record.
    pub fn insert(
        &mut self,
        horse_id: HorseId,
        record: FinalizedTimingRecord,
    ) -> Option<FinalizedTimingRecord> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.horse_id == horse_id) {
            let previous = entry.record;
            entry.record = record;
            return Some(previous);
        }
        self.entries.push(TimingEntry { horse_id, record });
        None
    }

    /// Look up the record for a horse.
    pub fn get(&self, horse_id: HorseId) -> Option<&FinalizedTimingRecord> {
        self.entries
            .iter()
            .find(|e| e.horse_id == horse_id)
            .map(|e| &e.record)
    }

    /// Whether the sheet holds a record for the horse.
    pub fn contains(&self, horse_id: HorseId) -> bool {
        self.get(horse_id).is_some()
    }

    /// Entries in encounter order.
    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sheet is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(HorseId, FinalizedTimingRecord)> for TimingSheet {
    fn from_iter<I: IntoIterator<Item = (HorseId, FinalizedTimingRecord)>>(iter: I) -> Self {
        let mut sheet = Self::new();
        for (horse_id, record) in iter {
            sheet.insert(horse_id, record);
        }
        sheet
    }
}

/// Normalized positions of a horse at each checkpoint.
///
/// A `None` slot means the position could not be derived (missing or zero
/// time); the matching derivation error is reported alongside the results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CheckpointPositions {
    /// Position at the end of the first leg.
    pub leg1: Option<f64>,
    /// Position at the end of the second leg.
    pub leg2: Option<f64>,
    /// Position at the end of the third leg.
    pub leg3: Option<f64>,
    /// Position at the finish.
    pub finish: Option<f64>,
}

impl CheckpointPositions {
    /// Position at the given checkpoint.
    pub const fn at(&self, checkpoint: Checkpoint) -> Option<f64> {
        match checkpoint {
            Checkpoint::Leg1 => self.leg1,
            Checkpoint::Leg2 => self.leg2,
            Checkpoint::Leg3 => self.leg3,
            Checkpoint::Finish => self.finish,
        }
    }

    /// Set the position at the given checkpoint.
    pub const fn set(&mut self, checkpoint: Checkpoint, position: Option<f64>) {
        match checkpoint {
            Checkpoint::Leg1 => self.leg1 = position,
            Checkpoint::Leg2 => self.leg2 = position,
            Checkpoint::Leg3 => self.leg3 = position,
            Checkpoint::Finish => self.finish = position,
        }
    }

    /// Positions in checkpoint order.
    pub const fn to_array(&self) -> [Option<f64>; 4] {
        [self.leg1, self.leg2, self.leg3, self.finish]
    }
}

/// One row of the derived leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RankedResult {
    /// The horse.
    pub horse_id: HorseId,
    /// Rank by exact recorded finish time (1 = fastest).
    pub rank: u32,
    /// Rank assigned live by the engine in crossing order, when known.
    pub live_rank: Option<u32>,
    /// Overall finish time.
    pub finish_time: f64,
    /// Normalized positions at the four checkpoints.
    pub checkpoint_positions: CheckpointPositions,
}

/// Snapshot of every horse's normalized position at one checkpoint, for
/// stage-by-stage replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReplayStage {
    /// The checkpoint this stage shows.
    pub checkpoint: Checkpoint,
    /// Distance of the checkpoint from the start.
    pub checkpoint_distance: f64,
    /// `(horse, position)` pairs in leaderboard order.
    pub positions: Vec<(HorseId, Option<f64>)>,
}

/// Headline figures of a completed race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RaceSummary {
    /// Number of ranked finishers.
    pub field_size: u32,
    /// The winning horse.
    pub winner: HorseId,
    /// Finish time of the winner.
    pub winning_time: f64,
    /// Finish time of the last finisher.
    pub last_time: f64,
}
