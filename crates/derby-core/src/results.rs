//! Results derivation: turns a completed race's timing sheet into a ranked
//! leaderboard and normalized, replayable checkpoint positions.
//!
//! Ranking is by exact overall time, ascending. The sort is stable, so
//! horses with identical times keep the order in which the sheet lists them.
//! This ranking is separate from the engine's live rank (crossing order
//! within tick resolution). Both are carried on [`RankedResult`] because
//! they can disagree when horses cross on the same tick.
//!
//! Positions are normalized per checkpoint against the fastest usable time:
//!
//! ```text
//! pos_k(h) = length * fraction_k * (min_time_k / time_k(h))
//! ```
//!
//! so the fastest horse sits exactly on the checkpoint and slower horses
//! trail proportionally. A missing, zero, negative, or non-finite time
//! leaves that one position empty and is reported as a [`TimingIssue`];
//! other horses and checkpoints are unaffected.

use std::cmp::Ordering;

use derby_types::{
    Checkpoint, CheckpointPositions, FinalizedTimingRecord, HorseId, RaceSummary, RankedResult,
    ReplayStage, TimingSheet, TrackContext,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Errors that prevent derivation as a whole.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    /// Track length is not a finite positive number.
    #[error("invalid track length {length}: must be a finite positive number")]
    InvalidTrack {
        /// The rejected length.
        length: f64,
    },
}

/// A per-horse, per-checkpoint problem found while normalizing positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimingIssue {
    /// No time was recorded at the checkpoint.
    #[error("horse {horse_id} has no time at {checkpoint:?}")]
    MissingTime {
        /// The horse.
        horse_id: HorseId,
        /// The checkpoint.
        checkpoint: Checkpoint,
    },

    /// The recorded time cannot be used as a divisor.
    #[error("horse {horse_id} has unusable time {time} at {checkpoint:?}")]
    UnusableTime {
        /// The horse.
        horse_id: HorseId,
        /// The checkpoint.
        checkpoint: Checkpoint,
        /// The rejected time.
        time: f64,
    },
}

/// Derived leaderboard for one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResults {
    track: TrackContext,
    ranking: Vec<RankedResult>,
    issues: Vec<TimingIssue>,
}

impl RaceResults {
    /// Rows in rank order.
    pub fn ranking(&self) -> &[RankedResult] {
        &self.ranking
    }

    /// Problems found while normalizing positions.
    pub fn issues(&self) -> &[TimingIssue] {
        &self.issues
    }

    /// Whether no horse was ranked.
    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    /// The rank-1 horse by exact time.
    pub fn winner(&self) -> Option<HorseId> {
        self.ranking.first().map(|r| r.horse_id)
    }

    /// The row for one horse.
    pub fn get(&self, horse_id: HorseId) -> Option<&RankedResult> {
        self.ranking.iter().find(|r| r.horse_id == horse_id)
    }

    /// Rank of one horse by exact time, `None` if it is not in the results.
    pub fn position_of(&self, horse_id: HorseId) -> Option<u32> {
        self.get(horse_id).map(|r| r.rank)
    }

    /// Per-checkpoint snapshots of every horse's normalized position, in
    /// leaderboard order. Empty results produce no stages.
    pub fn replay(&self) -> Vec<ReplayStage> {
        if self.ranking.is_empty() {
            return Vec::new();
        }
        Checkpoint::ALL
            .iter()
            .map(|&checkpoint| ReplayStage {
                checkpoint,
                checkpoint_distance: self.track.checkpoint_distance(checkpoint),
                positions: self
                    .ranking
                    .iter()
                    .map(|r| (r.horse_id, r.checkpoint_positions.at(checkpoint)))
                    .collect(),
            })
            .collect()
    }

    /// Headline figures, `None` for an empty race.
    pub fn summary(&self) -> Option<RaceSummary> {
        let first = self.ranking.first()?;
        let last = self.ranking.last()?;
        Some(RaceSummary {
            field_size: u32::try_from(self.ranking.len()).ok()?,
            winner: first.horse_id,
            winning_time: first.finish_time,
            last_time: last.finish_time,
        })
    }
}

/// Whether a time can be used for normalization.
fn is_usable(time: f64) -> bool {
    time.is_finite() && time > 0.0
}

fn by_overall_time(a: &FinalizedTimingRecord, b: &FinalizedTimingRecord) -> Ordering {
    a.overall_time.total_cmp(&b.overall_time)
}

/// Horse ids ordered by exact overall time, ties in sheet order.
pub fn rank_by_time(sheet: &TimingSheet) -> Vec<HorseId> {
    let mut entries: Vec<_> = sheet.entries().iter().collect();
    entries.sort_by(|a, b| by_overall_time(&a.record, &b.record));
    entries.into_iter().map(|e| e.horse_id).collect()
}

/// Rank of `horse_id` by exact overall time, or `None` if it is not on the
/// sheet.
pub fn position_of(sheet: &TimingSheet, horse_id: HorseId) -> Option<u32> {
    rank_by_time(sheet)
        .iter()
        .zip(1_u32..)
        .find_map(|(id, rank)| (*id == horse_id).then_some(rank))
}

/// Rank every horse on the sheet and normalize its checkpoint positions.
///
/// # Errors
///
/// Returns [`DerivationError::InvalidTrack`] if the track length is not a
/// finite positive number. Bad individual times are not errors; they are
/// collected in [`RaceResults::issues`].
pub fn derive_results(
    sheet: &TimingSheet,
    track: &TrackContext,
) -> Result<RaceResults, DerivationError> {
    if !track.has_valid_length() {
        return Err(DerivationError::InvalidTrack {
            length: track.length,
        });
    }

    let fastest = Checkpoint::ALL.map(|checkpoint| {
        sheet
            .entries()
            .iter()
            .filter_map(|e| e.record.time_at(checkpoint))
            .filter(|t| is_usable(*t))
            .min_by(f64::total_cmp)
    });

    let mut entries: Vec<_> = sheet.entries().iter().collect();
    entries.sort_by(|a, b| by_overall_time(&a.record, &b.record));

    let mut issues = Vec::new();
    let ranking = entries
        .into_iter()
        .zip(1_u32..)
        .map(|(entry, rank)| {
            let mut positions = CheckpointPositions::default();
            for (&checkpoint, min_time) in Checkpoint::ALL.iter().zip(fastest) {
                let position = match entry.record.time_at(checkpoint) {
                    None => {
                        issues.push(TimingIssue::MissingTime {
                            horse_id: entry.horse_id,
                            checkpoint,
                        });
                        None
                    }
                    Some(time) if !is_usable(time) => {
                        issues.push(TimingIssue::UnusableTime {
                            horse_id: entry.horse_id,
                            checkpoint,
                            time,
                        });
                        None
                    }
                    Some(time) => min_time
                        .map(|min| track.checkpoint_distance(checkpoint) * (min / time)),
                };
                positions.set(checkpoint, position);
            }
            RankedResult {
                horse_id: entry.horse_id,
                rank,
                live_rank: entry.record.live_rank,
                finish_time: entry.record.overall_time,
                checkpoint_positions: positions,
            }
        })
        .collect::<Vec<_>>();

    for issue in &issues {
        warn!(%issue, "Checkpoint position could not be derived");
    }
    debug!(
        ranked = ranking.len(),
        issues = issues.len(),
        "Results derived"
    );

    Ok(RaceResults {
        track: *track,
        ranking,
        issues,
    })
}
