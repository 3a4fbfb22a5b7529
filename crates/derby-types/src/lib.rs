//! Shared type definitions for the Derby race simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the progression engine, results derivation, and the presentation
//! and wagering collaborators. Types flow downstream to `TypeScript` via
//! `ts-rs` for replay and leaderboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Race and horse identifiers
//! - [`participant`] -- Participants, descriptive attributes, and the roster
//! - [`race`] -- Race card (identity, date, venue, weather)
//! - [`timing`] -- Finalized timing records, timing sheet, ranked results
//! - [`track`] -- Track context, checkpoints, weather, venues

pub mod ids;
pub mod participant;
pub mod race;
pub mod timing;
pub mod track;

pub use ids::{HorseId, RaceId};
pub use participant::{HorseAttributes, Participant, Roster};
pub use race::RaceCard;
pub use timing::{
    CheckpointPositions, FinalizedTimingRecord, RaceSummary, RankedResult, ReplayStage,
    TimingEntry, TimingSheet,
};
pub use track::{Checkpoint, TrackContext, Venue, Weather};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for presentation clients.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::RaceId::export_all();
        let _ = crate::ids::HorseId::export_all();

        let _ = crate::participant::HorseAttributes::export_all();
        let _ = crate::participant::Participant::export_all();
        let _ = crate::participant::Roster::export_all();

        let _ = crate::race::RaceCard::export_all();

        let _ = crate::track::TrackContext::export_all();
        let _ = crate::track::Checkpoint::export_all();
        let _ = crate::track::Weather::export_all();
        let _ = crate::track::Venue::export_all();

        let _ = crate::timing::FinalizedTimingRecord::export_all();
        let _ = crate::timing::TimingEntry::export_all();
        let _ = crate::timing::TimingSheet::export_all();
        let _ = crate::timing::CheckpointPositions::export_all();
        let _ = crate::timing::RankedResult::export_all();
        let _ = crate::timing::ReplayStage::export_all();
        let _ = crate::timing::RaceSummary::export_all();
    }
}
