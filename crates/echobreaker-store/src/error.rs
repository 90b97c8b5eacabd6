//! Store error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors a store raises on its own account. I/O and serialization
/// failures travel as `anyhow` context instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The player already has a recorded round for this game day.
    #[error("{user_id} already played on {date}")]
    AlreadyRecorded { user_id: String, date: NaiveDate },

    /// A leaderboard row for this player was seeded twice.
    #[error("duplicate player: {0}")]
    DuplicatePlayer(String),
}
