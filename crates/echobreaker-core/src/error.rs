//! Error types for scoring, sessions and configuration.
//!
//! An empty session and an unranked player are ordinary states, not errors:
//! they surface as an empty [`SessionSummary`](crate::statistics::SessionSummary)
//! and [`RankLookup::NotRanked`](crate::ranking::RankLookup::NotRanked).

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised at the scorer boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// A percentage was non-finite, unparsable or outside `[0, 100]`.
    #[error("invalid {field} percentage: {value}")]
    InvalidInput { field: &'static str, value: String },
}

impl ScoringError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        ScoringError::InvalidInput {
            field,
            value: value.to_string(),
        }
    }
}

/// Errors raised while filling a daily session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The session was opened with fewer questions than the batch size.
    #[error("need {needed} questions to open a session, have {available}")]
    NotEnoughQuestions { needed: usize, available: usize },

    /// Every slot is filled or the day is over.
    #[error("session for {date} is closed")]
    SessionClosed { date: NaiveDate },

    /// The guess belongs to a later game day than the session.
    #[error("session for {session_date} rolled over, guess is for {guess_date}")]
    DayRolledOver {
        session_date: NaiveDate,
        guess_date: NaiveDate,
    },

    /// The guess belongs to an earlier game day than the session.
    #[error("session is for {session_date}, guess is for {guess_date}")]
    WrongDay {
        session_date: NaiveDate,
        guess_date: NaiveDate,
    },

    /// The guess was submitted by a different player.
    #[error("guess from {got} submitted to session of {expected}")]
    WrongUser { expected: String, got: String },

    /// The question is not part of today's batch.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// The player already answered this question today.
    #[error("question {0} already answered")]
    DuplicateGuess(String),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors in game configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be at least 1")]
    ZeroSize(&'static str),

    #[error("day offset of {0} minutes is outside +/-24h")]
    OffsetOutOfRange(i32),
}
