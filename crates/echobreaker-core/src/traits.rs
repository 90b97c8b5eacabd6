//! The data-access seam the results engine is injected with.
//!
//! Implemented by the `echobreaker-store` crate.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{
    DailyScore, HistoricalAverage, LeaderboardEntry, Question, QuestionScore, ScoredAnswer,
};
use crate::statistics::SessionSummary;

/// Persistent game state: issued questions, completed rounds, standings.
///
/// Reads may be eventually consistent snapshots. Implementations enforce at
/// most one recorded round per (user, date).
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Questions issued for a game day, in display order.
    async fn daily_questions(&self, date: NaiveDate) -> anyhow::Result<Vec<Question>>;

    /// Record a completed session, its per-question scores, and update the
    /// player's standing.
    async fn record_round(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        date: NaiveDate,
        summary: &SessionSummary,
        answers: &[ScoredAnswer],
    ) -> anyhow::Result<()>;

    /// Current leaderboard rows, in no particular order.
    async fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>>;

    /// Every recorded score for a game day.
    async fn daily_scores(&self, date: NaiveDate) -> anyhow::Result<Vec<DailyScore>>;

    /// Every recorded per-question score for a game day.
    async fn question_scores(&self, date: NaiveDate) -> anyhow::Result<Vec<QuestionScore>>;

    /// The player's long-run averages, `None` before their first round.
    async fn historical_average(&self, user_id: &str)
        -> anyhow::Result<Option<HistoricalAverage>>;
}
