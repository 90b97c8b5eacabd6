//! In-process game store.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use echobreaker_core::model::{
    DailyScore, HistoricalAverage, LeaderboardEntry, Question, QuestionScore, ScoredAnswer,
};
use echobreaker_core::statistics::SessionSummary;
use echobreaker_core::traits::GameStore;

use crate::error::StoreError;
use crate::state::GameState;

/// A [`GameStore`] backed by a lock-guarded [`GameState`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<GameState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Issue questions for a game day.
    pub fn with_questions(mut self, date: NaiveDate, questions: Vec<Question>) -> Self {
        self.state.get_mut().add_questions(date, questions);
        self
    }

    /// Seed a leaderboard row.
    pub fn with_player(mut self, entry: LeaderboardEntry) -> Result<Self, StoreError> {
        self.state.get_mut().add_player(entry)?;
        Ok(self)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn daily_questions(&self, date: NaiveDate) -> anyhow::Result<Vec<Question>> {
        Ok(self.state.read().await.questions_for(date))
    }

    async fn record_round(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        date: NaiveDate,
        summary: &SessionSummary,
        answers: &[ScoredAnswer],
    ) -> anyhow::Result<()> {
        self.state
            .write()
            .await
            .record(user_id, display_name, date, summary, answers, Utc::now())?;
        tracing::debug!(user = user_id, %date, "round stored");
        Ok(())
    }

    async fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>> {
        Ok(self.state.read().await.players.clone())
    }

    async fn daily_scores(&self, date: NaiveDate) -> anyhow::Result<Vec<DailyScore>> {
        Ok(self.state.read().await.daily_scores(date))
    }

    async fn question_scores(&self, date: NaiveDate) -> anyhow::Result<Vec<QuestionScore>> {
        Ok(self.state.read().await.question_scores(date))
    }

    async fn historical_average(&self, user_id: &str) -> anyhow::Result<Option<HistoricalAverage>> {
        Ok(self.state.read().await.historical_average(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use echobreaker_core::model::ScoredGuess;
    use echobreaker_core::statistics::aggregate;
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn summary(total: f64) -> SessionSummary {
        aggregate(&[ScoredGuess {
            dem_score: total,
            rep_score: total,
            total_score: total,
        }])
    }

    #[tokio::test]
    async fn questions_are_per_day() {
        let q = Question {
            id: "q1".into(),
            image_uri: "img/q1.png".into(),
            topic: None,
            ground_truth: None,
        };
        let store = MemoryStore::new().with_questions(day(), vec![q.clone()]);
        assert_eq!(store.daily_questions(day()).await.unwrap(), vec![q]);
        assert!(store
            .daily_questions(day().succ_opt().unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn duplicate_round_surfaces_store_error() {
        let store = MemoryStore::new();
        store.record_round("u1", None, day(), &summary(50.0), &[]).await.unwrap();
        let err = store
            .record_round("u1", None, day(), &summary(50.0), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyRecorded { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_players_all_recorded() {
        let store = Arc::new(
            MemoryStore::new()
                .with_player(LeaderboardEntry {
                    user_id: "seed".into(),
                    display_name: Some("Seed".into()),
                    score: 400.0,
                    games_played: 5,
                    created_at: Utc.timestamp_opt(0, 0).unwrap(),
                })
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .record_round(&format!("u{i}"), None, day(), &summary(i as f64 * 10.0), &[])
                        .await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(store.leaderboard().await.unwrap().len(), 9);
        assert_eq!(store.daily_scores(day()).await.unwrap().len(), 8);
        assert_eq!(store.snapshot().await.player("u7").unwrap().score, 70.0);
    }
}
