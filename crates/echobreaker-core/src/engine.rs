//! Results engine.
//!
//! Opens daily sessions from the injected store and, once a session is
//! closed, records it and assembles the results report: session summary,
//! leaderboard placement, daily ranks and the comparison with the player's
//! history.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::model::LeaderboardEntry;
use crate::ranking::{self, RankLookup};
use crate::report::ResultsReport;
use crate::session::DailySession;
use crate::traits::GameStore;

/// One row of the bounded leaderboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub position: u32,
    pub entry: LeaderboardEntry,
}

/// The top of the leaderboard plus one player's placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    pub top: Vec<StandingRow>,
    pub total: usize,
    pub player: Option<RankLookup>,
}

pub struct ResultsEngine {
    store: Arc<dyn GameStore>,
    config: GameConfig,
}

impl ResultsEngine {
    pub fn new(store: Arc<dyn GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Open a session over the questions issued for `date`.
    pub async fn open_session(&self, user_id: &str, date: NaiveDate) -> Result<DailySession> {
        let questions = self
            .store
            .daily_questions(date)
            .await
            .with_context(|| format!("failed to load questions for {date}"))?;
        Ok(DailySession::open(user_id, date, questions, &self.config)?)
    }

    /// Record a closed session and build its results report.
    ///
    /// The historical average is read before recording, so the delta
    /// compares today against previous days only.
    pub async fn finish(
        &self,
        session: &DailySession,
        display_name: Option<&str>,
    ) -> Result<ResultsReport> {
        anyhow::ensure!(
            !session.is_open(),
            "session for {} still has {} unanswered question(s)",
            session.date(),
            session.remaining()
        );

        let user_id = session.user_id();
        let date = session.date();
        let summary = session.summary();

        let historical_average = self.store.historical_average(user_id).await?;

        self.store
            .record_round(user_id, display_name, date, &summary, session.answers())
            .await
            .with_context(|| format!("failed to record round for {user_id} on {date}"))?;

        let (leaderboard, daily_scores, question_scores) = futures::try_join!(
            self.store.leaderboard(),
            self.store.daily_scores(date),
            self.store.question_scores(date)
        )?;

        let rank = ranking::rank(user_id, &leaderboard);
        let daily_rank = ranking::daily_rank(user_id, &daily_scores);
        let question_ranks = ranking::question_ranks(user_id, session.answers(), &question_scores);
        let delta_from_historical = historical_average.map(|h| summary.overall_average - h.overall);

        tracing::info!(
            user = user_id,
            %date,
            overall = summary.overall_average,
            %rank,
            "round recorded"
        );

        Ok(ResultsReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            user_id: user_id.to_string(),
            date,
            answers: session.answers().to_vec(),
            summary,
            rank,
            daily_rank,
            question_ranks,
            total_users_today: daily_scores.len(),
            historical_average,
            delta_from_historical,
        })
    }

    /// The top `leaderboard_limit` rows, and `user_id`'s placement if given.
    pub async fn standings(&self, user_id: Option<&str>) -> Result<Standings> {
        let entries = self.store.leaderboard().await?;
        let top = ranking::top_n(&entries, self.config.leaderboard_limit)
            .into_iter()
            .map(|r| StandingRow {
                position: r.position,
                entry: r.entry.clone(),
            })
            .collect();

        Ok(Standings {
            top,
            total: entries.len(),
            player: user_id.map(|id| ranking::rank(id, &entries)),
        })
    }
}
