//! Game state shared by the stores.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use echobreaker_core::model::{
    DailyScore, HistoricalAverage, LeaderboardEntry, Question, QuestionScore, ScoredAnswer,
};
use echobreaker_core::statistics::SessionSummary;

use crate::error::StoreError;

/// Everything a store holds: issued questions, players and daily scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Questions issued per game day, in display order.
    #[serde(default)]
    pub questions: BTreeMap<NaiveDate, Vec<Question>>,
    /// One leaderboard row per player.
    #[serde(default)]
    pub players: Vec<LeaderboardEntry>,
    /// One row per (player, day) with a recorded round.
    #[serde(default)]
    pub scores: Vec<DailyScore>,
    /// Per-question scores of every recorded round.
    #[serde(default)]
    pub answers: Vec<QuestionScore>,
}

impl GameState {
    /// Append questions to a game day.
    pub fn add_questions(&mut self, date: NaiveDate, questions: impl IntoIterator<Item = Question>) {
        self.questions.entry(date).or_default().extend(questions);
    }

    /// Seed a leaderboard row.
    pub fn add_player(&mut self, entry: LeaderboardEntry) -> Result<(), StoreError> {
        if self.player(&entry.user_id).is_some() {
            return Err(StoreError::DuplicatePlayer(entry.user_id));
        }
        self.players.push(entry);
        Ok(())
    }

    pub fn player(&self, user_id: &str) -> Option<&LeaderboardEntry> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn questions_for(&self, date: NaiveDate) -> Vec<Question> {
        self.questions.get(&date).cloned().unwrap_or_default()
    }

    pub fn has_played(&self, user_id: &str, date: NaiveDate) -> bool {
        self.scores
            .iter()
            .any(|s| s.user_id == user_id && s.date == date)
    }

    /// Record a round: store the day's averages and per-question scores
    /// and add the overall average to the player's cumulative score. A
    /// player seen for the first time joins the leaderboard with `now` as
    /// creation time.
    pub fn record(
        &mut self,
        user_id: &str,
        display_name: Option<&str>,
        date: NaiveDate,
        summary: &SessionSummary,
        answers: &[ScoredAnswer],
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.has_played(user_id, date) {
            return Err(StoreError::AlreadyRecorded {
                user_id: user_id.to_string(),
                date,
            });
        }

        self.scores.push(DailyScore {
            user_id: user_id.to_string(),
            date,
            avg_score: summary.overall_average,
            avg_score_dem: summary.dem.average,
            avg_score_rep: summary.rep.average,
        });
        self.answers.extend(answers.iter().map(|a| QuestionScore {
            user_id: user_id.to_string(),
            date,
            question_id: a.question_id.clone(),
            scores: a.scores,
        }));

        let idx = match self.players.iter().position(|p| p.user_id == user_id) {
            Some(idx) => idx,
            None => {
                self.players.push(LeaderboardEntry {
                    user_id: user_id.to_string(),
                    display_name: None,
                    score: 0.0,
                    games_played: 0,
                    created_at: now,
                });
                self.players.len() - 1
            }
        };

        let player = &mut self.players[idx];
        player.score += summary.overall_average;
        player.games_played += 1;
        if let Some(name) = display_name {
            player.display_name = Some(name.to_string());
        }

        Ok(())
    }

    pub fn daily_scores(&self, date: NaiveDate) -> Vec<DailyScore> {
        self.scores
            .iter()
            .filter(|s| s.date == date)
            .cloned()
            .collect()
    }

    pub fn question_scores(&self, date: NaiveDate) -> Vec<QuestionScore> {
        self.answers
            .iter()
            .filter(|s| s.date == date)
            .cloned()
            .collect()
    }

    /// Mean of every recorded day for the player.
    pub fn historical_average(&self, user_id: &str) -> Option<HistoricalAverage> {
        let days: Vec<&DailyScore> = self.scores.iter().filter(|s| s.user_id == user_id).collect();
        if days.is_empty() {
            return None;
        }
        let n = days.len() as f64;
        let mean = |f: fn(&DailyScore) -> f64| days.iter().map(|s| f(s)).sum::<f64>() / n;
        Some(HistoricalAverage {
            overall: mean(|s| s.avg_score),
            dem: mean(|s| s.avg_score_dem),
            rep: mean(|s| s.avg_score_rep),
        })
    }
}
