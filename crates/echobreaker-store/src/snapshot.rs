//! Game store persisted as a JSON snapshot file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use echobreaker_core::model::{
    DailyScore, HistoricalAverage, LeaderboardEntry, Question, QuestionScore, ScoredAnswer,
};
use echobreaker_core::statistics::SessionSummary;
use echobreaker_core::traits::GameStore;

use crate::state::GameState;

/// A [`GameStore`] whose state lives in a JSON file.
///
/// The file is read once on open and rewritten after every write. Writes
/// go to a temporary file in the same directory first and are renamed
/// into place, so a crash never leaves a truncated snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    state: RwLock<GameState>,
}

impl SnapshotStore {
    /// Open a snapshot, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            load_state(&path)?
        } else {
            tracing::debug!("no snapshot at {}, starting empty", path.display());
            GameState::default()
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Issue questions for a game day and save.
    pub async fn issue_questions(&self, date: NaiveDate, questions: Vec<Question>) -> Result<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.add_questions(date, questions);
        save_state(&self.path, &next)?;
        *state = next;
        Ok(())
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }
}

fn load_state(path: &Path) -> Result<GameState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot: {}", path.display()))
}

fn save_state(path: &Path, state: &GameState) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot directory: {}", dir.display()))?;

    let json = serde_json::to_string_pretty(state).context("failed to serialize snapshot")?;
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    std::fs::write(tmp.path(), json)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl GameStore for SnapshotStore {
    async fn daily_questions(&self, date: NaiveDate) -> Result<Vec<Question>> {
        Ok(self.state.read().await.questions_for(date))
    }

    async fn record_round(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        date: NaiveDate,
        summary: &SessionSummary,
        answers: &[ScoredAnswer],
    ) -> Result<()> {
        // Only a saved round becomes visible.
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.record(user_id, display_name, date, summary, answers, Utc::now())?;
        save_state(&self.path, &next)?;
        *state = next;
        tracing::debug!(user = user_id, %date, path = %self.path.display(), "round saved");
        Ok(())
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.state.read().await.players.clone())
    }

    async fn daily_scores(&self, date: NaiveDate) -> Result<Vec<DailyScore>> {
        Ok(self.state.read().await.daily_scores(date))
    }

    async fn question_scores(&self, date: NaiveDate) -> Result<Vec<QuestionScore>> {
        Ok(self.state.read().await.question_scores(date))
    }

    async fn historical_average(&self, user_id: &str) -> Result<Option<HistoricalAverage>> {
        Ok(self.state.read().await.historical_average(user_id))
    }
}
