//! A player's batch of guesses for one game day.
//!
//! A session opens with the day's questions and closes once every slot is
//! filled or the day rolls over. Each question accepts one guess; a second
//! guess is rejected, never overwritten.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{game_date, GameConfig};
use crate::error::SessionError;
use crate::model::{Guess, Question, ScoredAnswer, SkipReason, SkippedQuestion};
use crate::scorer::score;
use crate::statistics::{ScoredRound, SessionSummary};

/// Why a session stopped accepting guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Completed,
    DayRolledOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Closed(CloseReason),
}

/// What happened to an accepted guess.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Scored(ScoredAnswer),
    /// The slot was consumed but could not be scored.
    Skipped(SkippedQuestion),
}

#[derive(Debug, Clone)]
pub struct DailySession {
    user_id: String,
    date: NaiveDate,
    questions: Vec<Question>,
    day_offset: FixedOffset,
    round: ScoredRound,
    state: SessionState,
}

impl DailySession {
    /// Open a session over the first `batch_size` questions.
    pub fn open(
        user_id: impl Into<String>,
        date: NaiveDate,
        mut questions: Vec<Question>,
        config: &GameConfig,
    ) -> Result<Self, SessionError> {
        if questions.len() < config.batch_size {
            return Err(SessionError::NotEnoughQuestions {
                needed: config.batch_size,
                available: questions.len(),
            });
        }
        questions.truncate(config.batch_size);

        let day_offset = config.day_offset()?;

        Ok(Self {
            user_id: user_id.into(),
            date,
            questions,
            day_offset,
            round: ScoredRound::default(),
            state: SessionState::Open,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Scored answers in question order.
    pub fn answers(&self) -> &[ScoredAnswer] {
        &self.round.answers
    }

    pub fn skipped(&self) -> &[SkippedQuestion] {
        &self.round.skipped
    }

    /// Slots filled so far, scored or skipped.
    pub fn filled(&self) -> usize {
        self.round.answers.len() + self.round.skipped.len()
    }

    pub fn remaining(&self) -> usize {
        self.questions.len() - self.filled()
    }

    fn slot(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }

    fn answered(&self, question_id: &str) -> bool {
        self.round.answers.iter().any(|a| a.question_id == question_id)
            || self.round.skipped.iter().any(|s| s.question_id == question_id)
    }

    /// Record a guess.
    pub fn submit(&mut self, guess: Guess) -> Result<SubmitOutcome, SessionError> {
        if !self.is_open() {
            return Err(SessionError::SessionClosed { date: self.date });
        }

        let guess_date = game_date(guess.submitted_at, self.day_offset);
        if guess_date > self.date {
            self.state = SessionState::Closed(CloseReason::DayRolledOver);
            return Err(SessionError::DayRolledOver {
                session_date: self.date,
                guess_date,
            });
        }
        if guess_date < self.date {
            return Err(SessionError::WrongDay {
                session_date: self.date,
                guess_date,
            });
        }

        if guess.user_id != self.user_id {
            return Err(SessionError::WrongUser {
                expected: self.user_id.clone(),
                got: guess.user_id,
            });
        }

        let slot = self
            .slot(&guess.question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(guess.question_id.clone()))?;
        let question = &self.questions[slot];

        if self.answered(&question.id) {
            return Err(SessionError::DuplicateGuess(guess.question_id));
        }

        let outcome = match question.ground_truth {
            Some(actual) => {
                let answer = ScoredAnswer {
                    question_id: question.id.clone(),
                    guess: guess.pct,
                    actual,
                    scores: score(&guess.pct, &actual)?,
                };
                // Keep answers in question order.
                let at = self
                    .round
                    .answers
                    .partition_point(|a| self.slot(&a.question_id) < Some(slot));
                self.round.answers.insert(at, answer.clone());
                SubmitOutcome::Scored(answer)
            }
            None => {
                tracing::warn!("question '{}' has no ground truth, skipping", question.id);
                let skipped = SkippedQuestion {
                    question_id: question.id.clone(),
                    reason: SkipReason::MissingGroundTruth,
                };
                self.round.skipped.push(skipped.clone());
                SubmitOutcome::Skipped(skipped)
            }
        };

        if self.remaining() == 0 {
            tracing::debug!(user = %self.user_id, date = %self.date, "session completed");
            self.state = SessionState::Closed(CloseReason::Completed);
        }

        Ok(outcome)
    }

    /// Close the session if `today` is past its day. Returns whether it closed.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.is_open() && today > self.date {
            self.state = SessionState::Closed(CloseReason::DayRolledOver);
            return true;
        }
        false
    }

    /// Aggregate the answers so far. Best/worst indices are 1-based
    /// question slots. Unanswered slots of a rolled-over session are
    /// reported as skipped.
    pub fn summary(&self) -> SessionSummary {
        let mut summary = self.round.summary_for(&self.questions);
        if self.state == SessionState::Closed(CloseReason::DayRolledOver) {
            summary.skipped.extend(
                self.questions
                    .iter()
                    .filter(|q| !self.answered(&q.id))
                    .map(|q| SkippedQuestion {
                        question_id: q.id.clone(),
                        reason: SkipReason::NoGuess,
                    }),
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pct;
    use chrono::{DateTime, TimeZone, Utc};

    fn questions(n: usize) -> Vec<Question> {
        (1..=n)
            .map(|i| Question {
                id: format!("q{i}"),
                image_uri: format!("img/q{i}.png"),
                topic: None,
                ground_truth: Some(Pct::new(50.0, 50.0).unwrap()),
            })
            .collect()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap()
    }

    fn guess(question_id: &str, dem: f64, rep: f64) -> Guess {
        Guess {
            user_id: "u1".into(),
            question_id: question_id.into(),
            pct: Pct::new(dem, rep).unwrap(),
            submitted_at: noon(),
        }
    }

    fn small_config() -> GameConfig {
        GameConfig {
            batch_size: 3,
            ..GameConfig::default()
        }
    }

    #[test]
    fn open_requires_full_batch() {
        let err = DailySession::open("u1", day(), questions(4), &GameConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SessionError::NotEnoughQuestions {
                needed: 5,
                available: 4
            }
        );

        let session = DailySession::open("u1", day(), questions(7), &small_config()).unwrap();
        assert_eq!(session.questions().len(), 3);
        assert_eq!(session.remaining(), 3);
    }

    #[test]
    fn completes_when_all_slots_filled() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        session.submit(guess("q1", 50.0, 50.0)).unwrap();
        session.submit(guess("q2", 40.0, 60.0)).unwrap();
        assert!(session.is_open());

        let outcome = session.submit(guess("q3", 70.0, 30.0)).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Scored(ref a) if a.scores.total_score == 80.0));
        assert_eq!(session.state(), SessionState::Closed(CloseReason::Completed));

        let summary = session.summary();
        assert_eq!(summary.question_count, 3);
        assert_eq!(summary.combined.best_question, Some(1));
        assert_eq!(summary.combined.worst_question, Some(3));

        assert_eq!(
            session.submit(guess("q1", 1.0, 1.0)),
            Err(SessionError::SessionClosed { date: day() })
        );
    }

    #[test]
    fn rejects_duplicate_guess_without_overwriting() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        session.submit(guess("q1", 50.0, 50.0)).unwrap();
        let err = session.submit(guess("q1", 0.0, 0.0)).unwrap_err();
        assert_eq!(err, SessionError::DuplicateGuess("q1".into()));
        assert_eq!(session.answers()[0].scores.total_score, 100.0);
        assert_eq!(session.filled(), 1);
    }

    #[test]
    fn rejects_unknown_question_and_wrong_user() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        assert_eq!(
            session.submit(guess("q9", 1.0, 1.0)),
            Err(SessionError::UnknownQuestion("q9".into()))
        );

        let mut other = guess("q1", 1.0, 1.0);
        other.user_id = "u2".into();
        assert!(matches!(
            session.submit(other),
            Err(SessionError::WrongUser { .. })
        ));
        assert_eq!(session.filled(), 0);
    }

    #[test]
    fn missing_ground_truth_consumes_slot() {
        let mut qs = questions(3);
        qs[1].ground_truth = None;
        let mut session = DailySession::open("u1", day(), qs, &small_config()).unwrap();

        session.submit(guess("q1", 50.0, 50.0)).unwrap();
        let outcome = session.submit(guess("q2", 50.0, 50.0)).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Skipped(_)));
        session.submit(guess("q3", 50.0, 50.0)).unwrap();

        assert!(!session.is_open());
        let summary = session.summary();
        assert_eq!(summary.question_count, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].reason, SkipReason::MissingGroundTruth);
    }

    #[test]
    fn guess_after_rollover_closes_session() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        session.submit(guess("q1", 50.0, 50.0)).unwrap();

        let mut late = guess("q2", 50.0, 50.0);
        late.submitted_at = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();
        assert!(matches!(
            session.submit(late),
            Err(SessionError::DayRolledOver { .. })
        ));
        assert_eq!(
            session.state(),
            SessionState::Closed(CloseReason::DayRolledOver)
        );

        let summary = session.summary();
        assert_eq!(summary.question_count, 1);
        assert_eq!(summary.skipped.len(), 2);
        assert!(summary.skipped.iter().all(|s| s.reason == SkipReason::NoGuess));
    }

    #[test]
    fn late_evening_guess_belongs_to_same_day() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        let mut g = guess("q1", 50.0, 50.0);
        // 02:30 UTC on the 2nd is 21:30 Eastern on the 1st.
        g.submitted_at = Utc.with_ymd_and_hms(2025, 3, 2, 2, 30, 0).unwrap();
        assert!(session.submit(g).is_ok());
    }

    #[test]
    fn rejects_guess_from_earlier_day() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        let mut early = guess("q1", 50.0, 50.0);
        early.submitted_at = Utc.with_ymd_and_hms(2025, 2, 28, 17, 0, 0).unwrap();
        assert_eq!(
            session.submit(early),
            Err(SessionError::WrongDay {
                session_date: day(),
                guess_date: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            })
        );
        assert!(session.is_open());
        assert_eq!(session.filled(), 0);
    }

    #[test]
    fn best_and_worst_name_question_slots() {
        let mut qs = questions(3);
        qs[0].ground_truth = None;
        let mut session = DailySession::open("u1", day(), qs, &small_config()).unwrap();

        // Answered out of order; q1 has no ground truth.
        session.submit(guess("q3", 50.0, 50.0)).unwrap();
        session.submit(guess("q2", 30.0, 30.0)).unwrap();
        session.submit(guess("q1", 50.0, 50.0)).unwrap();

        let ids: Vec<&str> = session.answers().iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q2", "q3"]);

        let summary = session.summary();
        assert_eq!(summary.combined.best_question, Some(3));
        assert_eq!(summary.combined.worst_question, Some(2));
    }

    #[test]
    fn roll_over_is_explicit() {
        let mut session = DailySession::open("u1", day(), questions(3), &small_config()).unwrap();
        assert!(!session.roll_over(day()));
        assert!(session.roll_over(day().succ_opt().unwrap()));
        assert!(!session.roll_over(day().succ_opt().unwrap()));
        assert!(!session.is_open());
    }
}
