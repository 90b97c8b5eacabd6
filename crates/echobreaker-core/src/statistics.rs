//! Session aggregation: averages and best/worst questions per party.
//!
//! The overall figure shown to players is the mean of the two party
//! averages, `(dem.average + rep.average) / 2`. The mean of the combined
//! per-question totals is kept separately in `combined`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::{Party, Pct, Question, ScoredAnswer, ScoredGuess, SkipReason, SkippedQuestion};
use crate::scorer::score;

/// Average and extreme questions over one stream of scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyStats {
    /// Mean score, `0` when there is nothing to average.
    pub average: f64,
    /// 1-based index of the highest score; the first one wins ties.
    pub best_question: Option<usize>,
    /// 1-based index of the lowest score; the first one wins ties.
    pub worst_question: Option<usize>,
}

impl PartyStats {
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut best: Option<(usize, f64)> = None;
        let mut worst: Option<(usize, f64)> = None;

        for (idx, value) in scores.into_iter().enumerate() {
            sum += value;
            count += 1;
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((idx + 1, value));
            }
            if worst.map_or(true, |(_, w)| value < w) {
                worst = Some((idx + 1, value));
            }
        }

        Self {
            average: if count == 0 { 0.0 } else { sum / count as f64 },
            best_question: best.map(|(i, _)| i),
            worst_question: worst.map(|(i, _)| i),
        }
    }
}

/// Summary statistics for one player's session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Number of scored questions. Skipped slots are not counted.
    pub question_count: usize,
    /// Statistics over `total_score`. Best/worst indices refer to question
    /// slots when built by [`ScoredRound::summary_for`], and to positions
    /// among the scored answers when built by [`aggregate`].
    pub combined: PartyStats,
    /// Statistics over `dem_score`.
    pub dem: PartyStats,
    /// Statistics over `rep_score`.
    pub rep: PartyStats,
    /// Mean of the two party averages.
    pub overall_average: f64,
    /// Slots that could not be scored.
    #[serde(default)]
    pub skipped: Vec<SkippedQuestion>,
}

impl SessionSummary {
    /// Per-party statistics.
    pub fn party(&self, party: Party) -> &PartyStats {
        match party {
            Party::Dem => &self.dem,
            Party::Rep => &self.rep,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.question_count == 0
    }
}

/// Aggregate an ordered sequence of scored guesses.
///
/// Indices in the result are 1-based positions in `scored`. An empty
/// sequence is valid and yields zero averages with no best or worst.
pub fn aggregate(scored: &[ScoredGuess]) -> SessionSummary {
    let combined = PartyStats::from_scores(scored.iter().map(|s| s.total_score));
    let dem = PartyStats::from_scores(scored.iter().map(|s| s.party(Party::Dem)));
    let rep = PartyStats::from_scores(scored.iter().map(|s| s.party(Party::Rep)));

    SessionSummary {
        question_count: scored.len(),
        combined,
        dem,
        rep,
        overall_average: (dem.average + rep.average) / 2.0,
        skipped: Vec::new(),
    }
}

/// A day's questions paired with one player's guesses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoredRound {
    pub answers: Vec<ScoredAnswer>,
    pub skipped: Vec<SkippedQuestion>,
}

impl ScoredRound {
    /// Aggregate the answers and attach the skipped slots.
    ///
    /// Best/worst indices are positions among `answers`. Use
    /// [`summary_for`](Self::summary_for) when slots may have been skipped.
    pub fn summary(&self) -> SessionSummary {
        let scores: Vec<ScoredGuess> = self.answers.iter().map(|a| a.scores).collect();
        SessionSummary {
            skipped: self.skipped.clone(),
            ..aggregate(&scores)
        }
    }

    /// Like [`summary`](Self::summary), but best/worst indices are 1-based
    /// slots in `questions`, so a skipped slot does not shift them. Answers
    /// for questions outside `questions` are left out.
    pub fn summary_for(&self, questions: &[Question]) -> SessionSummary {
        let mut slotted: Vec<(usize, ScoredGuess)> = self
            .answers
            .iter()
            .filter_map(|a| {
                let slot = questions.iter().position(|q| q.id == a.question_id)?;
                Some((slot, a.scores))
            })
            .collect();
        slotted.sort_by_key(|(slot, _)| *slot);

        let scores: Vec<ScoredGuess> = slotted.iter().map(|(_, s)| *s).collect();
        let mut summary = SessionSummary {
            skipped: self.skipped.clone(),
            ..aggregate(&scores)
        };

        let to_slot = |idx: Option<usize>| idx.map(|i| slotted[i - 1].0 + 1);
        for stats in [&mut summary.combined, &mut summary.dem, &mut summary.rep] {
            stats.best_question = to_slot(stats.best_question);
            stats.worst_question = to_slot(stats.worst_question);
        }
        summary
    }
}

/// Score a player's guesses against the day's questions, in question order.
///
/// Questions without ground truth and questions the player never answered
/// are skipped and reported. Guesses for questions not in the batch are
/// ignored.
pub fn score_round(
    questions: &[Question],
    guesses: &HashMap<String, Pct>,
) -> Result<ScoredRound, ScoringError> {
    let mut round = ScoredRound::default();
    let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();

    for id in guesses.keys().filter(|id| !known.contains(id.as_str())) {
        tracing::warn!("ignoring guess for unknown question '{id}'");
    }

    for question in questions {
        let Some(guess) = guesses.get(&question.id) else {
            round.skipped.push(SkippedQuestion {
                question_id: question.id.clone(),
                reason: SkipReason::NoGuess,
            });
            continue;
        };
        let Some(actual) = question.ground_truth else {
            tracing::warn!("question '{}' has no ground truth, skipping", question.id);
            round.skipped.push(SkippedQuestion {
                question_id: question.id.clone(),
                reason: SkipReason::MissingGroundTruth,
            });
            continue;
        };

        round.answers.push(ScoredAnswer {
            question_id: question.id.clone(),
            guess: *guess,
            actual,
            scores: score(guess, &actual)?,
        });
    }

    tracing::debug!(
        scored = round.answers.len(),
        skipped = round.skipped.len(),
        "scored round"
    );

    Ok(round)
}
