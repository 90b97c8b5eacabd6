//! Core data model types for EchoBreaker.
//!
//! A [`Question`] carries the survey ground truth for one post, a [`Guess`]
//! is a player's answer to it, and a [`ScoredGuess`] is the accuracy derived
//! from the two. Leaderboard rows and per-day score records live here too.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Lower and upper bound of every percentage in the game.
pub const PCT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// One of the two surveyed groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Dem,
    Rep,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Dem => write!(f, "dem"),
            Party::Rep => write!(f, "rep"),
        }
    }
}

/// A `{dem, rep}` pair of percentages, each finite and within `[0, 100]`.
///
/// The only way to build one is through [`Pct::new`] (or deserialization,
/// which goes through the same check), so holding a `Pct` means holding a
/// valid value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPct", into = "RawPct")]
pub struct Pct {
    dem: f64,
    rep: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPct {
    dem: f64,
    rep: f64,
}

impl TryFrom<RawPct> for Pct {
    type Error = ScoringError;

    fn try_from(raw: RawPct) -> Result<Self, Self::Error> {
        Pct::new(raw.dem, raw.rep)
    }
}

impl From<Pct> for RawPct {
    fn from(pct: Pct) -> Self {
        RawPct {
            dem: pct.dem,
            rep: pct.rep,
        }
    }
}

fn check_component(field: &'static str, value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() && PCT_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(ScoringError::invalid(field, value))
    }
}

impl Pct {
    /// Validate and build a percentage pair.
    pub fn new(dem: f64, rep: f64) -> Result<Self, ScoringError> {
        Ok(Self {
            dem: check_component("dem", dem)?,
            rep: check_component("rep", rep)?,
        })
    }

    pub fn dem(&self) -> f64 {
        self.dem
    }

    pub fn rep(&self) -> f64 {
        self.rep
    }

    /// The component for one party.
    pub fn get(&self, party: Party) -> f64 {
        match party {
            Party::Dem => self.dem,
            Party::Rep => self.rep,
        }
    }
}

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dem {}% / rep {}%", self.dem, self.rep)
    }
}

/// Parses `"<dem>,<rep>"`, e.g. `"60, 40"`.
impl FromStr for Pct {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dem, rep) = s
            .split_once(',')
            .ok_or_else(|| ScoringError::invalid("dem,rep", s))?;
        let dem = dem
            .trim()
            .parse::<f64>()
            .map_err(|_| ScoringError::invalid("dem", dem.trim()))?;
        let rep = rep
            .trim()
            .parse::<f64>()
            .map_err(|_| ScoringError::invalid("rep", rep.trim()))?;
        Pct::new(dem, rep)
    }
}

/// A post shown to players, with the survey result it is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, e.g. `"immigration/tweet3"`.
    pub id: String,
    /// Where the rendered post image lives. Opaque to the engine.
    pub image_uri: String,
    /// Survey topic the post was matched to.
    #[serde(default)]
    pub topic: Option<String>,
    /// Survey share of each party endorsing the post; `None` when the
    /// survey data could not be found.
    #[serde(default)]
    pub ground_truth: Option<Pct>,
}

/// A player's submitted answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub user_id: String,
    pub question_id: String,
    pub pct: Pct,
    pub submitted_at: DateTime<Utc>,
}

/// Accuracy of one guess. Every field is in `[0, 100]` and
/// `total_score == (dem_score + rep_score) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredGuess {
    pub dem_score: f64,
    pub rep_score: f64,
    pub total_score: f64,
}

impl ScoredGuess {
    /// The score for one party.
    pub fn party(&self, party: Party) -> f64 {
        match party {
            Party::Dem => self.dem_score,
            Party::Rep => self.rep_score,
        }
    }
}

/// A scored guess alongside what was guessed and what the survey said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub question_id: String,
    pub guess: Pct,
    pub actual: Pct,
    pub scores: ScoredGuess,
}

/// Why a question slot produced no score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The question has no survey ground truth.
    MissingGroundTruth,
    /// The player never answered the question.
    NoGuess,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingGroundTruth => write!(f, "missing ground truth"),
            SkipReason::NoGuess => write!(f, "no guess"),
        }
    }
}

/// A question slot left out of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedQuestion {
    pub question_id: String,
    pub reason: SkipReason,
}

/// One row of the global leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Cumulative score across completed sessions.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub games_played: u32,
    /// Account creation time, used to break score ties.
    pub created_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Name to show for this player.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Unknown player")
    }
}

/// A player's averages for one completed game day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyScore {
    pub user_id: String,
    pub date: NaiveDate,
    pub avg_score: f64,
    pub avg_score_dem: f64,
    pub avg_score_rep: f64,
}

/// One player's score on one question of a game day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub user_id: String,
    pub date: NaiveDate,
    pub question_id: String,
    pub scores: ScoredGuess,
}

/// A player's long-run averages, computed by the store over whatever
/// window it chooses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAverage {
    pub overall: f64,
    pub dem: f64,
    pub rep: f64,
}
