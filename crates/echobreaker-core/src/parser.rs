//! TOML round file parser.
//!
//! A round file holds one day's questions and one player's guesses. It is
//! how the CLI feeds the engine, and doubles as a fixture format.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::config::GameConfig;
use crate::model::{Guess, Pct, Question};

/// Intermediate TOML structure for parsing round files.
#[derive(Debug, Deserialize)]
struct TomlRoundFile {
    round: TomlRoundHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    guesses: Vec<TomlGuess>,
}

#[derive(Debug, Deserialize)]
struct TomlRoundHeader {
    date: String,
    user_id: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    image_uri: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    dem: Option<f64>,
    #[serde(default)]
    rep: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TomlGuess {
    question_id: String,
    dem: f64,
    rep: f64,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

/// A guess as written in a round file.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundGuess {
    pub question_id: String,
    pub pct: Pct,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One player's round: the day's questions and their guesses.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub date: NaiveDate,
    pub user_id: String,
    pub display_name: Option<String>,
    pub questions: Vec<Question>,
    pub guesses: Vec<RoundGuess>,
}

impl Round {
    /// Guesses keyed by question id. The first guess for a question wins.
    pub fn guess_map(&self) -> HashMap<String, Pct> {
        let mut map = HashMap::new();
        for g in &self.guesses {
            map.entry(g.question_id.clone()).or_insert(g.pct);
        }
        map
    }

    /// Guesses as session submissions. Guesses without a timestamp are
    /// placed at noon of the round's game day.
    pub fn to_guesses(&self, config: &GameConfig) -> Result<Vec<Guess>> {
        let offset = config.day_offset()?;
        let noon = offset
            .from_local_datetime(&self.date.and_time(NaiveTime::MIN))
            .single()
            .map(|midnight| (midnight + chrono::Duration::hours(12)).with_timezone(&Utc))
            .with_context(|| format!("no unambiguous noon on {}", self.date))?;

        Ok(self
            .guesses
            .iter()
            .map(|g| Guess {
                user_id: self.user_id.clone(),
                question_id: g.question_id.clone(),
                pct: g.pct,
                submitted_at: g.submitted_at.unwrap_or(noon),
            })
            .collect())
    }
}

/// Parse a round file.
pub fn parse_round(path: &Path) -> Result<Round> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read round file: {}", path.display()))?;

    parse_round_str(&content, path)
}

/// Parse a TOML string into a `Round` (useful for testing).
pub fn parse_round_str(content: &str, source_path: &Path) -> Result<Round> {
    let parsed: TomlRoundFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let date = NaiveDate::parse_from_str(&parsed.round.date, "%Y-%m-%d")
        .with_context(|| format!("invalid round date: '{}'", parsed.round.date))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let ground_truth = match (q.dem, q.rep) {
                (Some(dem), Some(rep)) => Some(
                    Pct::new(dem, rep)
                        .with_context(|| format!("question '{}' ground truth", q.id))?,
                ),
                _ => None,
            };
            Ok(Question {
                id: q.id,
                image_uri: q.image_uri,
                topic: q.topic,
                ground_truth,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let guesses = parsed
        .guesses
        .into_iter()
        .map(|g| {
            let pct = Pct::new(g.dem, g.rep)
                .with_context(|| format!("guess for '{}'", g.question_id))?;
            Ok(RoundGuess {
                question_id: g.question_id,
                pct,
                submitted_at: g.submitted_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Round {
        date,
        user_id: parsed.round.user_id,
        display_name: parsed.round.display_name,
        questions,
        guesses,
    })
}

/// A warning from round validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a round for common issues.
pub fn validate_round(round: &Round, config: &GameConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if round.questions.len() != config.batch_size {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "round has {} questions, batch size is {}",
                round.questions.len(),
                config.batch_size
            ),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for q in &round.questions {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &round.questions {
        if q.ground_truth.is_none() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "missing ground truth, question will be skipped".into(),
            });
        }
    }

    let mut guessed = HashSet::new();
    for g in &round.guesses {
        if !seen_ids.contains(g.question_id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(g.question_id.clone()),
                message: "guess for unknown question".into(),
            });
        } else if !guessed.insert(g.question_id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(g.question_id.clone()),
                message: "duplicate guess, only the first counts".into(),
            });
        }
    }

    for q in &round.questions {
        if !guessed.contains(q.id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "no guess submitted".into(),
            });
        }
    }

    warnings
}
