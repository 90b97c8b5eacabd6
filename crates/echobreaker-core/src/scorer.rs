//! Accuracy scoring of a single guess.
//!
//! Each party scores `100 - |guess - actual|`, clamped to `[0, 100]`; the
//! total is the mean of the two.

use crate::error::ScoringError;
use crate::model::{Party, Pct, ScoredGuess};

fn party_score(guess: &Pct, actual: &Pct, party: Party) -> f64 {
    (100.0 - (guess.get(party) - actual.get(party)).abs()).clamp(0.0, 100.0)
}

/// Score a guess against the survey ground truth.
///
/// Both sides are validated [`Pct`]s, so the result is always finite. The
/// `Result` keeps the signature uniform with [`score_raw`].
pub fn score(guess: &Pct, actual: &Pct) -> Result<ScoredGuess, ScoringError> {
    let dem_score = party_score(guess, actual, Party::Dem);
    let rep_score = party_score(guess, actual, Party::Rep);
    Ok(ScoredGuess {
        dem_score,
        rep_score,
        total_score: (dem_score + rep_score) / 2.0,
    })
}

/// Validate raw percentages and score them.
pub fn score_raw(
    guess_dem: f64,
    guess_rep: f64,
    actual_dem: f64,
    actual_rep: f64,
) -> Result<ScoredGuess, ScoringError> {
    let guess = Pct::new(guess_dem, guess_rep)?;
    let actual = Pct::new(actual_dem, actual_rep)?;
    score(&guess, &actual)
}
