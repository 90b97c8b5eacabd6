//! The `echobreaker validate` command.

use std::path::PathBuf;

use anyhow::Result;

use echobreaker_core::config::load_config_from;
use echobreaker_core::parser;

pub fn execute(round_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let round = parser::parse_round(&round_path)?;

    println!(
        "Round {} for {} ({} questions, {} guesses)",
        round.date,
        round.user_id,
        round.questions.len(),
        round.guesses.len()
    );

    let warnings = parser::validate_round(&round, &config);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Round valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
