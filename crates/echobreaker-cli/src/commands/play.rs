//! The `echobreaker play` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use echobreaker_core::config::load_config_from;
use echobreaker_core::engine::ResultsEngine;
use echobreaker_core::error::SessionError;
use echobreaker_core::parser;
use echobreaker_core::report::ResultsReport;
use echobreaker_core::session::SubmitOutcome;
use echobreaker_core::traits::GameStore;
use echobreaker_store::SnapshotStore;

use super::score::{print_answers, print_summary};
use crate::Format;

pub async fn execute(
    round_path: PathBuf,
    store_path: PathBuf,
    format: Format,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let round = parser::parse_round(&round_path)?;

    let store = Arc::new(SnapshotStore::open(&store_path)?);
    if store.daily_questions(round.date).await?.is_empty() {
        tracing::info!(
            "issuing {} question(s) for {}",
            round.questions.len(),
            round.date
        );
        store
            .issue_questions(round.date, round.questions.clone())
            .await?;
    }

    let engine = ResultsEngine::new(store, config.clone());
    let mut session = engine.open_session(&round.user_id, round.date).await?;

    for guess in round.to_guesses(&config)? {
        let question_id = guess.question_id.clone();
        match session.submit(guess) {
            Ok(SubmitOutcome::Scored(a)) => {
                tracing::debug!("{question_id}: {:.1}", a.scores.total_score)
            }
            Ok(SubmitOutcome::Skipped(s)) => {
                eprintln!("  Skipped {question_id}: {}", s.reason)
            }
            Err(e @ (SessionError::DayRolledOver { .. } | SessionError::SessionClosed { .. })) => {
                eprintln!("  {e}, remaining guesses ignored");
                break;
            }
            Err(
                e @ (SessionError::DuplicateGuess(_)
                | SessionError::UnknownQuestion(_)
                | SessionError::WrongUser { .. }
                | SessionError::WrongDay { .. }),
            ) => {
                eprintln!("  Rejected {question_id}: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if session.is_open() {
        let today = config.game_date(chrono::Utc::now())?;
        anyhow::ensure!(
            session.roll_over(today),
            "round for {} is incomplete: {} unanswered question(s) and the day is not over",
            round.date,
            session.remaining()
        );
        eprintln!(
            "  Day {} is over, {} unanswered question(s) skipped",
            round.date,
            session.remaining()
        );
    }

    let report = engine
        .finish(&session, round.display_name.as_deref())
        .await
        .with_context(|| format!("failed to finish round for {}", round.user_id))?;

    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report saved to {}", path.display());
    }

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Markdown => println!("{}", report.to_markdown()),
        Format::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &ResultsReport) {
    println!("Results for {} on {}", report.user_id, report.date);
    print_answers(&report.answers);
    print_summary(&report.summary);

    println!("Leaderboard: {}", report.rank);
    if let Some(p) = report.rank.placement() {
        println!("  at or above {:.0}% of players", p.percentile());
    }
    if let Some(daily) = report.daily_rank {
        println!(
            "Today: #{} of {} (Democrats #{}, Republicans #{})",
            daily.overall, report.total_users_today, daily.dem, daily.rep
        );
    }
    for q in &report.question_ranks {
        println!(
            "  {}: #{} today (Democrats #{}, Republicans #{})",
            q.question_id, q.rank.overall, q.rank.dem, q.rank.rep
        );
    }
    match (&report.historical_average, report.delta_from_historical) {
        (Some(hist), Some(delta)) => println!(
            "Historical average: {:.2} ({:+.2} today)",
            hist.overall, delta
        ),
        _ => println!("First game, no history yet."),
    }
}
