//! The `echobreaker score` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use echobreaker_core::model::ScoredAnswer;
use echobreaker_core::parser;
use echobreaker_core::statistics::{score_round, PartyStats, SessionSummary};

use crate::Format;

pub fn execute(round_path: PathBuf, format: Format) -> Result<()> {
    let round = parser::parse_round(&round_path)?;
    let scored = score_round(&round.questions, &round.guess_map())?;
    let summary = scored.summary_for(&round.questions);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "date": round.date,
                "user_id": round.user_id,
                "summary": summary,
                "answers": scored.answers,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Markdown => {
            println!("## Round {} ({})\n", round.date, round.user_id);
            println!("| # | Question | Dem | Rep | Total |");
            println!("|---|---|---|---|---|");
            for (idx, a) in scored.answers.iter().enumerate() {
                println!(
                    "| {} | {} | {:.1} | {:.1} | {:.1} |",
                    idx + 1,
                    a.question_id,
                    a.scores.dem_score,
                    a.scores.rep_score,
                    a.scores.total_score
                );
            }
            println!("\n**Overall:** {:.2}", summary.overall_average);
        }
        Format::Text => {
            println!(
                "Round {} for {} ({} question(s))",
                round.date,
                round.user_id,
                round.questions.len()
            );
            print_answers(&scored.answers);
            print_summary(&summary);
        }
    }

    Ok(())
}

pub(crate) fn print_answers(answers: &[ScoredAnswer]) {
    if answers.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Guess", "Actual", "Dem", "Rep", "Total"]);

    for (idx, a) in answers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&a.question_id),
            Cell::new(format!("{:.0}/{:.0}", a.guess.dem(), a.guess.rep())),
            Cell::new(format!("{:.0}/{:.0}", a.actual.dem(), a.actual.rep())),
            Cell::new(format!("{:.1}", a.scores.dem_score)),
            Cell::new(format!("{:.1}", a.scores.rep_score)),
            Cell::new(format!("{:.1}", a.scores.total_score)),
        ]);
    }

    println!("{table}");
}

pub(crate) fn print_summary(summary: &SessionSummary) {
    let position = |i: Option<usize>| i.map_or_else(|| "-".to_string(), |i| format!("Q{i}"));
    let line = |label: &str, stats: &PartyStats| {
        println!(
            "  {label:<12} {:>6.2}  best {}  worst {}",
            stats.average,
            position(stats.best_question),
            position(stats.worst_question)
        );
    };

    println!("Overall: {:.2}", summary.overall_average);
    line("Democrats", &summary.dem);
    line("Republicans", &summary.rep);
    line("Combined", &summary.combined);

    for s in &summary.skipped {
        println!("  Skipped {}: {}", s.question_id, s.reason);
    }
}
