//! The `echobreaker rank` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use echobreaker_core::config::load_config_from;
use echobreaker_core::engine::{ResultsEngine, Standings};
use echobreaker_core::ranking::RankLookup;
use echobreaker_store::SnapshotStore;

use crate::Format;

pub async fn execute(
    store_path: PathBuf,
    user: Option<String>,
    top: Option<usize>,
    format: Format,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(top) = top {
        config.leaderboard_limit = top;
        config.validate()?;
    }

    anyhow::ensure!(
        store_path.exists(),
        "store not found: {}",
        store_path.display()
    );
    let store = Arc::new(SnapshotStore::open(&store_path)?);
    let engine = ResultsEngine::new(store, config);
    let standings = engine.standings(user.as_deref()).await?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&standings)?),
        Format::Markdown => print_markdown(&standings, user.as_deref()),
        Format::Text => print_text(&standings, user.as_deref()),
    }

    Ok(())
}

fn print_text(standings: &Standings, user: Option<&str>) {
    if standings.top.is_empty() {
        println!("No players yet.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["#", "Player", "Score", "Games"]);
        for row in &standings.top {
            table.add_row(vec![
                Cell::new(row.position),
                Cell::new(row.entry.label()),
                Cell::new(format!("{:.1}", row.entry.score)),
                Cell::new(row.entry.games_played),
            ]);
        }
        println!("{table}");
        println!("{} player(s) ranked", standings.total);
    }

    if let (Some(user), Some(lookup)) = (user, &standings.player) {
        println!("{user}: {}", describe(lookup));
    }
}

fn print_markdown(standings: &Standings, user: Option<&str>) {
    println!("| # | Player | Score | Games |");
    println!("|---|---|---|---|");
    for row in &standings.top {
        println!(
            "| {} | {} | {:.1} | {} |",
            row.position,
            row.entry.label(),
            row.entry.score,
            row.entry.games_played
        );
    }
    if let (Some(user), Some(lookup)) = (user, &standings.player) {
        println!("\n**{user}:** {}", describe(lookup));
    }
}

fn describe(lookup: &RankLookup) -> String {
    match lookup.placement() {
        Some(p) => format!("{lookup} (at or above {:.0}% of players)", p.percentile()),
        None => lookup.to_string(),
    }
}
