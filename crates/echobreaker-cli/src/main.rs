//! echobreaker CLI: score rounds, play them against a store, show standings.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "echobreaker", version, about = "Partisan-perception quiz scoring engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for commands that print results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a round file without recording it
    Score {
        /// Path to a .toml round file
        #[arg(long)]
        round: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Play a round against a store and print the results report
    Play {
        /// Path to a .toml round file
        #[arg(long)]
        round: PathBuf,

        /// JSON snapshot file holding the game state (created if missing)
        #[arg(long)]
        store: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Also save the report as JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the leaderboard
    Rank {
        /// JSON snapshot file holding the game state
        #[arg(long)]
        store: PathBuf,

        /// Show this player's placement
        #[arg(long)]
        user: Option<String>,

        /// Rows to show (default: leaderboard_limit from config)
        #[arg(long)]
        top: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a round file
    Validate {
        /// Path to a .toml round file
        #[arg(long)]
        round: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example round
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("echobreaker=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score { round, format } => commands::score::execute(round, format),
        Commands::Play {
            round,
            store,
            format,
            output,
            config,
        } => commands::play::execute(round, store, format, output, config).await,
        Commands::Rank {
            store,
            user,
            top,
            format,
            config,
        } => commands::rank::execute(store, user, top, format, config).await,
        Commands::Validate { round, config } => commands::validate::execute(round, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
