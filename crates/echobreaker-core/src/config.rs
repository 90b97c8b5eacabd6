//! Game configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for a game deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Questions per daily session.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Rows shown on the leaderboard view.
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
    /// Offset from UTC, in minutes, at which the game day rolls over.
    #[serde(default = "default_day_offset")]
    pub day_offset_minutes: i32,
}

fn default_batch_size() -> usize {
    5
}
fn default_leaderboard_limit() -> usize {
    50
}
fn default_day_offset() -> i32 {
    // US Eastern standard time
    -300
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            leaderboard_limit: default_leaderboard_limit(),
            day_offset_minutes: default_day_offset(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroSize("batch_size"));
        }
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::ZeroSize("leaderboard_limit"));
        }
        self.day_offset()?;
        Ok(())
    }

    /// The configured rollover offset.
    pub fn day_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.day_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::OffsetOutOfRange(self.day_offset_minutes))
    }

    /// The game day an instant falls on.
    pub fn game_date(&self, at: DateTime<Utc>) -> Result<NaiveDate, ConfigError> {
        Ok(game_date(at, self.day_offset()?))
    }
}

/// The calendar date of `at` once shifted by `offset`.
pub fn game_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `echobreaker.toml` in the current directory
/// 2. `~/.config/echobreaker/config.toml`
///
/// Environment variable overrides: `ECHOBREAKER_BATCH_SIZE`,
/// `ECHOBREAKER_LEADERBOARD_LIMIT`.
pub fn load_config() -> Result<GameConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GameConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("echobreaker.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GameConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Ok(size) = std::env::var("ECHOBREAKER_BATCH_SIZE") {
        config.batch_size = size
            .parse()
            .with_context(|| format!("invalid ECHOBREAKER_BATCH_SIZE: '{size}'"))?;
    }
    if let Ok(limit) = std::env::var("ECHOBREAKER_LEADERBOARD_LIMIT") {
        config.leaderboard_limit = limit
            .parse()
            .with_context(|| format!("invalid ECHOBREAKER_LEADERBOARD_LIMIT: '{limit}'"))?;
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("echobreaker"))
}
