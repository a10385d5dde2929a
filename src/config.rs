use std::path::PathBuf;

use clap::Args;

use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_PLAYER_NAME, MAX_GRID_SIZE, MAX_PLAYER_NAME_CHARS, MIN_GRID_SIZE,
};
use crate::error::ConfigError;

const DEFAULT_SCORES_PATH: &str = ".data/scores.json";

/// Startup parameters of one session. Grid size is the only rule knob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub grid_size: usize,
    pub seed: u32,
    pub player_name: String,
}

impl SessionConfig {
    pub fn new(grid_size: usize, seed: u32, player_name: &str) -> Result<Self, ConfigError> {
        validate_grid_size(grid_size)?;
        Ok(Self {
            grid_size,
            seed,
            player_name: sanitize_name(player_name),
        })
    }
}

/// Flags shared by every binary; each falls back to an environment variable.
#[derive(Args, Clone, Debug, Default)]
pub struct SessionArgs {
    /// Side length of the square grid.
    #[arg(long)]
    pub size: Option<usize>,
    /// Seed for maze generation and motion; random when omitted.
    #[arg(long)]
    pub seed: Option<u32>,
    /// Name stored with the final score.
    #[arg(long)]
    pub name: Option<String>,
    /// Score store location.
    #[arg(long)]
    pub scores: Option<PathBuf>,
}

impl SessionArgs {
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let grid_size = self
            .size
            .or_else(|| read_env_usize("GRID_CHASE_SIZE"))
            .unwrap_or(DEFAULT_GRID_SIZE);
        let seed = self.seed.unwrap_or_else(rand::random::<u32>);
        let name = self
            .name
            .clone()
            .or_else(|| std::env::var("GRID_CHASE_PLAYER").ok())
            .unwrap_or_default();
        SessionConfig::new(grid_size, seed, &name)
    }

    pub fn scores_path(&self) -> PathBuf {
        self.scores
            .clone()
            .or_else(|| std::env::var("GRID_CHASE_SCORES_PATH").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORES_PATH))
    }
}

fn validate_grid_size(grid_size: usize) -> Result<(), ConfigError> {
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
        return Err(ConfigError::GridSizeOutOfRange {
            actual: grid_size,
            min: MIN_GRID_SIZE,
            max: MAX_GRID_SIZE,
        });
    }
    Ok(())
}

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    trimmed.chars().take(MAX_PLAYER_NAME_CHARS).collect()
}

fn read_env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
}
