use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::game::DEFAULT_STEP_LIMIT;
use crate::planners::{PlannerConfig, Strategy};

pub const DEFAULT_GRID_SIZE: i32 = 18;
pub const DEFAULT_DELAY_MS: u64 = 400;
pub const DEFAULT_USER_NAME: &str = "player";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// Runtime settings, read from `ROBOLEARN_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Level file to play; a level is generated when unset.
    pub level_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub grid_size: i32,
    pub planner: PlannerConfig,
    /// Block program to run instead of the planner.
    pub program_file: Option<PathBuf>,
    pub delay: Duration,
    pub step_limit: usize,
    pub replays_folder: Option<String>,
    pub user_name: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let defaults = PlannerConfig::default();

        Ok(Config {
            level_file: lookup("ROBOLEARN_LEVEL_FILE").map(PathBuf::from),
            seed: parse_var(&lookup, "ROBOLEARN_SEED")?,
            grid_size: parse_var::<i32>(&lookup, "ROBOLEARN_GRID_SIZE")?
                .unwrap_or(DEFAULT_GRID_SIZE),
            planner: PlannerConfig {
                strategy: parse_var::<Strategy>(&lookup, "ROBOLEARN_STRATEGY")?
                    .unwrap_or(defaults.strategy),
                max_exact_pickups: parse_var::<usize>(&lookup, "ROBOLEARN_MAX_EXACT_PICKUPS")?
                    .unwrap_or(defaults.max_exact_pickups),
            },
            program_file: lookup("ROBOLEARN_PROGRAM_FILE").map(PathBuf::from),
            delay: Duration::from_millis(
                parse_var::<u64>(&lookup, "ROBOLEARN_DELAY_MS")?.unwrap_or(DEFAULT_DELAY_MS),
            ),
            step_limit: parse_var::<usize>(&lookup, "ROBOLEARN_STEP_LIMIT")?
                .unwrap_or(DEFAULT_STEP_LIMIT),
            replays_folder: lookup("ROBOLEARN_REPLAYS_FOLDER"),
            user_name: lookup("ROBOLEARN_USER_NAME")
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
        })
    }
}

/// Unset or blank is `None`; anything that fails to parse is an error.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError { key, value })
}
