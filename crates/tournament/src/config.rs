//! Game and player settings, stored as TOML.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nboard::EngineConfig;
use reversi_core::GameTime;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How a series of games is played and where its results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Exchange colours after every game.
    pub swap_player: bool,
    /// With `swap_player`, replay the previous start position after swapping.
    pub use_same_position_when_swap: bool,
    pub opening_book_path: Option<PathBuf>,
    pub min_initial_empties: u32,
    pub max_initial_empties: u32,
    pub game_log_path: PathBuf,
    pub stats_path: PathBuf,
    pub quit_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            swap_player: true,
            use_same_position_when_swap: true,
            opening_book_path: None,
            min_initial_empties: 40,
            max_initial_empties: 60,
            game_log_path: PathBuf::from("game.ggf"),
            stats_path: PathBuf::from("stats.json"),
            quit_timeout_ms: 10_000,
            probe_timeout_ms: 10_000,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_toml(self, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_initial_empties > self.max_initial_empties {
            return Err(ConfigError::Invalid(format!(
                "min_initial_empties ({}) exceeds max_initial_empties ({})",
                self.min_initial_empties, self.max_initial_empties
            )));
        }
        if self.max_initial_empties > 60 {
            return Err(ConfigError::Invalid(format!(
                "max_initial_empties ({}) exceeds the 60 empties of the start position",
                self.max_initial_empties
            )));
        }
        Ok(())
    }

    pub fn quit_timeout(&self) -> Duration {
        Duration::from_millis(self.quit_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// One engine and the clock it plays with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub work_dir: Option<PathBuf>,
    /// Sent right after the handshake, before any game.
    pub initial_commands: Vec<String>,
    pub thinking_time: GameTime,
    /// Sent as `set depth` before every game when present.
    pub level: Option<u32>,
}

impl PlayerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path)?;
        if config.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}: engine path is empty",
                path.display()
            )));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_toml(self, path)
    }

    pub fn engine_config(&self, probe_timeout: Duration) -> EngineConfig {
        let mut config = EngineConfig::new(&self.path);
        config.args = self.args.clone();
        config.work_dir = self.work_dir.clone();
        config.initial_commands = self.initial_commands.clone();
        config.probe_timeout = probe_timeout;
        config
    }
}

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(value)?;
    fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
