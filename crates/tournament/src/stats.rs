//! Per-player results, split by the colour played.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use reversi_core::Color;

/// Result of one game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

/// Counters are indexed by [`Color::idx`]: black first, then white.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub label: String,
    pub wins: [u32; 2],
    pub losses: [u32; 2],
    pub draws: [u32; 2],
}

impl PlayerStats {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, color: Color, result: GameResult) {
        let counter = match result {
            GameResult::Win => &mut self.wins,
            GameResult::Loss => &mut self.losses,
            GameResult::Draw => &mut self.draws,
        };
        counter[color.idx()] += 1;
    }

    pub fn total_wins(&self) -> u32 {
        self.wins.iter().sum()
    }

    pub fn total_losses(&self) -> u32 {
        self.losses.iter().sum()
    }

    pub fn total_draws(&self) -> u32 {
        self.draws.iter().sum()
    }

    pub fn total_games(&self) -> u32 {
        self.total_wins() + self.total_losses() + self.total_draws()
    }

    /// Draws count half. 0.0 before the first game.
    pub fn win_rate(&self) -> f64 {
        rate(self.total_wins(), self.total_draws(), self.total_games())
    }

    pub fn games_as(&self, color: Color) -> u32 {
        let i = color.idx();
        self.wins[i] + self.losses[i] + self.draws[i]
    }

    pub fn win_rate_as(&self, color: Color) -> f64 {
        let i = color.idx();
        rate(self.wins[i], self.draws[i], self.games_as(color))
    }

    /// `W-D-L (WinRate: x%)`
    pub fn summary(&self) -> String {
        format!(
            "{}-{}-{} (WinRate: {:.1}%)",
            self.total_wins(),
            self.total_draws(),
            self.total_losses(),
            self.win_rate() * 100.0
        )
    }
}

fn rate(wins: u32, draws: u32, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    (wins as f64 + 0.5 * draws as f64) / games as f64
}

/// Write all players' statistics as pretty JSON, replacing the file.
pub fn save_stats(stats: &[&PlayerStats], path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)
}

pub fn load_stats(path: &Path) -> io::Result<Vec<PlayerStats>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod stats_tests;
