//! Local game server for NBoard engines.
//!
//! Plays a series of Reversi games between two engine processes, alternating
//! colours, and records every game as GGF plus running statistics as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Write default config templates
//! cargo run -p tournament -- init configs/
//!
//! # Play 100 games between the two configured engines
//! cargo run -p tournament -- run configs/game.toml configs/player0.toml configs/player1.toml 100
//! ```

mod config;
mod match_runner;
mod opening_book;
mod stats;

pub use config::*;
pub use match_runner::*;
pub use opening_book::*;
pub use stats::*;
