//! Plays a series of games between two NBoard engines.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use nboard::{EngineError, NBoardEngine};
use reversi_core::{Color, GameRecord, Move, Outcome, Position};

use crate::config::{GameConfig, PlayerConfig};
use crate::opening_book::{BookError, OpeningBook};
use crate::stats::{save_stats, GameResult, PlayerStats};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("cannot start {label} ({}): {source}", path.display())]
    Start {
        label: String,
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Book(#[from] BookError),
    #[error("{engine} played the illegal move {mv}")]
    IllegalMove { engine: String, mv: Move },
    #[error("{engine} stopped without returning a move")]
    NoMove { engine: String },
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct Player {
    pub config: PlayerConfig,
    pub engine: NBoardEngine,
    pub stats: PlayerStats,
}

impl Player {
    pub fn new(label: &str, config: PlayerConfig, game: &GameConfig) -> Self {
        let engine = NBoardEngine::new(config.engine_config(game.probe_timeout()));
        Self {
            config,
            engine,
            stats: PlayerStats::new(label),
        }
    }

    pub fn label(&self) -> &str {
        &self.stats.label
    }
}

/// Final result of one game.
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub record: GameRecord,
    pub position: Position,
    pub outcome: Outcome,
}

pub struct MatchRunner {
    config: GameConfig,
    players: [Player; 2],
    book: Option<OpeningBook>,
    rng: StdRng,
    verbose: bool,
}

impl MatchRunner {
    pub fn new(config: GameConfig, player0: PlayerConfig, player1: PlayerConfig) -> Self {
        let players = [
            Player::new("Player_0", player0, &config),
            Player::new("Player_1", player1, &config),
        ];
        Self {
            config,
            players,
            book: None,
            rng: StdRng::from_entropy(),
            verbose: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Print boards and running scores to stdout.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Start both engines and load the opening book.
    pub fn start(&mut self) -> Result<(), MatchError> {
        for player in &self.players {
            player.engine.start().map_err(|source| MatchError::Start {
                label: player.label().to_string(),
                path: player.config.path.clone(),
                source,
            })?;
        }

        if let Some(path) = &self.config.opening_book_path {
            let mut book = OpeningBook::load(path)?;
            book.shuffle(&mut self.rng);
            info!(entries = book.len(), "opening book ready");
            self.book = Some(book);
        }
        Ok(())
    }

    /// Play `games` games. The first error suspends the rest of the series.
    pub fn run(&mut self, games: u32) -> Result<(), MatchError> {
        let log_path = self.config.game_log_path.clone();
        let mut log = File::create(&log_path).map_err(|source| MatchError::Output {
            path: log_path.clone(),
            source,
        })?;

        if self.verbose {
            println!(
                "Game start:\t{} vs {}",
                self.players[0].engine.name(),
                self.players[1].engine.name()
            );
        }

        let reuse = self.config.swap_player && self.config.use_same_position_when_swap;
        let mut start = Position::startpos();
        for game_id in 0..games {
            if !reuse || game_id % 2 == 0 {
                start = self.initial_position()?;
            }
            let black = if self.config.swap_player && game_id % 2 == 1 { 1 } else { 0 };

            if self.verbose {
                println!("Game: {game_id}");
                println!("Initial position:\n{start}");
            }
            let summary = self.play_game(&start, black)?;

            writeln!(log, "{}", summary.record.to_ggf())
                .and_then(|_| log.flush())
                .map_err(|source| MatchError::Output {
                    path: log_path.clone(),
                    source,
                })?;
            self.save_stats()?;

            if self.verbose {
                println!("////////////////////");
                for player in &self.players {
                    println!("{}: {}", player.engine.name(), player.stats.summary());
                }
                println!("////////////////////");
            }
        }
        Ok(())
    }

    fn initial_position(&mut self) -> Result<Position, MatchError> {
        match self.book.as_mut() {
            Some(book) => Ok(book.sample_position(
                self.config.min_initial_empties,
                self.config.max_initial_empties,
                &mut self.rng,
            )?),
            None => Ok(Position::startpos()),
        }
    }

    /// Play one game from `start` with `players[black]` as black, and record the result.
    pub fn play_game(&mut self, start: &Position, black: usize) -> Result<GameSummary, MatchError> {
        let seats = [black, 1 - black];
        let mut record = GameRecord::new(start.clone());
        record.black_name = self.players[seats[0]].engine.name();
        record.white_name = self.players[seats[1]].engine.name();
        record.black_time = self.players[seats[0]].config.thinking_time;
        record.white_time = self.players[seats[1]].config.thinking_time;

        for player in &self.players {
            player.engine.set_game_info(&record)?;
            player.engine.set_time(Color::Black, &record.black_time)?;
            player.engine.set_time(Color::White, &record.white_time)?;
            if let Some(level) = player.config.level {
                player.engine.set_level(level)?;
            }
        }
        info!(black = %record.black_name, white = %record.white_name, "game started");

        let mut pos = start.clone();
        while !pos.is_game_over() {
            let color = pos.side_to_move();
            let mover = &self.players[seats[color.idx()]];
            let think = mover.engine.think()?;
            let Some(mv) = think.mv else {
                warn!(engine = %mover.engine.name(), "engine returned no move");
                return Err(MatchError::NoMove {
                    engine: mover.engine.name(),
                });
            };
            if !pos.apply(mv) {
                warn!(engine = %mover.engine.name(), %mv, "illegal move");
                return Err(MatchError::IllegalMove {
                    engine: mover.engine.name(),
                    mv,
                });
            }
            record.moves.push((color, mv));
            debug!(%color, %mv, elapsed = ?think.elapsed, "move played");

            for player in &self.players {
                player.engine.send_move(mv)?;
            }
            if self.verbose {
                println!("\n{pos}\n(last move, elapsed) = ({mv}, {:?})", think.elapsed);
            }
        }

        let outcome = pos.winner().unwrap_or(Outcome::Draw);
        record.result = Some(pos.disc_diff());
        for color in [Color::Black, Color::White] {
            let result = match outcome {
                Outcome::Draw => GameResult::Draw,
                Outcome::Winner(winner) if winner == color => GameResult::Win,
                Outcome::Winner(_) => GameResult::Loss,
            };
            self.players[seats[color.idx()]].stats.record(color, result);
        }

        match outcome {
            Outcome::Draw => info!("game over: draw"),
            Outcome::Winner(color) => {
                info!(winner = %self.players[seats[color.idx()]].engine.name(), %color, "game over")
            }
        }
        if self.verbose {
            match outcome {
                Outcome::Draw => println!("Game over: draw."),
                Outcome::Winner(color) => println!(
                    "Game over: {} wins",
                    self.players[seats[color.idx()]].engine.name()
                ),
            }
        }

        Ok(GameSummary {
            record,
            position: pos,
            outcome,
        })
    }

    fn save_stats(&self) -> Result<(), MatchError> {
        let path = &self.config.stats_path;
        save_stats(&[&self.players[0].stats, &self.players[1].stats], path).map_err(|source| {
            MatchError::Output {
                path: path.clone(),
                source,
            }
        })
    }

    /// Ask both engines to quit, killing the ones that do not.
    pub fn shutdown(&self) {
        let timeout = self.config.quit_timeout();
        for player in &self.players {
            let quit = match player.engine.quit(timeout) {
                Ok(quit) => quit,
                Err(e) => {
                    warn!(engine = %player.engine.name(), "quit failed: {e}");
                    false
                }
            };
            if !quit && !player.engine.kill(timeout) {
                warn!(engine = %player.engine.name(), pid = ?player.engine.pid(), "engine could not be stopped");
            }
        }
    }
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
