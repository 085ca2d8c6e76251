//! Random Move NBoard Engine
//!
//! Answers the NBoard protocol on stdin/stdout and picks uniformly among the
//! legal moves. Useful for:
//! - Exercising the game server end to end
//! - Baseline comparisons (any real engine should easily beat this)

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use reversi_core::{GameRecord, Move, Position};

pub const ENGINE_NAME: &str = "Random";

/// Whether the command loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct RandomEngine {
    pos: Position,
    rng: StdRng,
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            pos: Position::startpos(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            pos: Position::startpos(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// A random legal move, `PA` when passing is forced or the game is over.
    pub fn choose_move(&mut self) -> Move {
        self.pos
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Move::Pass)
    }

    /// Handle one protocol line, writing any reply to `out`.
    pub fn handle(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(Flow::Continue);
        };

        match cmd {
            "nboard" => {
                writeln!(out, "set myname {ENGINE_NAME}")?;
            }
            "ping" => {
                writeln!(out, "pong {}", parts.next().unwrap_or("0"))?;
            }
            "set" => match parts.next() {
                Some("game") => {
                    let ggf = line.splitn(3, char::is_whitespace).nth(2).unwrap_or("").trim();
                    match GameRecord::parse_ggf(ggf).and_then(|r| r.final_position()) {
                        Ok(pos) => self.pos = pos,
                        Err(e) => warn!("ignoring game: {e}"),
                    }
                }
                // depth, time and contempt do not matter to a random player
                _ => {}
            },
            "move" => {
                let token = parts.next().and_then(|t| t.split('/').next()).unwrap_or("");
                match token.parse::<Move>() {
                    Ok(mv) => self.play(mv),
                    Err(e) => warn!("ignoring move: {e}"),
                }
            }
            "go" => {
                let mv = self.choose_move();
                debug!(%mv, "chosen");
                writeln!(out, "=== {mv}")?;
            }
            "quit" => return Ok(Flow::Quit),
            _ => debug!(line, "unknown command"),
        }
        out.flush()?;
        Ok(Flow::Continue)
    }

    /// Apply a move announced by the server. A placement sent while the side to
    /// move has to pass implies the pass.
    fn play(&mut self, mv: Move) {
        if mv != Move::Pass && self.pos.can_pass() {
            self.pos.pass();
        }
        if !self.pos.apply(mv) {
            warn!(%mv, "illegal move in\n{}", self.pos);
        }
    }
}
