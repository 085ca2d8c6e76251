//! NBoard command vocabulary and reply parsing.

use lazy_static::lazy_static;
use regex::Regex;

use reversi_core::{Color, GameRecord, GameTime, Move};

use crate::error::EngineError;

pub const NBOARD_VERSION: u32 = 2;

/// Pattern of the reply to `go`. The move follows, optionally annotated after `/`.
pub const THINK_REPLY: &str = r"^\s*===";

lazy_static! {
    static ref MYNAME: Regex = Regex::new(r"(?i)^\s*set\s+myname\s+(\S+)").unwrap();
}

pub fn handshake() -> String {
    format!("nboard {NBOARD_VERSION}")
}

pub fn ping(n: u64) -> String {
    format!("ping {n}")
}

pub fn pong_pattern(n: u64) -> String {
    format!(r"^\s*pong\s+{n}\b")
}

pub fn go() -> &'static str {
    "go"
}

pub fn quit() -> &'static str {
    "quit"
}

pub fn set_time(color: Color, time: &GameTime) -> String {
    format!(
        "set time {color} main {} inc {} byoyomi {}",
        time.main_ms, time.increment_ms, time.byoyomi_ms
    )
}

pub fn set_depth(depth: u32) -> String {
    format!("set depth {depth}")
}

pub fn set_game(record: &GameRecord) -> String {
    format!("set game {}", record.to_ggf())
}

pub fn move_played(mv: Move) -> String {
    format!("move {mv}")
}

/// `=== F5/+4.00` gives F5; everything after the first `/` is dropped.
pub fn parse_think_reply(line: &str) -> Result<Move, EngineError> {
    let body = line
        .trim_start()
        .strip_prefix("===")
        .ok_or_else(|| EngineError::Protocol(format!("not a move reply: \"{line}\"")))?;
    let token = body
        .split_whitespace()
        .next()
        .and_then(|t| t.split('/').next())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| EngineError::Protocol(format!("move reply without a move: \"{line}\"")))?;
    token
        .parse()
        .map_err(|_| EngineError::Protocol(format!("invalid move \"{token}\" in \"{line}\"")))
}

/// Name announced by an unsolicited `set myname <name>` line.
pub fn parse_myname(line: &str) -> Option<&str> {
    MYNAME
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
