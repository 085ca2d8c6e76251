//! Generic Game Format records for finished and in-progress games.

use std::fmt::Write;

use chrono::{Local, NaiveDateTime};

use crate::position::Position;
use crate::time_control::GameTime;
use crate::types::*;

const DATE_FORMAT: &str = "%Y.%m.%d_%H:%M:%S";

#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub place: String,
    pub date: Option<NaiveDateTime>,
    pub black_name: String,
    pub white_name: String,
    pub black_time: GameTime,
    pub white_time: GameTime,
    pub start: Position,
    pub moves: Vec<(Color, Move)>,
    /// Black discs minus white discs once the game is over.
    pub result: Option<i32>,
}

impl GameRecord {
    pub fn new(start: Position) -> Self {
        Self {
            place: "NBoard-arena".to_string(),
            date: Some(Local::now().naive_local()),
            black_name: String::new(),
            white_name: String::new(),
            black_time: GameTime::default(),
            white_time: GameTime::default(),
            start,
            moves: Vec::new(),
            result: None,
        }
    }

    /// Replay the move list on top of the start position.
    pub fn final_position(&self) -> Result<Position, ParseError> {
        let mut pos = self.start.clone();
        for &(color, mv) in &self.moves {
            pos.set_side_to_move(color);
            if !pos.apply(mv) {
                return Err(ParseError::Record(format!("illegal move {mv} for {color}")));
            }
        }
        Ok(pos)
    }

    pub fn to_ggf(&self) -> String {
        let mut s = String::from("(;GM[Othello]");
        let _ = write!(s, "PC[{}]", tag_text(&self.place));
        if let Some(date) = self.date {
            let _ = write!(s, "DT[{}]", date.format(DATE_FORMAT));
        }
        let _ = write!(
            s,
            "PB[{}]PW[{}]",
            tag_text(&self.black_name),
            tag_text(&self.white_name)
        );
        match self.result {
            Some(diff) => {
                let _ = write!(s, "RE[{:+.2}]", diff as f64);
            }
            None => s.push_str("RE[?]"),
        }
        let _ = write!(s, "BT[{}]WT[{}]", self.black_time, self.white_time);
        let _ = write!(
            s,
            "TY[8]BO[8 {} {}]",
            self.start.to_board_string(),
            self.start.side_to_move().disc_char()
        );
        for (color, mv) in &self.moves {
            let tag = match color {
                Color::Black => 'B',
                Color::White => 'W',
            };
            let _ = write!(s, "{tag}[{}]", mv.to_string().to_ascii_lowercase());
        }
        s.push_str(";)");
        s
    }

    /// Read a record back. Only `BO` is required; unknown tags are ignored.
    pub fn parse_ggf(text: &str) -> Result<Self, ParseError> {
        let mut record = Self::new(Position::startpos());
        record.date = None;
        let mut start = None;

        for (tag, value) in tags(text)? {
            match tag {
                "PC" => record.place = value.to_string(),
                "DT" => record.date = NaiveDateTime::parse_from_str(value, DATE_FORMAT).ok(),
                "PB" => record.black_name = value.to_string(),
                "PW" => record.white_name = value.to_string(),
                "RE" => record.result = value.parse::<f64>().ok().map(|v| v.round() as i32),
                "BO" => start = Some(parse_board(value)?),
                "B" | "W" => {
                    let color = if tag == "B" { Color::Black } else { Color::White };
                    let token = value.split('/').next().unwrap_or_default();
                    record.moves.push((color, token.parse()?));
                }
                _ => {}
            }
        }

        record.start = start.ok_or_else(|| ParseError::Record("missing BO tag".to_string()))?;
        Ok(record)
    }
}

/// Tag values cannot hold brackets, so they are dropped.
fn tag_text(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '[' | ']')).collect()
}

/// `8 <64 squares> <side>`
fn parse_board(value: &str) -> Result<Position, ParseError> {
    let mut parts = value.split_whitespace();
    if parts.next() != Some("8") {
        return Err(ParseError::Record(format!("unsupported board \"{value}\"")));
    }
    let squares = parts
        .next()
        .ok_or_else(|| ParseError::Record("BO without squares".to_string()))?;
    let side = parts
        .next()
        .and_then(|s| s.chars().next())
        .ok_or_else(|| ParseError::Record("BO without side to move".to_string()))?;
    let side = Color::from_disc_char(side).ok_or(ParseError::SideToMove(side))?;
    Position::from_board_string(squares, side)
}

/// Split `NAME[value]` pairs out of a record body.
fn tags(text: &str) -> Result<Vec<(&str, &str)>, ParseError> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let name_start = rest[..open]
            .trim_end_matches(|c: char| c.is_ascii_uppercase())
            .len();
        let close = rest[open..]
            .find(']')
            .ok_or_else(|| ParseError::Record("unterminated tag".to_string()))?;
        out.push((&rest[name_start..open], &rest[open + 1..open + close]));
        rest = &rest[open + close + 1..];
    }
    Ok(out)
}

#[cfg(test)]
#[path = "ggf_tests.rs"]
mod ggf_tests;
