//! A Reversi position: perspective-relative board plus absolute side to move
//! and the history needed to take moves back.

use std::fmt;

use crate::bitboard::{Bitboard, BoardState};
use crate::movegen;
use crate::types::*;

/// A move as recorded in the history, with the discs it flipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub mv: Move,
    pub flipped: u64,
}

#[derive(Clone, Debug)]
pub struct Position {
    board: BoardState,
    side_to_move: Color,
    history: Vec<PlayedMove>,
}

impl PartialEq for Position {
    /// Two positions are equal when board and side to move match; history is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.side_to_move == other.side_to_move
    }
}

impl Eq for Position {}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// Standard cross start: white on D4/E5, black on E4/D5, black to move.
    pub fn startpos() -> Self {
        Self::new(
            BoardState::new(
                Square::E4.bit() | Square::D5.bit(),
                Square::D4.bit() | Square::E5.bit(),
            ),
            Color::Black,
        )
    }

    pub fn new(board: BoardState, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            history: Vec::with_capacity(64),
        }
    }

    /// Parse 64 characters in A1..H8 order: `*`/`X` black, `O` white, `-`/`.` empty.
    pub fn from_board_string(board: &str, side_to_move: Color) -> Result<Self, ParseError> {
        let chars: Vec<char> = board.trim().chars().collect();
        if chars.len() != SQUARE_COUNT as usize {
            return Err(ParseError::Board(format!(
                "expected {} squares, found {}",
                SQUARE_COUNT,
                chars.len()
            )));
        }

        let mut pos = Self::new(BoardState::default(), side_to_move);
        for (sq, ch) in Square::all().zip(chars) {
            match ch {
                '-' | '.' => {}
                _ => match Color::from_disc_char(ch) {
                    Some(color) => pos.put_disc(color, sq),
                    None => {
                        return Err(ParseError::Board(format!("unexpected '{ch}' at {sq}")));
                    }
                },
            }
        }
        Ok(pos)
    }

    /// Inverse of [`Position::from_board_string`], using `*`, `O` and `-`.
    pub fn to_board_string(&self) -> String {
        Square::all()
            .map(|sq| self.color_at(sq).map_or('-', Color::disc_char))
            .collect()
    }

    pub fn board(&self) -> BoardState {
        self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn opponent_color(&self) -> Color {
        self.side_to_move.other()
    }

    /// Changing the side to move swaps the perspective of the board.
    pub fn set_side_to_move(&mut self, color: Color) {
        if color != self.side_to_move {
            self.board.swap();
            self.side_to_move = color;
        }
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn empty_count(&self) -> u32 {
        self.board.empty_count()
    }

    pub fn disc_count(&self, color: Color) -> u32 {
        if color == self.side_to_move {
            self.board.mover_count()
        } else {
            self.board.opponent_count()
        }
    }

    pub fn owner_at(&self, sq: Square) -> Owner {
        if self.board.mover & sq.bit() != 0 {
            Owner::Mover
        } else if self.board.opponent & sq.bit() != 0 {
            Owner::Opponent
        } else {
            Owner::Empty
        }
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        match self.owner_at(sq) {
            Owner::Mover => Some(self.side_to_move),
            Owner::Opponent => Some(self.opponent_color()),
            Owner::Empty => None,
        }
    }

    pub fn put_disc(&mut self, color: Color, sq: Square) {
        if color == self.side_to_move {
            self.board.put_mover_disc(sq);
        } else {
            self.board.put_opponent_disc(sq);
        }
    }

    pub fn remove_disc(&mut self, sq: Square) {
        self.board.remove_disc(sq);
    }

    pub fn mobility(&self) -> Bitboard {
        Bitboard(movegen::mobility(self.board.mover, self.board.opponent))
    }

    fn opponent_mobility(&self) -> Bitboard {
        Bitboard(movegen::mobility(self.board.opponent, self.board.mover))
    }

    /// Mover cannot play but the opponent can.
    pub fn can_pass(&self) -> bool {
        self.mobility().is_empty() && !self.opponent_mobility().is_empty()
    }

    /// Neither side can play.
    pub fn is_game_over(&self) -> bool {
        self.mobility().is_empty() && self.opponent_mobility().is_empty()
    }

    /// Legal moves for the side to move; a lone `Pass` when passing is forced.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mobility = self.mobility();
        if mobility.is_empty() {
            return if self.can_pass() { vec![Move::Pass] } else { Vec::new() };
        }
        mobility.map(Move::Place).collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Pass => self.can_pass(),
            Move::Place(sq) => self.mobility().contains(sq),
        }
    }

    /// Play `mv` if legal. Returns false and leaves the position untouched otherwise.
    pub fn apply(&mut self, mv: Move) -> bool {
        if !self.is_legal(mv) {
            return false;
        }

        match mv {
            Move::Pass => self.pass(),
            Move::Place(sq) => {
                let flipped = movegen::flips(self.board.mover, self.board.opponent, sq);
                self.history.push(PlayedMove {
                    color: self.side_to_move,
                    mv,
                    flipped,
                });
                self.board.update(sq, flipped);
                self.side_to_move = self.opponent_color();
            }
        }
        true
    }

    /// Hand the turn over without placing a disc. Not checked for legality.
    pub fn pass(&mut self) {
        self.history.push(PlayedMove {
            color: self.side_to_move,
            mv: Move::Pass,
            flipped: 0,
        });
        self.board.swap();
        self.side_to_move = self.opponent_color();
    }

    /// Take back the last move or pass. Returns false when there is no history.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.history.pop() else {
            return false;
        };

        match last.mv {
            Move::Pass => self.board.swap(),
            Move::Place(sq) => self.board.undo(sq, last.flipped),
        }
        self.side_to_move = last.color;
        true
    }

    /// `None` while the game is still running.
    pub fn winner(&self) -> Option<Outcome> {
        if !self.is_game_over() {
            return None;
        }

        let mover = self.board.mover_count();
        let opponent = self.board.opponent_count();
        Some(match mover.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Winner(self.side_to_move),
            std::cmp::Ordering::Less => Outcome::Winner(self.opponent_color()),
            std::cmp::Ordering::Equal => Outcome::Draw,
        })
    }

    /// Black discs minus white discs.
    pub fn disc_diff(&self) -> i32 {
        self.disc_count(Color::Black) as i32 - self.disc_count(Color::White) as i32
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for file in 0..BOARD_SIZE {
            write!(f, " {}", (b'A' + file) as char)?;
        }
        for rank in 0..BOARD_SIZE {
            write!(f, "\n{}", rank + 1)?;
            for file in 0..BOARD_SIZE {
                let ch = match Square::from_file_rank(file, rank).and_then(|sq| self.color_at(sq)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
        }
        write!(
            f,
            "\n{} to move (X {} - O {})",
            self.side_to_move,
            self.disc_count(Color::Black),
            self.disc_count(Color::White)
        )
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
