//! Opening book: start positions with a move sequence to play into.
//!
//! One entry per line, `<64 squares> <side to move> [moves]`, where squares
//! use `*` for black, `O` for white and `-` for empty, and moves are
//! concatenated coordinates such as `F5D6C3`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use reversi_core::{Color, Move, Position, Square};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("cannot read opening book {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("opening book line {line}: {reason}")]
    Format { line: usize, reason: String },
    #[error("opening book is empty")]
    Empty,
    #[error("no opening book position has between {min} and {max} empty squares")]
    NoFit { min: u32, max: u32 },
    #[error("book move {mv} is illegal in\n{position}")]
    IllegalMove { mv: Move, position: Position },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookItem {
    pub position: Position,
    pub moves: Vec<Square>,
}

impl BookItem {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut fields = line.split_whitespace();
        let board = fields.next().ok_or("missing board")?;
        let side = fields.next().ok_or("missing side to move")?;

        let side = match side {
            "*" => Color::Black,
            "O" => Color::White,
            other => return Err(format!("side to move must be '*' or 'O', found \"{other}\"")),
        };
        let position = Position::from_board_string(board, side).map_err(|e| e.to_string())?;

        let moves = match fields.next() {
            None => Vec::new(),
            Some(text) => {
                if text.len() % 2 != 0 || !text.is_ascii() {
                    return Err(format!("cannot split \"{text}\" into coordinates"));
                }
                (0..text.len())
                    .step_by(2)
                    .map(|i| text[i..i + 2].parse::<Square>().map_err(|e| e.to_string()))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Self { position, moves })
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    items: Vec<BookItem>,
    next: usize,
}

impl OpeningBook {
    pub fn load(path: &Path) -> Result<Self, BookError> {
        let text = fs::read_to_string(path).map_err(|source| BookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let book = Self::parse(&text)?;
        debug!(path = %path.display(), entries = book.len(), "opening book loaded");
        Ok(book)
    }

    /// Blank lines are skipped; line numbers in errors are 1-based.
    pub fn parse(text: &str) -> Result<Self, BookError> {
        let items = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                BookItem::parse(line).map_err(|reason| BookError::Format {
                    line: idx + 1,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);
        self.next = 0;
    }

    /// Entries in order, wrapping around at the end.
    pub fn next_item(&mut self) -> Option<&BookItem> {
        if self.items.is_empty() {
            return None;
        }
        let idx = self.next % self.items.len();
        self.next = self.next.wrapping_add(1);
        Some(&self.items[idx])
    }

    /// Play into the next entry that can reach `min..=max` empty squares,
    /// stopping after a random number of its moves within that range.
    ///
    /// A pass owed after the last sampled move is left for the engine to play.
    pub fn sample_position<R: Rng + ?Sized>(
        &mut self,
        min: u32,
        max: u32,
        rng: &mut R,
    ) -> Result<Position, BookError> {
        if self.items.is_empty() {
            return Err(BookError::Empty);
        }
        if min > max {
            return Err(BookError::NoFit { min, max });
        }

        let fits = |item: &BookItem| {
            let empties = item.position.empty_count();
            empties >= min && empties.saturating_sub(item.moves.len() as u32) <= max
        };
        let item = (0..self.items.len())
            .filter_map(|_| self.next_item().cloned())
            .find(|item| fits(item))
            .ok_or(BookError::NoFit { min, max })?;

        let empties = item.position.empty_count();
        let fewest = empties.saturating_sub(max) as usize;
        let most = ((empties - min) as usize).min(item.moves.len());
        if fewest > most {
            return Err(BookError::NoFit { min, max });
        }
        let count = rng.gen_range(fewest..=most);

        let mut position = item.position.clone();
        for &sq in &item.moves[..count] {
            if position.can_pass() {
                position.pass();
            }
            if !position.apply(Move::Place(sq)) {
                return Err(BookError::IllegalMove {
                    mv: Move::Place(sq),
                    position,
                });
            }
        }
        Ok(position)
    }
}

#[cfg(test)]
#[path = "opening_book_tests.rs"]
mod opening_book_tests;
