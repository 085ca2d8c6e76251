use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const BOARD_SIZE: u8 = 8;
pub const SQUARE_COUNT: u8 = BOARD_SIZE * BOARD_SIZE;

/// Errors raised while reading coordinates, boards or game records from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid coordinate \"{0}\"")]
    Coordinate(String),
    #[error("invalid board string: {0}")]
    Board(String),
    #[error("invalid side to move '{0}'")]
    SideToMove(char),
    #[error("invalid game record: {0}")]
    Record(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Disc character used by board strings and GGF (`*` black, `O` white).
    pub fn disc_char(self) -> char {
        match self {
            Color::Black => '*',
            Color::White => 'O',
        }
    }

    pub fn from_disc_char(c: char) -> Option<Color> {
        match c {
            '*' | 'X' | 'x' | 'B' | 'b' => Some(Color::Black),
            'O' | 'o' | 'W' | 'w' => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    /// Lower-case names, as the `set time` command expects them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

/// Owner of a square relative to the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Mover,
    Opponent,
    Empty,
}

/// A board square, 0..63. Bit `n` of a mask is square `n`: A1 = 0, H1 = 7, H8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const D3: Square = Square(19);
    pub const C4: Square = Square(26);
    pub const D4: Square = Square(27);
    pub const E4: Square = Square(28);
    pub const D5: Square = Square(35);
    pub const E5: Square = Square(36);
    pub const F5: Square = Square(37);
    pub const E6: Square = Square(44);
    pub const H8: Square = Square(63);

    pub const fn new(index: u8) -> Option<Square> {
        if index < SQUARE_COUNT {
            Some(Square(index))
        } else {
            None
        }
    }

    pub fn from_file_rank(file: u8, rank: u8) -> Option<Square> {
        if file < BOARD_SIZE && rank < BOARD_SIZE {
            Some(Square(rank * BOARD_SIZE + file))
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    pub const fn file(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    pub const fn rank(self) -> u8 {
        self.0 / BOARD_SIZE
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..SQUARE_COUNT).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'A' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.trim().as_bytes();
        if b.len() != 2 {
            return Err(ParseError::Coordinate(s.to_string()));
        }
        let f = b[0].to_ascii_lowercase();
        let r = b[1];
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return Err(ParseError::Coordinate(s.to_string()));
        }
        Ok(Square((r - b'1') * BOARD_SIZE + (f - b'a')))
    }
}

/// A move as it travels over the protocol: a disc placement or a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Square),
    Pass,
}

impl Move {
    pub const PASS_TOKEN: &'static str = "PA";

    pub fn square(self) -> Option<Square> {
        match self {
            Move::Place(sq) => Some(sq),
            Move::Pass => None,
        }
    }
}

impl From<Square> for Move {
    fn from(sq: Square) -> Self {
        Move::Place(sq)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place(sq) => sq.fmt(f),
            Move::Pass => f.write_str(Self::PASS_TOKEN),
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case(Self::PASS_TOKEN) || t.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }
        t.parse::<Square>()
            .map(Move::Place)
            .map_err(|_| ParseError::Coordinate(s.to_string()))
    }
}

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}
