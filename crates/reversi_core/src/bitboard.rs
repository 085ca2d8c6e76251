//! Bitboards and the perspective-relative board state.
//!
//! A bitboard is a 64-bit integer where each bit represents a square.
//! Bit 0 = A1, bit 7 = H1, ..., bit 63 = H8.
//!
//! [`BoardState`] holds two of them: the discs of the side to move ("mover")
//! and the discs of the other side ("opponent"). Nothing in here knows about
//! absolute colours; that translation happens in [`crate::Position`].

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

use crate::types::Square;

/// A set of squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);

    /// Everything except files A and H. Runs masked with this cannot wrap across a row edge.
    pub const NOT_EDGE_FILES: Bitboard = Bitboard(0x7E7E7E7E7E7E7E7E);

    #[inline(always)]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(sq.bit())
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 & sq.bit()) != 0
    }

    #[inline(always)]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Get and remove the least significant square.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let idx = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Square::new(idx)
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

/// Iterator over set squares, lowest first.
impl Iterator for Bitboard {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_lsb()
    }
}

/// Discs of the side to move and of its opponent. Invariant: `mover & opponent == 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoardState {
    pub mover: u64,
    pub opponent: u64,
}

impl BoardState {
    pub const fn new(mover: u64, opponent: u64) -> Self {
        debug_assert!(mover & opponent == 0);
        Self { mover, opponent }
    }

    #[inline(always)]
    pub const fn discs(self) -> u64 {
        self.mover | self.opponent
    }

    #[inline(always)]
    pub const fn empties(self) -> u64 {
        !self.discs()
    }

    pub const fn mover_count(self) -> u32 {
        self.mover.count_ones()
    }

    pub const fn opponent_count(self) -> u32 {
        self.opponent.count_ones()
    }

    pub const fn empty_count(self) -> u32 {
        self.empties().count_ones()
    }

    /// Place a mover disc at `sq`, flip `flipped`, and hand the turn over.
    #[inline(always)]
    pub fn update(&mut self, sq: Square, flipped: u64) {
        let mover = self.mover;
        self.mover = self.opponent ^ flipped;
        self.opponent = mover | sq.bit() | flipped;
    }

    /// Exact inverse of [`BoardState::update`] for the same arguments.
    #[inline(always)]
    pub fn undo(&mut self, sq: Square, flipped: u64) {
        let mover = self.mover;
        self.mover = self.opponent ^ (sq.bit() | flipped);
        self.opponent = mover | flipped;
    }

    #[inline(always)]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.mover, &mut self.opponent);
    }

    pub fn put_mover_disc(&mut self, sq: Square) {
        self.mover |= sq.bit();
        self.opponent &= !sq.bit();
    }

    pub fn put_opponent_disc(&mut self, sq: Square) {
        self.opponent |= sq.bit();
        self.mover &= !sq.bit();
    }

    pub fn remove_disc(&mut self, sq: Square) {
        self.mover &= !sq.bit();
        self.opponent &= !sq.bit();
    }
}

#[cfg(test)]
#[path = "bitboard_tests.rs"]
mod bitboard_tests;
