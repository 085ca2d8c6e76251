//! Portable implementation: one 64-bit word per direction.

use super::{MoveGenerator, Tier, EDGE_MASK};
use crate::types::Square;

/// (shift, run mask) for the four axes: horizontal, vertical, A1-H8 and A8-H1 diagonals.
const AXES: [(u32, u64); 4] = [(1, EDGE_MASK), (8, !0), (9, EDGE_MASK), (7, EDGE_MASK)];

#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarGenerator;

/// Opponent run reached from `seed` stepping towards higher squares.
/// Shift distance doubles (s, 2s, 4s) and the run mask is narrowed alongside it.
#[inline(always)]
fn run_up(seed: u64, mask: u64, shift: u32) -> u64 {
    let mut run = mask & (seed << shift);
    run |= mask & (run << shift);
    let pre = mask & (mask << shift);
    run |= pre & (run << (2 * shift));
    let pre2 = pre & (pre << (2 * shift));
    run | (pre2 & (run << (4 * shift)))
}

#[inline(always)]
fn run_down(seed: u64, mask: u64, shift: u32) -> u64 {
    let mut run = mask & (seed >> shift);
    run |= mask & (run >> shift);
    let pre = mask & (mask >> shift);
    run |= pre & (run >> (2 * shift));
    let pre2 = pre & (pre >> (2 * shift));
    run | (pre2 & (run >> (4 * shift)))
}

pub(crate) fn mobility(p: u64, o: u64) -> u64 {
    let mut moves = 0;
    for (shift, mask) in AXES {
        let masked_o = o & mask;
        moves |= run_up(p, masked_o, shift) << shift;
        moves |= run_down(p, masked_o, shift) >> shift;
    }
    moves & !(p | o)
}

pub(crate) fn flips(p: u64, o: u64, sq: Square) -> u64 {
    let x = sq.bit();
    let mut flipped = 0;
    for (shift, mask) in AXES {
        let masked_o = o & mask;

        let up = run_up(x, masked_o, shift);
        if p & (up << shift) != 0 {
            flipped |= up;
        }

        let down = run_down(x, masked_o, shift);
        if p & (down >> shift) != 0 {
            flipped |= down;
        }
    }
    flipped
}

impl MoveGenerator for ScalarGenerator {
    fn tier(&self) -> Tier {
        Tier::Scalar
    }

    fn mobility(&self, mover: u64, opponent: u64) -> u64 {
        mobility(mover, opponent)
    }

    fn flips(&self, mover: u64, opponent: u64, sq: Square) -> u64 {
        flips(mover, opponent, sq)
    }
}
