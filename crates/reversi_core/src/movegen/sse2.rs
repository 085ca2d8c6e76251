//! Narrow-vector implementation (SSE2, always present on x86_64).
//!
//! Horizontal and vertical runs are computed in scalar registers. The two
//! diagonals share one 128-bit register: lane 0 holds the board, lane 1 the
//! board mirrored top-to-bottom (a byte swap). A left shift by 7 or 9 in the
//! mirrored lane walks the board downwards, so each vector op covers both
//! senses of a diagonal pair at once.

use std::arch::x86_64::*;

use super::{MoveGenerator, Tier, EDGE_MASK};
use crate::types::Square;

#[derive(Clone, Copy, Debug)]
pub struct Sse2Generator {
    _private: (),
}

impl Sse2Generator {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Sse2Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
unsafe fn pair(lo: u64, hi: u64) -> __m128i {
    _mm_set_epi64x(hi as i64, lo as i64)
}

#[inline(always)]
unsafe fn lanes(v: __m128i) -> (u64, u64) {
    let lo = _mm_cvtsi128_si64(v) as u64;
    let hi = _mm_cvtsi128_si64(_mm_unpackhi_epi64(v, v)) as u64;
    (lo, hi)
}

#[inline(always)]
fn keep_outflanked(run: u64, outflank: u64) -> u64 {
    if outflank == 0 {
        0
    } else {
        run
    }
}

#[target_feature(enable = "sse2")]
unsafe fn mobility(p: u64, o: u64) -> u64 {
    let masked_o = o & EDGE_MASK;
    let p2 = pair(p, p.swap_bytes());
    let mo2 = pair(masked_o, masked_o.swap_bytes());

    // Towards higher squares: diagonal 7 (and 9 in the mirrored lane), file step 1, rank step 8.
    let mut prefix = _mm_and_si128(mo2, _mm_slli_epi64(mo2, 7));
    let mut prefix1 = masked_o & (masked_o << 1);
    let mut prefix8 = o & (o << 8);

    let mut flip = _mm_and_si128(mo2, _mm_slli_epi64(p2, 7));
    let mut flip1 = masked_o & (p << 1);
    let mut flip8 = o & (p << 8);
    flip = _mm_or_si128(flip, _mm_and_si128(mo2, _mm_slli_epi64(flip, 7)));
    flip1 |= masked_o & (flip1 << 1);
    flip8 |= o & (flip8 << 8);
    flip = _mm_or_si128(flip, _mm_and_si128(prefix, _mm_slli_epi64(flip, 14)));
    flip1 |= prefix1 & (flip1 << 2);
    flip8 |= prefix8 & (flip8 << 16);
    flip = _mm_or_si128(flip, _mm_and_si128(prefix, _mm_slli_epi64(flip, 14)));
    flip1 |= prefix1 & (flip1 << 2);
    flip8 |= prefix8 & (flip8 << 16);

    let mut moves2 = _mm_slli_epi64(flip, 7);
    let mut moves = (flip1 << 1) | (flip8 << 8);

    // Towards lower squares.
    prefix = _mm_and_si128(mo2, _mm_slli_epi64(mo2, 9));
    prefix1 >>= 1;
    prefix8 >>= 8;

    flip = _mm_and_si128(mo2, _mm_slli_epi64(p2, 9));
    flip1 = masked_o & (p >> 1);
    flip8 = o & (p >> 8);
    flip = _mm_or_si128(flip, _mm_and_si128(mo2, _mm_slli_epi64(flip, 9)));
    flip1 |= masked_o & (flip1 >> 1);
    flip8 |= o & (flip8 >> 8);
    flip = _mm_or_si128(flip, _mm_and_si128(prefix, _mm_slli_epi64(flip, 18)));
    flip1 |= prefix1 & (flip1 >> 2);
    flip8 |= prefix8 & (flip8 >> 16);
    flip = _mm_or_si128(flip, _mm_and_si128(prefix, _mm_slli_epi64(flip, 18)));
    flip1 |= prefix1 & (flip1 >> 2);
    flip8 |= prefix8 & (flip8 >> 16);

    moves2 = _mm_or_si128(moves2, _mm_slli_epi64(flip, 9));
    moves |= (flip1 >> 1) | (flip8 >> 8);

    let (lo, hi) = lanes(moves2);
    (moves | lo | hi.swap_bytes()) & !(p | o)
}

#[target_feature(enable = "sse2")]
unsafe fn flips(p: u64, o: u64, sq: Square) -> u64 {
    let x = sq.bit();
    let masked_o = o & EDGE_MASK;
    let x2 = pair(x, x.swap_bytes());
    let p2 = pair(p, p.swap_bytes());
    let mo2 = pair(masked_o, masked_o.swap_bytes());

    let mut prefix = _mm_and_si128(mo2, _mm_slli_epi64(mo2, 7));
    let mut prefix1 = masked_o & (masked_o << 1);
    let mut prefix8 = o & (o << 8);

    let mut flip7 = _mm_and_si128(mo2, _mm_slli_epi64(x2, 7));
    let mut flip1_up = masked_o & (x << 1);
    let mut flip8_up = o & (x << 8);
    flip7 = _mm_or_si128(flip7, _mm_and_si128(mo2, _mm_slli_epi64(flip7, 7)));
    flip1_up |= masked_o & (flip1_up << 1);
    flip8_up |= o & (flip8_up << 8);
    flip7 = _mm_or_si128(flip7, _mm_and_si128(prefix, _mm_slli_epi64(flip7, 14)));
    flip1_up |= prefix1 & (flip1_up << 2);
    flip8_up |= prefix8 & (flip8_up << 16);
    flip7 = _mm_or_si128(flip7, _mm_and_si128(prefix, _mm_slli_epi64(flip7, 14)));
    flip1_up |= prefix1 & (flip1_up << 2);
    flip8_up |= prefix8 & (flip8_up << 16);

    prefix = _mm_and_si128(mo2, _mm_slli_epi64(mo2, 9));
    prefix1 >>= 1;
    prefix8 >>= 8;

    let mut flip9 = _mm_and_si128(mo2, _mm_slli_epi64(x2, 9));
    let mut flip1_down = masked_o & (x >> 1);
    let mut flip8_down = o & (x >> 8);
    flip9 = _mm_or_si128(flip9, _mm_and_si128(mo2, _mm_slli_epi64(flip9, 9)));
    flip1_down |= masked_o & (flip1_down >> 1);
    flip8_down |= o & (flip8_down >> 8);
    flip9 = _mm_or_si128(flip9, _mm_and_si128(prefix, _mm_slli_epi64(flip9, 18)));
    flip1_down |= prefix1 & (flip1_down >> 2);
    flip8_down |= prefix8 & (flip8_down >> 16);
    flip9 = _mm_or_si128(flip9, _mm_and_si128(prefix, _mm_slli_epi64(flip9, 18)));
    flip1_down |= prefix1 & (flip1_down >> 2);
    flip8_down |= prefix8 & (flip8_down >> 16);

    let (run7, run7_mirrored) = lanes(flip7);
    let (out7, out7_mirrored) = lanes(_mm_and_si128(p2, _mm_slli_epi64(flip7, 7)));
    let (run9, run9_mirrored) = lanes(flip9);
    let (out9, out9_mirrored) = lanes(_mm_and_si128(p2, _mm_slli_epi64(flip9, 9)));

    let straight = keep_outflanked(flip1_up, p & (flip1_up << 1))
        | keep_outflanked(flip8_up, p & (flip8_up << 8))
        | keep_outflanked(flip1_down, p & (flip1_down >> 1))
        | keep_outflanked(flip8_down, p & (flip8_down >> 8));
    let diagonal = keep_outflanked(run7, out7) | keep_outflanked(run9, out9);
    let mirrored = keep_outflanked(run7_mirrored, out7_mirrored)
        | keep_outflanked(run9_mirrored, out9_mirrored);

    straight | diagonal | mirrored.swap_bytes()
}

impl MoveGenerator for Sse2Generator {
    fn tier(&self) -> Tier {
        Tier::NarrowVector
    }

    fn mobility(&self, mover: u64, opponent: u64) -> u64 {
        // SAFETY: SSE2 is part of the x86_64 baseline.
        unsafe { mobility(mover, opponent) }
    }

    fn flips(&self, mover: u64, opponent: u64, sq: Square) -> u64 {
        // SAFETY: SSE2 is part of the x86_64 baseline.
        unsafe { flips(mover, opponent, sq) }
    }
}
