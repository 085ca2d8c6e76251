//! Wide-vector implementation (AVX2): the four axes ride in the four 64-bit
//! lanes of one 256-bit register, with per-lane variable shifts.

use std::arch::x86_64::*;

use super::{MoveGenerator, Tier, EDGE_MASK};
use crate::types::Square;

/// Proof that the running CPU supports AVX2. Only [`Avx2Generator::detect`] creates one.
#[derive(Clone, Copy, Debug)]
pub struct Avx2Generator {
    _private: (),
}

impl Avx2Generator {
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            Some(Self { _private: () })
        } else {
            None
        }
    }
}

// Lane order (0..3): horizontal, vertical, A1-H8 diagonal, A8-H1 diagonal.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn axis_shifts() -> __m256i {
    _mm256_set_epi64x(7, 9, 8, 1)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn axis_masks() -> __m256i {
    _mm256_set_epi64x(EDGE_MASK as i64, EDGE_MASK as i64, -1, EDGE_MASK as i64)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn horizontal_or(v: __m256i) -> u64 {
    let v2 = _mm_or_si128(_mm256_castsi256_si128(v), _mm256_extracti128_si256(v, 1));
    _mm_cvtsi128_si64(_mm_or_si128(v2, _mm_unpackhi_epi64(v2, v2))) as u64
}

#[target_feature(enable = "avx2")]
unsafe fn mobility(p: u64, o: u64) -> u64 {
    let sh = axis_shifts();
    let sh2 = _mm256_add_epi64(sh, sh);

    let pp = _mm256_set1_epi64x(p as i64);
    let mo = _mm256_and_si256(_mm256_set1_epi64x(o as i64), axis_masks());

    let pre_up = _mm256_and_si256(mo, _mm256_sllv_epi64(mo, sh));
    let pre_down = _mm256_srlv_epi64(pre_up, sh);

    let mut up = _mm256_and_si256(mo, _mm256_sllv_epi64(pp, sh));
    let mut down = _mm256_and_si256(mo, _mm256_srlv_epi64(pp, sh));
    up = _mm256_or_si256(up, _mm256_and_si256(mo, _mm256_sllv_epi64(up, sh)));
    down = _mm256_or_si256(down, _mm256_and_si256(mo, _mm256_srlv_epi64(down, sh)));
    up = _mm256_or_si256(up, _mm256_and_si256(pre_up, _mm256_sllv_epi64(up, sh2)));
    down = _mm256_or_si256(down, _mm256_and_si256(pre_down, _mm256_srlv_epi64(down, sh2)));
    up = _mm256_or_si256(up, _mm256_and_si256(pre_up, _mm256_sllv_epi64(up, sh2)));
    down = _mm256_or_si256(down, _mm256_and_si256(pre_down, _mm256_srlv_epi64(down, sh2)));

    let moves = _mm256_or_si256(_mm256_sllv_epi64(up, sh), _mm256_srlv_epi64(down, sh));
    horizontal_or(moves) & !(p | o)
}

#[target_feature(enable = "avx2")]
unsafe fn flips(p: u64, o: u64, sq: Square) -> u64 {
    let sh = axis_shifts();
    let sh2 = _mm256_add_epi64(sh, sh);

    let xx = _mm256_set1_epi64x(sq.bit() as i64);
    let pp = _mm256_set1_epi64x(p as i64);
    let mo = _mm256_and_si256(_mm256_set1_epi64x(o as i64), axis_masks());

    let pre_up = _mm256_and_si256(mo, _mm256_sllv_epi64(mo, sh));
    let pre_down = _mm256_srlv_epi64(pre_up, sh);

    let mut up = _mm256_and_si256(mo, _mm256_sllv_epi64(xx, sh));
    let mut down = _mm256_and_si256(mo, _mm256_srlv_epi64(xx, sh));
    up = _mm256_or_si256(up, _mm256_and_si256(mo, _mm256_sllv_epi64(up, sh)));
    down = _mm256_or_si256(down, _mm256_and_si256(mo, _mm256_srlv_epi64(down, sh)));
    up = _mm256_or_si256(up, _mm256_and_si256(pre_up, _mm256_sllv_epi64(up, sh2)));
    down = _mm256_or_si256(down, _mm256_and_si256(pre_down, _mm256_srlv_epi64(down, sh2)));
    up = _mm256_or_si256(up, _mm256_and_si256(pre_up, _mm256_sllv_epi64(up, sh2)));
    down = _mm256_or_si256(down, _mm256_and_si256(pre_down, _mm256_srlv_epi64(down, sh2)));

    // A run only flips if a mover disc sits right after it.
    let zero = _mm256_setzero_si256();
    let outflank_up = _mm256_and_si256(pp, _mm256_sllv_epi64(up, sh));
    let outflank_down = _mm256_and_si256(pp, _mm256_srlv_epi64(down, sh));
    up = _mm256_andnot_si256(_mm256_cmpeq_epi64(outflank_up, zero), up);
    down = _mm256_andnot_si256(_mm256_cmpeq_epi64(outflank_down, zero), down);

    horizontal_or(_mm256_or_si256(up, down))
}

impl MoveGenerator for Avx2Generator {
    fn tier(&self) -> Tier {
        Tier::WideVector
    }

    fn mobility(&self, mover: u64, opponent: u64) -> u64 {
        // SAFETY: an Avx2Generator only exists after a successful AVX2 probe.
        unsafe { mobility(mover, opponent) }
    }

    fn flips(&self, mover: u64, opponent: u64, sq: Square) -> u64 {
        // SAFETY: as above.
        unsafe { flips(mover, opponent, sq) }
    }
}
