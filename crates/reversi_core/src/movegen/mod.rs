//! Legal-move (mobility) and flipped-disc computation.
//!
//! Every routine works on the perspective-relative pair `(mover, opponent)`.
//! For each of the four axes the opponent run adjacent to a seed is grown by
//! doubling shifts, masked by [`Bitboard::NOT_EDGE_FILES`](crate::Bitboard::NOT_EDGE_FILES)
//! on every axis except the vertical one so that runs cannot wrap from one row
//! into the next.
//!
//! There are up to three implementations: a scalar one that runs everywhere,
//! and on x86_64 an SSE2 (narrow vector) and an AVX2 (wide vector) one. They
//! compute the same function; which one is used is decided once, on first use,
//! by probing the CPU.

use std::sync::OnceLock;

use crate::types::Square;

mod scalar;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod sse2;

pub use scalar::ScalarGenerator;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Generator;
#[cfg(target_arch = "x86_64")]
pub use sse2::Sse2Generator;

/// Horizontal and diagonal runs never include files A or H.
pub(crate) const EDGE_MASK: u64 = crate::Bitboard::NOT_EDGE_FILES.0;

/// Hardware tier of a [`MoveGenerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Scalar,
    NarrowVector,
    WideVector,
}

/// One implementation of move generation.
pub trait MoveGenerator: Send + Sync {
    fn tier(&self) -> Tier;

    /// Empty squares where the mover outflanks at least one opponent run.
    fn mobility(&self, mover: u64, opponent: u64) -> u64;

    /// Opponent discs flipped when the mover plays `sq`.
    fn flips(&self, mover: u64, opponent: u64, sq: Square) -> u64;
}

static GENERATOR: OnceLock<&'static dyn MoveGenerator> = OnceLock::new();

#[cfg(target_arch = "x86_64")]
fn detect() -> &'static dyn MoveGenerator {
    static SSE2: Sse2Generator = Sse2Generator::new();
    match Avx2Generator::detect() {
        Some(gen) => {
            let gen: &'static Avx2Generator = Box::leak(Box::new(gen));
            gen
        }
        None => &SSE2,
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn detect() -> &'static dyn MoveGenerator {
    &ScalarGenerator
}

/// The generator selected for this CPU. The probe runs once per process.
pub fn generator() -> &'static dyn MoveGenerator {
    *GENERATOR.get_or_init(detect)
}

/// Every generator this CPU can run, lowest tier first.
pub fn available_generators() -> Vec<Box<dyn MoveGenerator>> {
    #[allow(unused_mut)]
    let mut gens: Vec<Box<dyn MoveGenerator>> = vec![Box::new(ScalarGenerator)];
    #[cfg(target_arch = "x86_64")]
    {
        gens.push(Box::new(Sse2Generator::new()));
        if let Some(gen) = Avx2Generator::detect() {
            gens.push(Box::new(gen));
        }
    }
    gens
}

#[inline]
pub fn mobility(mover: u64, opponent: u64) -> u64 {
    generator().mobility(mover, opponent)
}

#[inline]
pub fn flips(mover: u64, opponent: u64, sq: Square) -> u64 {
    generator().flips(mover, opponent, sq)
}

#[cfg(test)]
mod movegen_tests;
