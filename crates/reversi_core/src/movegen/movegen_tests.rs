use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::Bitboard;

const DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Square-by-square walk, used as the reference the bit-parallel code must agree with.
fn naive_flips(p: u64, o: u64, sq: Square) -> u64 {
    let mut flipped = 0;
    for (df, dr) in DIRECTIONS {
        let mut run = 0;
        let mut f = sq.file() as i8 + df;
        let mut r = sq.rank() as i8 + dr;
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let bit = 1u64 << (r * 8 + f);
            if o & bit != 0 {
                run |= bit;
            } else {
                if p & bit != 0 {
                    flipped |= run;
                }
                break;
            }
            f += df;
            r += dr;
        }
    }
    flipped
}

fn naive_mobility(p: u64, o: u64) -> u64 {
    Square::all()
        .filter(|sq| (p | o) & sq.bit() == 0 && naive_flips(p, o, *sq) != 0)
        .fold(0, |acc, sq| acc | sq.bit())
}

fn random_board(rng: &mut StdRng) -> (u64, u64) {
    // Bias towards dense boards so long runs show up.
    let discs: u64 = rng.gen::<u64>() | rng.gen::<u64>();
    let owner: u64 = rng.gen();
    (discs & owner, discs & !owner)
}

fn start_position() -> (u64, u64) {
    (
        Square::E4.bit() | Square::D5.bit(),
        Square::D4.bit() | Square::E5.bit(),
    )
}

#[test]
fn test_start_position_mobility() {
    let (p, o) = start_position();
    let expected = Square::D3.bit() | Square::C4.bit() | Square::F5.bit() | Square::E6.bit();
    for gen in available_generators() {
        assert_eq!(gen.mobility(p, o), expected, "{:?}", gen.tier());
    }
}

#[test]
fn test_start_position_flips_f5() {
    let (p, o) = start_position();
    for gen in available_generators() {
        assert_eq!(gen.flips(p, o, Square::F5), Square::E5.bit(), "{:?}", gen.tier());
    }
}

#[test]
fn test_runs_do_not_wrap_across_rows() {
    // Mover on A2, opponent on H1: shifting A2 down by one lands on H1 without a mask.
    let p = "A2".parse::<Square>().unwrap().bit();
    let o = "H1".parse::<Square>().unwrap().bit();
    for gen in available_generators() {
        assert_eq!(gen.mobility(p, o), 0, "{:?}", gen.tier());
    }
}

#[test]
fn test_full_length_runs() {
    // A1 mover, B1..G1 opponent: H1 flips six discs.
    let p = Square::A1.bit();
    let o = 0x7E;
    let h1 = "H1".parse::<Square>().unwrap();
    for gen in available_generators() {
        assert_eq!(gen.mobility(p, o), h1.bit(), "{:?}", gen.tier());
        assert_eq!(gen.flips(p, o, h1), 0x7E, "{:?}", gen.tier());
    }

    // A1 mover, A2..A7 opponent: A8 flips the column.
    let o = 0x0001010101010100;
    let a8 = "A8".parse::<Square>().unwrap();
    for gen in available_generators() {
        assert_eq!(gen.flips(p, o, a8), o, "{:?}", gen.tier());
    }
}

#[test]
fn test_scalar_matches_reference() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..2_000 {
        let (p, o) = random_board(&mut rng);
        assert_eq!(ScalarGenerator.mobility(p, o), naive_mobility(p, o));
        for sq in Bitboard(!(p | o)) {
            assert_eq!(ScalarGenerator.flips(p, o, sq), naive_flips(p, o, sq), "{sq}");
        }
    }
}

#[test]
fn test_all_tiers_agree() {
    let gens = available_generators();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20_000 {
        let (p, o) = random_board(&mut rng);
        let expected = ScalarGenerator.mobility(p, o);
        for gen in &gens {
            assert_eq!(gen.mobility(p, o), expected, "{:?} {p:#x} {o:#x}", gen.tier());
        }
        for sq in Square::all() {
            let expected = ScalarGenerator.flips(p, o, sq);
            for gen in &gens {
                assert_eq!(gen.flips(p, o, sq), expected, "{:?} {sq}", gen.tier());
            }
        }
    }
}

#[test]
fn test_selected_generator_is_best_available() {
    let best = available_generators()
        .iter()
        .map(|gen| gen.tier())
        .max()
        .unwrap();
    assert_eq!(generator().tier(), best);
}
