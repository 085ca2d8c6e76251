use std::time::Instant;

use rayon::prelude::*;

use reversi_core::{perft, perft_divide, Color, Move, Position};

const FULL_PERFT_ENV: &str = "FULL_PERFT";

/// Leaf counts from the standard start position, passes counted as a ply.
const START_COUNTS: &[(u8, u64)] = &[
    (1, 4),
    (2, 12),
    (3, 56),
    (4, 244),
    (5, 1_396),
    (6, 8_200),
    (7, 55_092),
    (8, 390_216),
    (9, 3_005_288),
];

const NODE_LIMIT: u64 = 1_000_000;

#[test]
fn perft_from_start_position() {
    let full = std::env::var(FULL_PERFT_ENV).is_ok();

    START_COUNTS.par_iter().for_each(|&(depth, expected)| {
        if !full && expected > NODE_LIMIT {
            eprintln!(
                "Skipping depth {} (expected {} nodes), set {}=1 to run it.",
                depth, expected, FULL_PERFT_ENV
            );
            return;
        }
        let start = Instant::now();
        let mut pos = Position::startpos();
        let got = perft(&mut pos, depth);
        assert_eq!(
            got, expected,
            "Perft mismatch at depth {}: expected {}, got {}",
            depth, expected, got
        );
        assert_eq!(pos, Position::startpos(), "perft must leave the position untouched");
        eprintln!("depth {} ok ({:.2?})", depth, start.elapsed());
    });
}

#[test]
fn perft_divide_sums_to_perft() {
    let mut pos = Position::startpos();
    let divided = perft_divide(&mut pos, 5);
    assert_eq!(divided.len(), 4);
    let total: u64 = divided.iter().map(|(_, n)| n).sum();
    assert_eq!(total, perft(&mut pos, 5));
    // The start position is symmetric, every first move leads to the same tree.
    assert!(divided.iter().all(|(_, n)| *n == total / 4));
}

#[test]
fn perft_counts_forced_pass_as_a_ply() {
    // White has no move, black still does.
    let board = format!("*O{}", "-".repeat(62));
    let mut pos = Position::from_board_string(&board, Color::White).unwrap();
    assert_eq!(pos.legal_moves(), vec![Move::Pass]);
    assert_eq!(perft(&mut pos, 1), 1);
    assert_eq!(perft(&mut pos, 2), 1);
}

#[test]
fn perft_on_finished_game_is_one_leaf() {
    let board = format!("*{}O", "-".repeat(62));
    let mut pos = Position::from_board_string(&board, Color::Black).unwrap();
    assert!(pos.is_game_over());
    assert_eq!(perft(&mut pos, 3), 1);
}
