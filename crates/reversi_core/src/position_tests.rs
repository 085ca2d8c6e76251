use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::*;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

#[test]
fn test_startpos() {
    let pos = Position::startpos();
    assert_eq!(pos.side_to_move(), Color::Black);
    assert_eq!(pos.disc_count(Color::Black), 2);
    assert_eq!(pos.disc_count(Color::White), 2);
    assert_eq!(pos.empty_count(), 60);
    assert_eq!(pos.color_at(sq("D4")), Some(Color::White));
    assert_eq!(pos.color_at(sq("E4")), Some(Color::Black));
    assert_eq!(pos.owner_at(sq("E4")), Owner::Mover);
    assert_eq!(pos.owner_at(sq("A1")), Owner::Empty);

    let mut moves = pos.legal_moves();
    moves.sort_by_key(|m| m.square());
    let expected: Vec<Move> = ["D3", "C4", "F5", "E6"]
        .iter()
        .map(|s| Move::Place(sq(s)))
        .collect();
    assert_eq!(moves, expected);
}

#[test]
fn test_f5_flips_e5() {
    let mut pos = Position::startpos();
    assert!(pos.apply(Move::Place(Square::F5)));
    assert_eq!(pos.disc_count(Color::Black), 4);
    assert_eq!(pos.disc_count(Color::White), 1);
    assert_eq!(pos.color_at(Square::E5), Some(Color::Black));
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.history().len(), 1);
    assert_eq!(pos.history()[0].flipped, Square::E5.bit());
}

#[test]
fn test_illegal_move_is_rejected_without_change() {
    let mut pos = Position::startpos();
    let before = pos.clone();
    assert!(!pos.apply(Move::Place(Square::A1)));
    assert!(!pos.apply(Move::Place(Square::D4))); // occupied
    assert!(!pos.apply(Move::Pass));
    assert_eq!(pos, before);
    assert!(pos.history().is_empty());
}

#[test]
fn test_undo_on_empty_history() {
    let mut pos = Position::startpos();
    assert!(!pos.undo());
}

#[test]
fn test_apply_undo_round_trip_over_random_games() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let mut pos = Position::startpos();
        while !pos.is_game_over() {
            for mv in pos.legal_moves() {
                let before = pos.clone();
                assert!(pos.apply(mv), "{mv} should be legal");
                assert!(pos.undo());
                assert_eq!(pos.board(), before.board());
                assert_eq!(pos.side_to_move(), before.side_to_move());
                assert_eq!(pos.history().len(), before.history().len());
            }
            let mv = *pos.legal_moves().choose(&mut rng).unwrap();
            assert!(pos.apply(mv));
            assert_eq!(pos.board().mover & pos.board().opponent, 0);
        }
        assert!(pos.winner().is_some());
        assert!(pos.legal_moves().is_empty());
    }
}

#[test]
fn test_forced_pass() {
    // Black: A1. White: B1. White to move has nothing; black could play C1.
    let mut board = "-".repeat(64).into_bytes();
    board[0] = b'*';
    board[1] = b'O';
    let board = String::from_utf8(board).unwrap();
    let mut pos = Position::from_board_string(&board, Color::White).unwrap();

    assert!(pos.mobility().is_empty());
    assert!(pos.can_pass());
    assert!(!pos.is_game_over());
    assert_eq!(pos.legal_moves(), vec![Move::Pass]);

    assert!(pos.apply(Move::Pass));
    assert_eq!(pos.side_to_move(), Color::Black);
    assert!(pos.is_legal(Move::Place(sq("C1"))));

    assert!(pos.undo());
    assert_eq!(pos.side_to_move(), Color::White);
    assert!(pos.can_pass());
}

#[test]
fn test_winner_and_draw() {
    // Two lone discs that cannot capture each other: terminal, 1-1.
    let mut board = "-".repeat(64).into_bytes();
    board[0] = b'*';
    board[63] = b'O';
    let board = String::from_utf8(board).unwrap();
    let pos = Position::from_board_string(&board, Color::Black).unwrap();
    assert!(pos.is_game_over());
    assert_eq!(pos.winner(), Some(Outcome::Draw));

    let mut pos = pos;
    pos.put_disc(Color::White, sq("H7"));
    assert_eq!(pos.winner(), Some(Outcome::Winner(Color::White)));
    assert_eq!(pos.disc_diff(), -1);

    assert_eq!(Position::startpos().winner(), None);
}

#[test]
fn test_board_string() {
    let pos = Position::startpos();
    let s = pos.to_board_string();
    assert_eq!(s.len(), 64);
    assert_eq!(&s[24..40], "---O*------*O---");
    assert_eq!(Position::from_board_string(&s, Color::Black).unwrap(), pos);

    assert!(Position::from_board_string("---", Color::Black).is_err());
    let bad = format!("{}?", "-".repeat(63));
    assert!(Position::from_board_string(&bad, Color::Black).is_err());
}

#[test]
fn test_set_side_to_move_keeps_colours() {
    let mut pos = Position::startpos();
    pos.set_side_to_move(Color::White);
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.color_at(sq("D4")), Some(Color::White));
    assert_eq!(pos.owner_at(sq("D4")), Owner::Mover);
}

#[test]
fn test_display() {
    let text = Position::startpos().to_string();
    assert!(text.starts_with("  A B C D E F G H"));
    assert!(text.contains("4 . . . O X . . ."));
    assert!(text.contains("5 . . . X O . . ."));
    assert!(text.ends_with("black to move (X 2 - O 2)"));
}
