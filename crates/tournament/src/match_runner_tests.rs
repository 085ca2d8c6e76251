#![cfg(unix)]

use std::fs;
use std::path::Path;

use nboard::EngineState;
use reversi_core::Square;

use super::*;
use crate::stats::load_stats;

/// Shell engine answering `ping` and replying to `go` with `on_go`.
fn scripted(on_go: &str) -> PlayerConfig {
    let script = format!(
        r#"set -f
while read -r l; do
  set -- $l
  case "$1" in
    ping) echo "pong $2" ;;
    go) {on_go} ;;
    quit) exit 0 ;;
  esac
done"#
    );
    PlayerConfig {
        path: PathBuf::from("/bin/sh"),
        args: vec!["-c".to_string(), script],
        level: Some(1),
        ..Default::default()
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("match-{}-{}", std::process::id(), name))
}

/// Black to move with A1 as the only empty square; A1 flips B1 and fills the board.
fn one_move_left() -> Position {
    let board = format!("-O{}", "*".repeat(62));
    Position::from_board_string(&board, Color::Black).unwrap()
}

fn runner(config: GameConfig, p0: PlayerConfig, p1: PlayerConfig) -> MatchRunner {
    let mut runner = MatchRunner::new(config, p0, p1).with_seed(11).verbose(false);
    runner.start().unwrap();
    runner
}

#[test]
fn test_single_game_updates_stats_by_colour() {
    let mut runner = runner(
        GameConfig::default(),
        scripted(r#"echo "=== A1""#),
        scripted(r#"echo "=== A1""#),
    );

    let summary = runner.play_game(&one_move_left(), 1).unwrap();
    assert_eq!(summary.outcome, Outcome::Winner(Color::Black));
    assert_eq!(summary.record.moves, vec![(Color::Black, Move::Place(Square::A1))]);
    assert_eq!(summary.record.result, Some(64));
    assert!(summary.position.is_game_over());

    let [p0, p1] = runner.players();
    assert_eq!(p1.stats.wins, [1, 0]);
    assert_eq!(p0.stats.losses, [0, 1]);
    assert_eq!(p0.stats.total_games() + p1.stats.total_games(), 2);
    runner.shutdown();
}

#[test]
fn test_series_swaps_colours_and_writes_results() {
    let book = temp_path("book.txt");
    fs::write(&book, format!("-O{} *\n", "*".repeat(62))).unwrap();
    let log = temp_path("game.ggf");
    let stats = temp_path("stats.json");
    let config = GameConfig {
        opening_book_path: Some(book.clone()),
        min_initial_empties: 1,
        max_initial_empties: 1,
        game_log_path: log.clone(),
        stats_path: stats.clone(),
        quit_timeout_ms: 5_000,
        ..Default::default()
    };

    let mut runner = runner(
        config,
        scripted(r#"echo "=== a1/+64""#),
        scripted(r#"echo "=== A1""#),
    );
    runner.run(2).unwrap();
    runner.shutdown();

    for player in runner.players() {
        assert_eq!(player.stats.wins, [1, 0]);
        assert_eq!(player.stats.losses, [0, 1]);
        assert_eq!(player.engine.state(), EngineState::Quit);
    }

    let games = fs::read_to_string(&log).unwrap();
    let games: Vec<&str> = games.lines().collect();
    assert_eq!(games.len(), 2);
    for game in &games {
        assert!(game.starts_with("(;GM[Othello]"));
        assert!(game.contains("RE[+64.00]"));
        assert!(game.ends_with("B[a1];)"));
        let record = GameRecord::parse_ggf(game).unwrap();
        assert_eq!(record.start, one_move_left());
    }

    let saved = load_stats(&stats).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].label, "Player_0");
    assert_eq!(saved[1].total_games(), 2);

    for path in [book, log, stats] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn test_illegal_move_suspends_game() {
    let mut runner = runner(
        GameConfig::default(),
        scripted(r#"echo "=== H8""#),
        scripted(r#"echo "=== H8""#),
    );
    match runner.play_game(&Position::startpos(), 0) {
        Err(MatchError::IllegalMove { engine, mv }) => {
            assert_eq!(engine, "sh");
            assert_eq!(mv, Move::Place(Square::H8));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(runner.players()[0].stats.total_games(), 0);
    runner.shutdown();
}

#[test]
fn test_engine_death_suspends_game() {
    let mut runner = runner(GameConfig::default(), scripted("exit 1"), scripted(":"));
    assert!(matches!(
        runner.play_game(&Position::startpos(), 0),
        Err(MatchError::NoMove { .. })
    ));
    let engine = &runner.players()[0].engine;
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while engine.state() != EngineState::Crashed && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(engine.state(), EngineState::Crashed);
    runner.shutdown();
}

#[test]
fn test_start_failure_names_player() {
    let missing = PlayerConfig {
        path: PathBuf::from("/nonexistent/engine"),
        ..Default::default()
    };
    let mut runner = MatchRunner::new(GameConfig::default(), scripted(":"), missing).verbose(false);
    match runner.start() {
        Err(MatchError::Start { label, path, .. }) => {
            assert_eq!(label, "Player_1");
            assert_eq!(path, Path::new("/nonexistent/engine"));
        }
        other => panic!("unexpected {other:?}"),
    }
    runner.shutdown();
}
