use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use nboard::{EngineConfig, EngineState, NBoardEngine};
use reversi_core::{GameRecord, Move};
use tournament::{load_stats, GameConfig, MatchRunner, PlayerConfig};

const ENGINE: &str = env!("CARGO_BIN_EXE_random_nboard");
const TIMEOUT: Duration = Duration::from_secs(5);

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("random-nboard-{}-{}", std::process::id(), name))
}

#[test]
fn random_engine_speaks_nboard() {
    let engine = NBoardEngine::new(EngineConfig::new(ENGINE));
    engine.start().unwrap();

    let result = engine.think().unwrap();
    let mv = result.mv.expect("a move");
    assert!(matches!(mv, Move::Place(_)));
    // The announcement precedes the first pong.
    assert_eq!(engine.name(), "Random");

    engine.send_move(mv).unwrap();
    assert!(engine.quit(TIMEOUT).unwrap());
    assert_eq!(engine.state(), EngineState::Quit);
}

#[test]
fn random_engines_play_a_full_series() {
    let log = temp_path("game.ggf");
    let stats = temp_path("stats.json");
    let config = GameConfig {
        game_log_path: log.clone(),
        stats_path: stats.clone(),
        ..Default::default()
    };
    let player = || PlayerConfig {
        path: PathBuf::from(ENGINE),
        ..Default::default()
    };

    let mut runner = MatchRunner::new(config, player(), player())
        .with_seed(5)
        .verbose(false);
    runner.start().unwrap();
    runner.run(4).unwrap();
    runner.shutdown();

    for player in runner.players() {
        assert_eq!(player.stats.total_games(), 4);
        assert_eq!(player.stats.games_as(reversi_core::Color::Black), 2);
        assert_eq!(player.engine.name(), "Random");
    }
    let [p0, p1] = runner.players();
    assert_eq!(p0.stats.total_wins(), p1.stats.total_losses());
    assert_eq!(p0.stats.total_draws(), p1.stats.total_draws());

    let text = fs::read_to_string(&log).unwrap();
    let games: Vec<GameRecord> = text
        .lines()
        .map(|line| GameRecord::parse_ggf(line).unwrap())
        .collect();
    assert_eq!(games.len(), 4);
    for game in &games {
        let end = game.final_position().unwrap();
        assert!(end.is_game_over());
        assert_eq!(game.result, Some(end.disc_diff()));
    }

    assert_eq!(load_stats(&stats).unwrap().len(), 2);
    let _ = fs::remove_file(log);
    let _ = fs::remove_file(stats);
}
