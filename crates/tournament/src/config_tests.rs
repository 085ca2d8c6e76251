use super::*;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tournament-{}-{}", std::process::id(), name))
}

#[test]
fn test_partial_game_config_uses_defaults() {
    let config: GameConfig = toml::from_str("swap_player = false\nmax_initial_empties = 50\n").unwrap();
    assert!(!config.swap_player);
    assert_eq!(config.max_initial_empties, 50);
    assert_eq!(config.min_initial_empties, 40);
    assert!(config.use_same_position_when_swap);
    assert_eq!(config.game_log_path, PathBuf::from("game.ggf"));
    assert_eq!(config.stats_path, PathBuf::from("stats.json"));
    assert_eq!(config.quit_timeout(), Duration::from_secs(10));
    assert_eq!(config.opening_book_path, None);
}

#[test]
fn test_player_config_from_toml() {
    let text = r#"
path = "/usr/local/bin/edax"
args = ["-q", "-n", "1"]
initial_commands = ["set contempt 0"]
level = 12

[thinking_time]
main_ms = 60000
increment_ms = 1000
"#;
    let config: PlayerConfig = toml::from_str(text).unwrap();
    assert_eq!(config.path, PathBuf::from("/usr/local/bin/edax"));
    assert_eq!(config.args, vec!["-q", "-n", "1"]);
    assert_eq!(config.level, Some(12));
    assert_eq!(config.thinking_time.main_ms, 60_000);
    assert_eq!(config.thinking_time.increment_ms, 1_000);
    assert_eq!(config.thinking_time.byoyomi_ms, 0);

    let engine = config.engine_config(Duration::from_millis(250));
    assert_eq!(engine.path, config.path);
    assert_eq!(engine.args, config.args);
    assert_eq!(engine.initial_commands, vec!["set contempt 0"]);
    assert_eq!(engine.probe_timeout, Duration::from_millis(250));
}

#[test]
fn test_save_then_load() {
    let path = temp_file("game.toml");
    let config = GameConfig {
        opening_book_path: Some(PathBuf::from("book.txt")),
        min_initial_empties: 44,
        ..Default::default()
    };
    config.save(&path).unwrap();
    assert_eq!(GameConfig::load(&path).unwrap(), config);

    let player_path = temp_file("player.toml");
    let player = PlayerConfig {
        path: PathBuf::from("random_nboard"),
        thinking_time: GameTime {
            main_ms: 5_000,
            ..Default::default()
        },
        ..Default::default()
    };
    player.save(&player_path).unwrap();
    assert_eq!(PlayerConfig::load(&player_path).unwrap(), player);

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(player_path);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let config = GameConfig {
        min_initial_empties: 50,
        max_initial_empties: 45,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let path = temp_file("empty-player.toml");
    PlayerConfig::default().save(&path).unwrap();
    assert!(matches!(PlayerConfig::load(&path), Err(ConfigError::Invalid(_))));
    let _ = fs::remove_file(path);

    assert!(matches!(
        GameConfig::load(Path::new("/nonexistent/game.toml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_malformed_toml_reports_path() {
    let path = temp_file("broken.toml");
    fs::write(&path, "swap_player = \"maybe\"").unwrap();
    match GameConfig::load(&path) {
        Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }
    let _ = fs::remove_file(path);
}
