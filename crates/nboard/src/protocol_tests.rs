use super::*;

use reversi_core::{Position, Square};

#[test]
fn test_think_reply_drops_annotation() {
    assert_eq!(parse_think_reply("=== F5/+4.00").unwrap(), Move::Place(Square::F5));
    assert_eq!(parse_think_reply("  === f5").unwrap(), Move::Place(Square::F5));
    assert_eq!(parse_think_reply("=== PA").unwrap(), Move::Pass);
    assert_eq!(parse_think_reply("=== d3/-1.5/0.2 extra").unwrap(), "D3".parse().unwrap());
}

#[test]
fn test_think_reply_rejects_garbage() {
    assert!(matches!(parse_think_reply("=== Z9"), Err(EngineError::Protocol(_))));
    assert!(matches!(parse_think_reply("==="), Err(EngineError::Protocol(_))));
    assert!(matches!(parse_think_reply("=== /+1"), Err(EngineError::Protocol(_))));
    assert!(matches!(parse_think_reply("F5"), Err(EngineError::Protocol(_))));
}

#[test]
fn test_myname_announcement() {
    assert_eq!(parse_myname("set myname Kalmia"), Some("Kalmia"));
    assert_eq!(parse_myname("  SET MyName Edax 4.4"), Some("Edax"));
    assert_eq!(parse_myname("set depth 3"), None);
    assert_eq!(parse_myname("status thinking"), None);
}

#[test]
fn test_pong_pattern_is_exact() {
    let re = Regex::new(&pong_pattern(1)).unwrap();
    assert!(re.is_match("pong 1"));
    assert!(re.is_match("  pong   1"));
    assert!(!re.is_match("pong 10"));
    assert!(!re.is_match("pong 2"));
    assert!(Regex::new(THINK_REPLY).unwrap().is_match(" === F5"));
}

#[test]
fn test_command_text() {
    assert_eq!(handshake(), "nboard 2");
    assert_eq!(ping(7), "ping 7");
    assert_eq!(set_depth(12), "set depth 12");
    assert_eq!(move_played(Move::Place(Square::F5)), "move F5");
    assert_eq!(move_played(Move::Pass), "move PA");

    let time = GameTime {
        main_ms: 60_000,
        increment_ms: 500,
        byoyomi_ms: 0,
    };
    assert_eq!(
        set_time(Color::White, &time),
        "set time white main 60000 inc 500 byoyomi 0"
    );

    let game = set_game(&GameRecord::new(Position::startpos()));
    assert!(game.starts_with("set game (;GM[Othello]"));
    assert!(game.ends_with(";)"));
}
