use super::*;

#[test]
fn test_game_time_from_durations() {
    let t = GameTime::new(
        Duration::from_secs(600),
        Duration::from_millis(1500),
        Duration::from_secs(5),
    );
    assert_eq!(t.main_ms, 600_000);
    assert_eq!(t.increment_ms, 1_500);
    assert_eq!(t.byoyomi_ms, 5_000);
    assert_eq!(t.increment(), Duration::from_millis(1500));
}

#[test]
fn test_game_time_display() {
    let t = GameTime {
        main_ms: 3_725_000,
        ..Default::default()
    };
    assert_eq!(t.to_string(), "1:02:05");
    assert_eq!(GameTime::default().to_string(), "0:00:00");
}
