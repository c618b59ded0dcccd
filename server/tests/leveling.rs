// tests/leveling.rs

use leaderboard_server::db::models::Player;
use leaderboard_server::game::leveling::level;
use leaderboard_server::game::scoring::{tier_from_score, Tier};

#[test]
fn level_boundaries() {
    assert_eq!(level(0), 1);
    assert_eq!(level(9_999), 1);
    assert_eq!(level(10_000), 2);
    assert_eq!(level(13_117_500), 100);
    assert_eq!(level(13_120_000), 101);
}

#[test]
fn level_is_monotonic() {
    let mut last = 1;
    for xp in (0..14_000_000).step_by(7_919) {
        let l = level(xp);
        assert!(l >= last, "level dropped at {xp}");
        last = l;
    }
}

#[test]
fn profile_scenario() {
    let p = Player {
        nickname: "Scenario".into(),
        experience: 12_500,
        kills: 1_250,
        deaths: 890,
        ..Player::default()
    };
    assert_eq!(p.level(), 2);
    assert_eq!(p.kd_ratio(), 1.40);
}

#[test]
fn tier_boundaries() {
    assert_eq!(tier_from_score(59), Tier::D);
    assert_eq!(tier_from_score(60), Tier::C);
    assert_eq!(tier_from_score(65), Tier::CPlus);
    assert_eq!(tier_from_score(94), Tier::S);
    assert_eq!(tier_from_score(95), Tier::SPlus);
}
