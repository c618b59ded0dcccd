//! Experience estimate from raw counters and the 1–5 star rating.

use crate::db::models::Player;
use crate::game::stats::round_to;

/// Experience implied by a player's counters.
///
/// Each bonus multiplies the running total and truncates back to an integer.
pub fn auto_experience(p: &Player) -> i64 {
    let mut xp = p.kills * 15
        + p.final_kills * 75
        + p.beds_broken * 150
        + p.wins * 300
        + p.games_played * 40
        + p.total_resources() / 8;

    let kd = p.kd_ratio();
    let kd_bonus = if kd >= 3.0 {
        1.4
    } else if kd >= 2.0 {
        1.25
    } else if kd >= 1.5 {
        1.15
    } else {
        1.0
    };
    xp = (xp as f64 * kd_bonus) as i64;

    let wr = p.win_rate();
    let wr_bonus = if wr >= 85.0 {
        1.5
    } else if wr >= 75.0 {
        1.35
    } else if wr >= 50.0 {
        1.2
    } else {
        1.0
    };
    xp = (xp as f64 * wr_bonus) as i64;

    if p.games_played > 0 && p.beds_broken as f64 / p.games_played as f64 >= 1.0 {
        xp = (xp as f64 * 1.2) as i64;
    }

    xp.max(0)
}

/// Composite 1–5 star rating shown on profile cards.
pub fn star_rating(p: &Player) -> u8 {
    let games = p.games_played as f64;
    let score = (p.level() as f64 * 0.5).min(20.0)
        + (p.kd_ratio() * 3.0).min(15.0)
        + (p.win_rate() * 0.15).min(15.0)
        + (p.beds_broken as f64 * 0.1).min(10.0)
        + (p.final_kills as f64 * 0.05).min(10.0)
        + (games * 0.01).min(5.0);
    round_to(score / 13.0, 0).clamp(1.0, 5.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player {
            nickname: "tester".into(),
            ..Player::default()
        }
    }

    #[test]
    fn empty_player_has_no_experience_and_one_star() {
        let p = player();
        assert_eq!(auto_experience(&p), 0);
        assert_eq!(star_rating(&p), 1);
    }

    #[test]
    fn base_formula_without_bonuses() {
        // kd 1.0, win rate 10%, beds/games 0.1
        let p = Player {
            kills: 10,
            deaths: 10,
            wins: 1,
            games_played: 10,
            beds_broken: 1,
            iron_collected: 80,
            ..player()
        };
        assert_eq!(auto_experience(&p), 150 + 300 + 400 + 150 + 10);
    }

    #[test]
    fn bonuses_stack_multiplicatively() {
        // kd 3 → ×1.4, win rate 100% → ×1.5, beds/games 1 → ×1.2
        let p = Player {
            kills: 30,
            deaths: 10,
            wins: 2,
            games_played: 2,
            beds_broken: 2,
            ..player()
        };
        let base = 30 * 15 + 2 * 300 + 2 * 40 + 2 * 150;
        let expected = (((base as f64 * 1.4) as i64 as f64 * 1.5) as i64 as f64 * 1.2) as i64;
        assert_eq!(auto_experience(&p), expected);
    }

    #[test]
    fn star_rating_tops_out_at_five() {
        let p = Player {
            experience: 13_117_500,
            kills: 5000,
            deaths: 100,
            wins: 900,
            games_played: 1000,
            beds_broken: 2000,
            final_kills: 3000,
            ..player()
        };
        assert_eq!(star_rating(&p), 5);
    }
}
