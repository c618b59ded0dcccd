//! Derived statistics over raw integer counters.

use serde::Serialize;

use crate::db::models::Player;
use crate::game::types::Gamemode;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `kills / deaths` to two decimals; with no deaths the raw kill count.
pub fn kd_ratio(kills: i64, deaths: i64) -> f64 {
    if deaths > 0 {
        round_to(kills as f64 / deaths as f64, 2)
    } else {
        kills.max(0) as f64
    }
}

/// Win percentage to one decimal; zero games → 0.
pub fn win_rate(wins: i64, games_played: i64) -> f64 {
    if games_played > 0 {
        round_to(wins as f64 / games_played as f64 * 100.0, 1)
    } else {
        0.0
    }
}

/// Accuracy-style percentage helper shared by a few gamemode projections.
fn ratio(num: i64, den: i64) -> f64 {
    if den > 0 {
        round_to(num as f64 / den as f64, 2)
    } else {
        0.0
    }
}

impl Player {
    pub fn kd_ratio(&self) -> f64 {
        kd_ratio(self.kills, self.deaths)
    }

    pub fn fkd_ratio(&self) -> f64 {
        kd_ratio(self.final_kills, self.final_deaths)
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games_played)
    }

    pub fn total_resources(&self) -> i64 {
        self.iron_collected + self.gold_collected + self.diamond_collected + self.emerald_collected
    }

    pub fn level(&self) -> u32 {
        crate::game::leveling::level(self.experience)
    }

    pub fn level_progress(&self) -> f64 {
        crate::game::leveling::level_progress(self.experience)
    }

    /// Per-gamemode view of the counters.
    pub fn gamemode_stats(&self, mode: Gamemode) -> GamemodeStats {
        match mode {
            Gamemode::Bedwars => GamemodeStats::Bedwars {
                kills: self.kills,
                final_kills: self.final_kills,
                deaths: self.deaths,
                final_deaths: self.final_deaths,
                beds_broken: self.beds_broken,
                wins: self.wins,
                games_played: self.games_played,
                experience: self.experience,
                kd_ratio: self.kd_ratio(),
                fkd_ratio: self.fkd_ratio(),
                win_rate: self.win_rate(),
                level: self.level(),
            },
            Gamemode::Kitpvp => GamemodeStats::Kitpvp {
                kills: self.kitpvp_kills,
                deaths: self.kitpvp_deaths,
                games: self.kitpvp_games,
                kd_ratio: kd_ratio(self.kitpvp_kills, self.kitpvp_deaths),
            },
            Gamemode::Skywars => GamemodeStats::Skywars {
                wins: self.skywars_wins,
                kills: self.skywars_kills,
                kills_per_win: ratio(self.skywars_kills, self.skywars_wins),
            },
            Gamemode::Sumo => GamemodeStats::Sumo {
                games_played: self.sumo_games_played,
                wins: self.sumo_wins,
                losses: self.sumo_losses,
                kills: self.sumo_kills,
                deaths: self.sumo_deaths,
                winstreak: self.sumo_winstreak,
                best_winstreak: self.sumo_best_winstreak,
                win_rate: win_rate(self.sumo_wins, self.sumo_games_played),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "gamemode", rename_all = "snake_case")]
pub enum GamemodeStats {
    Bedwars {
        kills: i64,
        final_kills: i64,
        deaths: i64,
        final_deaths: i64,
        beds_broken: i64,
        wins: i64,
        games_played: i64,
        experience: i64,
        kd_ratio: f64,
        fkd_ratio: f64,
        win_rate: f64,
        level: u32,
    },
    Kitpvp {
        kills: i64,
        deaths: i64,
        games: i64,
        kd_ratio: f64,
    },
    Skywars {
        wins: i64,
        kills: i64,
        kills_per_win: f64,
    },
    Sumo {
        games_played: i64,
        wins: i64,
        losses: i64,
        kills: i64,
        deaths: i64,
        winstreak: i64,
        best_winstreak: i64,
        win_rate: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kd_falls_back_to_kills() {
        assert_eq!(kd_ratio(0, 0), 0.0);
        assert_eq!(kd_ratio(5, 0), 5.0);
        assert_eq!(kd_ratio(10, 5), 2.0);
        assert_eq!(kd_ratio(1250, 890), 1.40);
        assert_eq!(kd_ratio(1, 3), 0.33);
    }

    #[test]
    fn win_rate_rounds_to_one_decimal() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(1, 3), 33.3);
        assert_eq!(win_rate(2, 3), 66.7);
        assert_eq!(win_rate(10, 10), 100.0);
    }

    #[test]
    fn round_to_handles_places() {
        assert_eq!(round_to(2.36, 1), 2.4);
        assert_eq!(round_to(-1.26, 1), -1.3);
        assert_eq!(round_to(7.0, 2), 7.0);
    }
}
