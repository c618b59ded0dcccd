//! Stat registry and achievement unlock conditions.
//!
//! Every stat a quest or achievement may reference is a [`StatKey`]; names
//! outside the registry fail to deserialize, so invalid conditions never reach
//! the database.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::db::models::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Kills,
    FinalKills,
    Deaths,
    FinalDeaths,
    BedsBroken,
    Wins,
    GamesPlayed,
    Experience,
    IronCollected,
    GoldCollected,
    DiamondCollected,
    EmeraldCollected,
    ItemsPurchased,
    KitpvpKills,
    KitpvpDeaths,
    KitpvpGames,
    SkywarsWins,
    SkywarsKills,
    SumoGamesPlayed,
    SumoWins,
    SumoLosses,
    SumoKills,
    SumoDeaths,
    SumoWinstreak,
    SumoBestWinstreak,
    // computed
    KdRatio,
    FkdRatio,
    WinRate,
    TotalResources,
    Level,
}

impl StatKey {
    pub const ALL: [StatKey; 30] = [
        StatKey::Kills,
        StatKey::FinalKills,
        StatKey::Deaths,
        StatKey::FinalDeaths,
        StatKey::BedsBroken,
        StatKey::Wins,
        StatKey::GamesPlayed,
        StatKey::Experience,
        StatKey::IronCollected,
        StatKey::GoldCollected,
        StatKey::DiamondCollected,
        StatKey::EmeraldCollected,
        StatKey::ItemsPurchased,
        StatKey::KitpvpKills,
        StatKey::KitpvpDeaths,
        StatKey::KitpvpGames,
        StatKey::SkywarsWins,
        StatKey::SkywarsKills,
        StatKey::SumoGamesPlayed,
        StatKey::SumoWins,
        StatKey::SumoLosses,
        StatKey::SumoKills,
        StatKey::SumoDeaths,
        StatKey::SumoWinstreak,
        StatKey::SumoBestWinstreak,
        StatKey::KdRatio,
        StatKey::FkdRatio,
        StatKey::WinRate,
        StatKey::TotalResources,
        StatKey::Level,
    ];

    /// Column name for raw counters; `None` for computed stats.
    pub fn column(self) -> Option<&'static str> {
        Some(match self {
            StatKey::Kills => "kills",
            StatKey::FinalKills => "final_kills",
            StatKey::Deaths => "deaths",
            StatKey::FinalDeaths => "final_deaths",
            StatKey::BedsBroken => "beds_broken",
            StatKey::Wins => "wins",
            StatKey::GamesPlayed => "games_played",
            StatKey::Experience => "experience",
            StatKey::IronCollected => "iron_collected",
            StatKey::GoldCollected => "gold_collected",
            StatKey::DiamondCollected => "diamond_collected",
            StatKey::EmeraldCollected => "emerald_collected",
            StatKey::ItemsPurchased => "items_purchased",
            StatKey::KitpvpKills => "kitpvp_kills",
            StatKey::KitpvpDeaths => "kitpvp_deaths",
            StatKey::KitpvpGames => "kitpvp_games",
            StatKey::SkywarsWins => "skywars_wins",
            StatKey::SkywarsKills => "skywars_kills",
            StatKey::SumoGamesPlayed => "sumo_games_played",
            StatKey::SumoWins => "sumo_wins",
            StatKey::SumoLosses => "sumo_losses",
            StatKey::SumoKills => "sumo_kills",
            StatKey::SumoDeaths => "sumo_deaths",
            StatKey::SumoWinstreak => "sumo_winstreak",
            StatKey::SumoBestWinstreak => "sumo_best_winstreak",
            StatKey::KdRatio
            | StatKey::FkdRatio
            | StatKey::WinRate
            | StatKey::TotalResources
            | StatKey::Level => return None,
        })
    }

    pub fn is_counter(self) -> bool {
        self.column().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::KdRatio => "kd_ratio",
            StatKey::FkdRatio => "fkd_ratio",
            StatKey::WinRate => "win_rate",
            StatKey::TotalResources => "total_resources",
            StatKey::Level => "level",
            counter => counter.column().unwrap_or_default(),
        }
    }

    /// Current value of this stat for `player`.
    pub fn read(self, player: &Player) -> f64 {
        let p = player;
        match self {
            StatKey::Kills => p.kills as f64,
            StatKey::FinalKills => p.final_kills as f64,
            StatKey::Deaths => p.deaths as f64,
            StatKey::FinalDeaths => p.final_deaths as f64,
            StatKey::BedsBroken => p.beds_broken as f64,
            StatKey::Wins => p.wins as f64,
            StatKey::GamesPlayed => p.games_played as f64,
            StatKey::Experience => p.experience as f64,
            StatKey::IronCollected => p.iron_collected as f64,
            StatKey::GoldCollected => p.gold_collected as f64,
            StatKey::DiamondCollected => p.diamond_collected as f64,
            StatKey::EmeraldCollected => p.emerald_collected as f64,
            StatKey::ItemsPurchased => p.items_purchased as f64,
            StatKey::KitpvpKills => p.kitpvp_kills as f64,
            StatKey::KitpvpDeaths => p.kitpvp_deaths as f64,
            StatKey::KitpvpGames => p.kitpvp_games as f64,
            StatKey::SkywarsWins => p.skywars_wins as f64,
            StatKey::SkywarsKills => p.skywars_kills as f64,
            StatKey::SumoGamesPlayed => p.sumo_games_played as f64,
            StatKey::SumoWins => p.sumo_wins as f64,
            StatKey::SumoLosses => p.sumo_losses as f64,
            StatKey::SumoKills => p.sumo_kills as f64,
            StatKey::SumoDeaths => p.sumo_deaths as f64,
            StatKey::SumoWinstreak => p.sumo_winstreak as f64,
            StatKey::SumoBestWinstreak => p.sumo_best_winstreak as f64,
            StatKey::KdRatio => p.kd_ratio(),
            StatKey::FkdRatio => p.fkd_ratio(),
            StatKey::WinRate => p.win_rate(),
            StatKey::TotalResources => p.total_resources() as f64,
            StatKey::Level => p.level() as f64,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown stat {s:?}"))
    }
}

/// `stat -> threshold` map; satisfied only when every entry holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockCondition(pub BTreeMap<StatKey, f64>);

impl UnlockCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: StatKey, threshold: f64) -> Self {
        self.0.insert(stat, threshold);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("unlock condition must name at least one stat".into());
        }
        if let Some((k, _)) = self.0.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(format!("threshold for {k} must be a non-negative number"));
        }
        Ok(())
    }

    pub fn is_met(&self, player: &Player) -> bool {
        !self.0.is_empty() && self.0.iter().all(|(stat, min)| stat.read(player) >= *min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_registry() {
        for k in StatKey::ALL {
            assert_eq!(k.as_str().parse::<StatKey>().unwrap(), k);
        }
        assert!("karma".parse::<StatKey>().is_err());
    }

    #[test]
    fn computed_stats_are_not_counters() {
        assert!(StatKey::Kills.is_counter());
        assert!(StatKey::SumoBestWinstreak.is_counter());
        assert!(!StatKey::KdRatio.is_counter());
        assert!(!StatKey::Level.is_counter());
    }

    #[test]
    fn conditions_reject_unknown_stats_when_parsed() {
        let ok: UnlockCondition = serde_json::from_str(r#"{"kills": 100, "win_rate": 50}"#).unwrap();
        assert_eq!(ok.0.len(), 2);
        assert!(serde_json::from_str::<UnlockCondition>(r#"{"nope": 1}"#).is_err());
    }

    #[test]
    fn empty_or_negative_conditions_are_invalid() {
        assert!(UnlockCondition::new().validate().is_err());
        assert!(UnlockCondition::new().with(StatKey::Wins, -1.0).validate().is_err());
        assert!(UnlockCondition::new().with(StatKey::Wins, 1.0).validate().is_ok());
    }
}
