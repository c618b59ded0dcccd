//! ASCEND skill tiers (D … S+).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
pub enum Tier {
    #[default]
    #[serde(rename = "D")]
    #[sqlx(rename = "D")]
    D,
    #[serde(rename = "C")]
    #[sqlx(rename = "C")]
    C,
    #[serde(rename = "C+")]
    #[sqlx(rename = "C+")]
    CPlus,
    #[serde(rename = "B")]
    #[sqlx(rename = "B")]
    B,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    #[sqlx(rename = "A")]
    A,
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APlus,
    #[serde(rename = "S")]
    #[sqlx(rename = "S")]
    S,
    #[serde(rename = "S+")]
    #[sqlx(rename = "S+")]
    SPlus,
}

/// Lower (inclusive) score bound of every tier above D, best first.
const CUTOFFS: [(f64, Tier); 8] = [
    (95.0, Tier::SPlus),
    (90.0, Tier::S),
    (85.0, Tier::APlus),
    (80.0, Tier::A),
    (75.0, Tier::BPlus),
    (70.0, Tier::B),
    (65.0, Tier::CPlus),
    (60.0, Tier::C),
];

impl Tier {
    pub fn from_score(score: f64) -> Tier {
        CUTOFFS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, t)| *t)
            .unwrap_or(Tier::D)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::D => "D",
            Tier::C => "C",
            Tier::CPlus => "C+",
            Tier::B => "B",
            Tier::BPlus => "B+",
            Tier::A => "A",
            Tier::APlus => "A+",
            Tier::S => "S",
            Tier::SPlus => "S+",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "D" => Tier::D,
            "C" => Tier::C,
            "C+" => Tier::CPlus,
            "B" => Tier::B,
            "B+" => Tier::BPlus,
            "A" => Tier::A,
            "A+" => Tier::APlus,
            "S" => Tier::S,
            "S+" => Tier::SPlus,
            other => return Err(format!("unknown tier {other:?}")),
        })
    }
}

/// Integer convenience wrapper over [`Tier::from_score`].
pub fn tier_from_score(score: i64) -> Tier {
    Tier::from_score(score as f64)
}

pub fn average_score(scores: [i64; 4]) -> f64 {
    scores.iter().sum::<i64>() as f64 / 4.0
}

/// Overall tier: the tier of the mean of all four skill scores.
pub fn overall_tier(scores: [i64; 4]) -> Tier {
    Tier::from_score(average_score(scores))
}

/// How an evaluation moved the overall tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ChangeType {
    Update,
    Upgrade,
    Downgrade,
}

impl ChangeType {
    pub fn between(old: Tier, new: Tier) -> ChangeType {
        match new.cmp(&old) {
            std::cmp::Ordering::Greater => ChangeType::Upgrade,
            std::cmp::Ordering::Less => ChangeType::Downgrade,
            std::cmp::Ordering::Equal => ChangeType::Update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs_are_inclusive_on_the_lower_bound() {
        assert_eq!(tier_from_score(100), Tier::SPlus);
        assert_eq!(tier_from_score(95), Tier::SPlus);
        assert_eq!(tier_from_score(94), Tier::S);
        assert_eq!(tier_from_score(85), Tier::APlus);
        assert_eq!(tier_from_score(65), Tier::CPlus);
        assert_eq!(tier_from_score(64), Tier::C);
        assert_eq!(tier_from_score(60), Tier::C);
        assert_eq!(tier_from_score(59), Tier::D);
        assert_eq!(tier_from_score(0), Tier::D);
    }

    #[test]
    fn overall_uses_fractional_average() {
        // mean 94.75 stays in S
        assert_eq!(overall_tier([95, 95, 95, 94]), Tier::S);
        assert_eq!(overall_tier([95, 95, 95, 95]), Tier::SPlus);
        assert_eq!(overall_tier([25, 25, 25, 25]), Tier::D);
    }

    #[test]
    fn tiers_are_ordered_and_round_trip_as_text() {
        assert!(Tier::D < Tier::C && Tier::S < Tier::SPlus);
        for t in [Tier::D, Tier::CPlus, Tier::BPlus, Tier::APlus, Tier::SPlus] {
            assert_eq!(t.as_str().parse::<Tier>().unwrap(), t);
        }
        assert!("Z".parse::<Tier>().is_err());
    }

    #[test]
    fn change_type_follows_tier_order() {
        assert_eq!(ChangeType::between(Tier::C, Tier::B), ChangeType::Upgrade);
        assert_eq!(ChangeType::between(Tier::S, Tier::A), ChangeType::Downgrade);
        assert_eq!(ChangeType::between(Tier::A, Tier::A), ChangeType::Update);
    }
}
