use serde::{Deserialize, Serialize};

/// Game modes tracked by the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Gamemode {
    #[default]
    Bedwars,
    Kitpvp,
    Skywars,
    Sumo,
}

impl Gamemode {
    pub const ALL: [Gamemode; 4] = [
        Gamemode::Bedwars,
        Gamemode::Kitpvp,
        Gamemode::Skywars,
        Gamemode::Sumo,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Gamemode::Bedwars => "Bedwars",
            Gamemode::Kitpvp => "KitPVP",
            Gamemode::Skywars => "SkyWars",
            Gamemode::Sumo => "Sumo",
        }
    }

    /// The four ASCEND skills rated in this mode.
    pub fn skill_names(self) -> [&'static str; 4] {
        match self {
            Gamemode::Bedwars => ["PVP", "Clutching", "Block Placement", "Gamesense"],
            Gamemode::Kitpvp => ["Aiming", "Healing (soups/pots)", "Movement", "Spacing"],
            Gamemode::Skywars => ["Looting", "Potting", "Pearling", "Melee"],
            Gamemode::Sumo => ["Gamesense", "KB control", "Mechanics", "Movement"],
        }
    }
}

/// Refresh cadence of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestCategory {
    Daily,
    Weekly,
    Monthly,
    #[default]
    Permanent,
    Thematic,
    Mythic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Epic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

/// Shop catalogue sections. Derived from an item's effect, never set freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ShopCategory {
    Title,
    Theme,
    Gradient,
    CustomRole,
    EmojiSlot,
    Booster,
    Cursor,
    Avatar,
    Consumable,
}

impl ShopCategory {
    /// Categories that can be bought only once per player.
    pub fn is_non_consumable(self) -> bool {
        matches!(
            self,
            ShopCategory::Title | ShopCategory::Theme | ShopCategory::Cursor | ShopCategory::Avatar
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShopCategory::Title => "title",
            ShopCategory::Theme => "theme",
            ShopCategory::Gradient => "gradient",
            ShopCategory::CustomRole => "custom_role",
            ShopCategory::EmojiSlot => "emoji_slot",
            ShopCategory::Booster => "booster",
            ShopCategory::Cursor => "cursor",
            ShopCategory::Avatar => "avatar",
            ShopCategory::Consumable => "consumable",
        }
    }
}

/// Purchased custom-role tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RoleTier {
    #[default]
    Basic,
    Premium,
    Legendary,
    Mythic,
}

/// What a custom role of a given tier may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleFeatures {
    pub color: bool,
    pub emoji: bool,
    pub gradient: bool,
    pub animation: bool,
    pub glow: bool,
    pub shadow: bool,
    pub font_styling: bool,
    pub border: bool,
    pub background: bool,
}

impl RoleTier {
    pub fn default_role_name(self) -> &'static str {
        match self {
            RoleTier::Basic => "Newcomer",
            RoleTier::Premium => "Veteran",
            RoleTier::Legendary => "Legend",
            RoleTier::Mythic => "Mythic Warrior",
        }
    }

    pub fn features(self) -> RoleFeatures {
        let basic = RoleFeatures {
            color: true,
            ..RoleFeatures::default()
        };
        let premium = RoleFeatures {
            emoji: true,
            gradient: true,
            glow: true,
            font_styling: true,
            ..basic
        };
        let legendary = RoleFeatures {
            animation: true,
            shadow: true,
            border: true,
            ..premium
        };
        match self {
            RoleTier::Basic => basic,
            RoleTier::Premium => premium,
            RoleTier::Legendary => legendary,
            RoleTier::Mythic => RoleFeatures {
                background: true,
                ..legendary
            },
        }
    }
}

/// Which balance a booster multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BoosterKind {
    Coins,
    Reputation,
    Experience,
    /// Applies to coins, reputation and experience alike.
    Mega,
}

impl BoosterKind {
    pub fn affects(self, target: BoosterKind) -> bool {
        self == target || self == BoosterKind::Mega
    }
}

/// Balance a consumable inventory item credits on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Coins,
    Experience,
    Reputation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InventoryStatus {
    #[default]
    Unused,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TargetPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TargetPriority {
    /// Numeric rank used for ordering (critical first).
    pub fn rank(self) -> i64 {
        match self {
            TargetPriority::Low => 1,
            TargetPriority::Medium => 2,
            TargetPriority::High => 3,
            TargetPriority::Critical => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TargetStatus {
    #[default]
    Active,
    Completed,
    Removed,
}

/// Reactions a target can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReactionKind {
    Fragged,
    Killed,
    Exploded,
    Slayed,
    Destroyed,
    Eliminated,
    Rekt,
    Obliterated,
}

impl ReactionKind {
    /// Counter column on `targets` bumped by this reaction.
    pub fn column(self) -> &'static str {
        match self {
            ReactionKind::Fragged => "fragged_count",
            ReactionKind::Killed => "killed_count",
            ReactionKind::Exploded => "exploded_count",
            ReactionKind::Slayed => "slayed_count",
            ReactionKind::Destroyed => "destroyed_count",
            ReactionKind::Eliminated => "eliminated_count",
            ReactionKind::Rekt => "rekt_count",
            ReactionKind::Obliterated => "obliterated_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Candidate,
    InProgress,
    Invited,
    Accepted,
    Rejected,
}

/// Karma band name shown next to a player's balance.
pub fn karma_level(karma: i64) -> &'static str {
    if karma <= -1000 {
        "Consumed by Darkness"
    } else if karma <= -500 {
        "Dark Pilgrim"
    } else if karma < 500 {
        "Grey Balancer"
    } else if karma < 1000 {
        "Lightbearer"
    } else if karma < 2500 {
        "Chosen"
    } else {
        "Apotheosis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cosmetics_are_single_purchase() {
        assert!(ShopCategory::Title.is_non_consumable());
        assert!(ShopCategory::Avatar.is_non_consumable());
        assert!(!ShopCategory::Booster.is_non_consumable());
        assert!(!ShopCategory::Gradient.is_non_consumable());
    }

    #[test]
    fn role_features_accumulate_by_tier() {
        let basic = RoleTier::Basic.features();
        assert!(basic.color && !basic.gradient && !basic.emoji);
        let premium = RoleTier::Premium.features();
        assert!(premium.gradient && premium.emoji && !premium.animation);
        let legendary = RoleTier::Legendary.features();
        assert!(legendary.animation && !legendary.background);
        assert!(RoleTier::Mythic.features().background);
    }

    #[test]
    fn mega_booster_affects_everything() {
        assert!(BoosterKind::Mega.affects(BoosterKind::Coins));
        assert!(BoosterKind::Coins.affects(BoosterKind::Coins));
        assert!(!BoosterKind::Reputation.affects(BoosterKind::Coins));
    }

    #[test]
    fn karma_bands() {
        assert_eq!(karma_level(-1000), "Consumed by Darkness");
        assert_eq!(karma_level(-500), "Dark Pilgrim");
        assert_eq!(karma_level(0), "Grey Balancer");
        assert_eq!(karma_level(500), "Lightbearer");
        assert_eq!(karma_level(2499), "Chosen");
        assert_eq!(karma_level(2500), "Apotheosis");
    }
}
