use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::game::effects::ItemEffect;
use crate::game::scoring::{ChangeType, Tier};
use crate::game::types::{
    BoosterKind, CandidateStatus, Difficulty, Gamemode, InventoryStatus, QuestCategory, Rarity,
    ReactionKind, RoleTier, ShopCategory, TargetPriority, TargetStatus,
};
use crate::game::unlock::{StatKey, UnlockCondition};

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct Player {
    pub id: i64,
    pub nickname: String,
    pub role: String,

    pub kills: i64,
    pub final_kills: i64,
    pub deaths: i64,
    pub final_deaths: i64,
    pub beds_broken: i64,
    pub wins: i64,
    pub games_played: i64,
    pub experience: i64,
    pub iron_collected: i64,
    pub gold_collected: i64,
    pub diamond_collected: i64,
    pub emerald_collected: i64,
    pub items_purchased: i64,

    pub kitpvp_kills: i64,
    pub kitpvp_deaths: i64,
    pub kitpvp_games: i64,
    pub skywars_wins: i64,
    pub skywars_kills: i64,
    pub sumo_games_played: i64,
    pub sumo_wins: i64,
    pub sumo_losses: i64,
    pub sumo_kills: i64,
    pub sumo_deaths: i64,
    pub sumo_winstreak: i64,
    pub sumo_best_winstreak: i64,

    pub coins: i64,
    pub reputation: i64,
    pub karma: i64,

    pub custom_role: Option<String>,
    pub custom_role_color: Option<String>,
    pub custom_role_emoji: Option<String>,
    pub custom_role_purchased: bool,
    pub custom_role_tier: Option<RoleTier>,
    pub custom_emoji_slots: i64,
    pub selected_theme_id: Option<i64>,

    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub target_stat: String,
    pub target_value: i64,
    pub category: QuestCategory,
    pub difficulty: Difficulty,
    pub reward_xp: i64,
    pub reward_coins: i64,
    pub reward_reputation: i64,
    pub reward_karma: i64,
    pub is_active: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    /// Stored names are validated on insert; an unknown one means a hand-edited row.
    pub fn stat(&self) -> Option<StatKey> {
        self.target_stat.parse().ok()
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerQuest {
    pub id: i64,
    pub player_id: i64,
    pub quest_id: i64,
    pub baseline_value: i64,
    pub current_progress: i64,
    pub is_accepted: bool,
    pub is_completed: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub unlock_condition: Json<UnlockCondition>,
    pub reward_xp: i64,
    pub reward_coins: i64,
    pub reward_reputation: i64,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShopItem {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: ShopCategory,
    pub price_coins: i64,
    pub price_reputation: i64,
    pub unlock_level: i64,
    pub rarity: Rarity,
    pub effect: Json<ItemEffect>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShopPurchase {
    pub id: i64,
    pub player_id: i64,
    pub item_id: i64,
    pub price_paid_coins: i64,
    pub price_paid_reputation: i64,
    pub non_consumable: bool,
    pub purchased_at: DateTime<Utc>,
}

/// Inventory row joined with its catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventoryItem {
    pub id: i64,
    pub player_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub display_name: String,
    pub category: ShopCategory,
    #[serde(skip_serializing)]
    pub effect: Json<ItemEffect>,
    pub quantity: i64,
    pub status: InventoryStatus,
    pub acquired_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerBooster {
    pub id: i64,
    pub player_id: i64,
    pub booster_type: BoosterKind,
    pub multiplier: f64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl PlayerBooster {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}

/// A title a player has unlocked, with its catalog display data.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerTitle {
    pub title_id: i64,
    pub name: String,
    pub display_name: String,
    pub color: String,
    pub is_active: bool,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GradientTheme {
    pub id: i64,
    pub name: String,
    pub colors: Json<Vec<String>>,
    pub direction: String,
    pub is_animated: bool,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteTheme {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub primary_color: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AscendData {
    pub id: i64,
    pub player_id: i64,
    pub gamemode: Gamemode,
    pub skill1_name: String,
    pub skill1_score: i64,
    pub skill1_tier: Tier,
    pub skill2_name: String,
    pub skill2_score: i64,
    pub skill2_tier: Tier,
    pub skill3_name: String,
    pub skill3_score: i64,
    pub skill3_tier: Tier,
    pub skill4_name: String,
    pub skill4_score: i64,
    pub skill4_tier: Tier,
    pub overall_tier: Tier,
    pub previous_tier: Option<Tier>,
    pub comment: String,
    pub evaluator: Option<String>,
    pub global_rank: i64,
    pub updated_at: DateTime<Utc>,
}

impl AscendData {
    pub fn scores(&self) -> [i64; 4] {
        [
            self.skill1_score,
            self.skill2_score,
            self.skill3_score,
            self.skill4_score,
        ]
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AscendHistory {
    pub id: i64,
    pub player_id: i64,
    pub gamemode: Gamemode,
    pub old_tier: Tier,
    pub new_tier: Tier,
    pub old_scores: Json<[i64; 4]>,
    pub new_scores: Json<[i64; 4]>,
    pub change_type: ChangeType,
    pub evaluator: Option<String>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Target {
    pub id: i64,
    pub nickname: String,
    pub server: String,
    pub gamemode: String,
    pub reason: String,
    pub priority: TargetPriority,
    pub status: TargetStatus,
    pub added_by: String,
    pub fragged_count: i64,
    pub killed_count: i64,
    pub exploded_count: i64,
    pub slayed_count: i64,
    pub destroyed_count: i64,
    pub eliminated_count: i64,
    pub rekt_count: i64,
    pub obliterated_count: i64,
    pub bleeding_effect: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Target {
    pub fn total_reactions(&self) -> i64 {
        self.fragged_count
            + self.killed_count
            + self.exploded_count
            + self.slayed_count
            + self.destroyed_count
            + self.eliminated_count
            + self.rekt_count
            + self.obliterated_count
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TargetReaction {
    pub id: i64,
    pub target_id: i64,
    pub reaction: ReactionKind,
    pub reacted_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Candidate {
    pub id: i64,
    pub nickname: String,
    pub description: String,
    pub servers: Json<Vec<String>>,
    pub contact: String,
    pub status: CandidateStatus,
    pub added_by: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
