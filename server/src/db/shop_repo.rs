//! Shop catalogue, purchases, inventory and boosters.
//!
//! A purchase runs validate → debit → record → apply effect → commit inside a
//! single transaction; any failure drops the transaction and nothing sticks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::cache;
use crate::db::models::{
    GradientTheme, InventoryItem, Player, PlayerBooster, PlayerTitle, ShopItem, ShopPurchase,
    SiteTheme,
};
use crate::db::player_repo;
use crate::error::{AppError, AppResult};
use crate::game::effects::{
    combined_multiplier, slugify, ItemEffect, GRADIENT_XP_BONUS, THEME_XP_BONUS,
};
use crate::game::types::{BoosterKind, InventoryStatus, Rarity, Resource, RoleTier, ShopCategory};
use crate::metrics;

/// Element a purchased gradient is applied to.
const GRADIENT_ELEMENT: &str = "nickname";

#[derive(Debug, Clone, Deserialize)]
pub struct NewShopItem {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_coins: i64,
    #[serde(default)]
    pub price_reputation: i64,
    #[serde(default = "first_level")]
    pub unlock_level: i64,
    #[serde(default)]
    pub rarity: Rarity,
    pub effect: ItemEffect,
}

fn first_level() -> i64 {
    1
}

impl NewShopItem {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() || self.display_name.trim().is_empty() {
            return Err(AppError::validation("name and display_name are required"));
        }
        if self.price_coins < 0 || self.price_reputation < 0 {
            return Err(AppError::validation("prices must not be negative"));
        }
        if self.unlock_level < 1 {
            return Err(AppError::validation("unlock_level must be at least 1"));
        }
        self.effect.validate().map_err(AppError::Validation)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    pub item: String,
    pub category: ShopCategory,
    pub message: String,
    pub coins: i64,
    pub reputation: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UseOutcome {
    pub message: String,
    pub remaining: i64,
}

/// Reward multipliers from the player's live boosters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Multipliers {
    pub experience: f64,
    pub coins: f64,
    pub reputation: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Multipliers {
            experience: 1.0,
            coins: 1.0,
            reputation: 1.0,
        }
    }
}

// ───────────── catalogue ─────────────

pub async fn list_items(db: &SqlitePool, include_inactive: bool) -> AppResult<Vec<ShopItem>> {
    let sql = if include_inactive {
        "SELECT * FROM shop_items ORDER BY category, price_coins, id"
    } else {
        "SELECT * FROM shop_items WHERE is_active = 1 ORDER BY category, price_coins, id"
    };
    Ok(sqlx::query_as::<_, ShopItem>(sql).fetch_all(db).await?)
}

pub async fn fetch_item(db: &SqlitePool, id: i64) -> AppResult<ShopItem> {
    sqlx::query_as::<_, ShopItem>("SELECT * FROM shop_items WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("shop item"))
}

pub async fn create_item(db: &SqlitePool, new: &NewShopItem) -> AppResult<ShopItem> {
    new.validate()?;
    let res = sqlx::query(
        r#"INSERT INTO shop_items (name, display_name, description, category, price_coins,
                                   price_reputation, unlock_level, rarity, effect, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new.name.trim())
    .bind(new.display_name.trim())
    .bind(&new.description)
    .bind(new.effect.category())
    .bind(new.price_coins)
    .bind(new.price_reputation)
    .bind(new.unlock_level)
    .bind(new.rarity)
    .bind(Json(&new.effect))
    .bind(Utc::now())
    .execute(db)
    .await
    .map_err(AppError::from);

    match res {
        Ok(r) => fetch_item(db, r.last_insert_rowid()).await,
        Err(e) if e.is_unique_violation() => Err(AppError::validation(format!(
            "shop item {} already exists",
            new.name.trim()
        ))),
        Err(e) => Err(e),
    }
}

pub async fn toggle_item(db: &SqlitePool, id: i64) -> AppResult<ShopItem> {
    let res = sqlx::query("UPDATE shop_items SET is_active = NOT is_active WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("shop item"));
    }
    fetch_item(db, id).await
}

// ───────────── purchase ─────────────

#[tracing::instrument(skip(db))]
pub async fn purchase(
    db: &SqlitePool,
    player_id: i64,
    item_name: &str,
) -> AppResult<PurchaseOutcome> {
    let mut tx = db.begin().await?;

    let item = sqlx::query_as::<_, ShopItem>("SELECT * FROM shop_items WHERE name = ?")
        .bind(item_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("shop item"))?;
    let player = player_repo::fetch_conn(&mut tx, player_id).await?;

    if !item.is_active {
        return Err(AppError::validation("item is not available"));
    }
    if (player.level() as i64) < item.unlock_level {
        return Err(AppError::validation(format!(
            "requires level {}",
            item.unlock_level
        )));
    }
    if player.coins < item.price_coins {
        return Err(AppError::validation("not enough coins"));
    }
    if player.reputation < item.price_reputation {
        return Err(AppError::validation("not enough reputation"));
    }

    let non_consumable = item.category.is_non_consumable();
    if non_consumable {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM shop_purchases WHERE player_id = ? AND item_id = ?)",
        )
        .bind(player_id)
        .bind(item.id)
        .fetch_one(&mut *tx)
        .await?;
        if owned {
            return Err(AppError::validation("item already purchased"));
        }
    }

    let debited = sqlx::query(
        r#"UPDATE players
              SET coins = coins - ?, reputation = reputation - ?,
                  items_purchased = items_purchased + 1, last_updated = ?
            WHERE id = ? AND coins >= ? AND reputation >= ?"#,
    )
    .bind(item.price_coins)
    .bind(item.price_reputation)
    .bind(Utc::now())
    .bind(player_id)
    .bind(item.price_coins)
    .bind(item.price_reputation)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if debited == 0 {
        return Err(AppError::validation("insufficient balance"));
    }

    let recorded = sqlx::query(
        r#"INSERT INTO shop_purchases (player_id, item_id, price_paid_coins,
                                       price_paid_reputation, non_consumable, purchased_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(player_id)
    .bind(item.id)
    .bind(item.price_coins)
    .bind(item.price_reputation)
    .bind(non_consumable)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(AppError::from);
    match recorded {
        Err(e) if e.is_unique_violation() => {
            return Err(AppError::validation("item already purchased"))
        }
        other => {
            other?;
        }
    }

    let message = apply_effect(&mut tx, &player, &item).await?;

    let (coins, reputation): (i64, i64) =
        sqlx::query_as("SELECT coins, reputation FROM players WHERE id = ?")
            .bind(player_id)
            .fetch_one(&mut *tx)
            .await?;
    tx.commit().await?;
    cache::invalidate_stats();

    metrics::PURCHASES
        .with_label_values(&[item.category.as_str()])
        .inc();
    log::info!("player #{player_id} bought {} ({:?})", item.name, item.category);

    Ok(PurchaseOutcome {
        item: item.name,
        category: item.category,
        message,
        coins,
        reputation,
    })
}

async fn apply_effect(
    conn: &mut SqliteConnection,
    player: &Player,
    item: &ShopItem,
) -> AppResult<String> {
    let now = Utc::now();
    match &item.effect.0 {
        ItemEffect::CustomRole { role_tier } => {
            let tier = player.custom_role_tier.map_or(*role_tier, |t| t.max(*role_tier));
            let role_name = player
                .custom_role
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| tier.default_role_name().to_string());
            sqlx::query(
                r#"UPDATE players
                      SET custom_role_purchased = 1, custom_role_tier = ?, custom_role = ?
                    WHERE id = ?"#,
            )
            .bind(tier)
            .bind(&role_name)
            .bind(player.id)
            .execute(&mut *conn)
            .await?;
            Ok(format!("custom role unlocked ({tier:?})"))
        }

        ItemEffect::EmojiSlot { emoji_slots } => {
            sqlx::query(
                "UPDATE players SET custom_emoji_slots = custom_emoji_slots + ? WHERE id = ?",
            )
            .bind(*emoji_slots)
            .bind(player.id)
            .execute(&mut *conn)
            .await?;
            Ok(format!("{emoji_slots} emoji slot(s) added"))
        }

        ItemEffect::Booster {
            booster_type,
            multiplier,
            duration_minutes,
        } => {
            let extended = activate_booster(
                conn,
                player.id,
                *booster_type,
                *multiplier,
                *duration_minutes,
                now,
            )
            .await?;
            Ok(if extended {
                format!("{booster_type:?} booster extended")
            } else {
                format!("{booster_type:?} booster active for {duration_minutes} minutes")
            })
        }

        ItemEffect::Title {
            title_text,
            title_color,
        } => {
            let slug = slugify(title_text);
            let title_id: i64 = sqlx::query_scalar(
                r#"INSERT INTO custom_titles (name, display_name, color) VALUES (?, ?, ?)
                   ON CONFLICT (name) DO UPDATE
                      SET display_name = excluded.display_name, color = excluded.color
                   RETURNING id"#,
            )
            .bind(&slug)
            .bind(title_text)
            .bind(title_color)
            .fetch_one(&mut *conn)
            .await?;

            sqlx::query("UPDATE player_titles SET is_active = 0 WHERE player_id = ?")
                .bind(player.id)
                .execute(&mut *conn)
                .await?;
            sqlx::query(
                r#"INSERT INTO player_titles (player_id, title_id, is_active, unlocked_at)
                   VALUES (?, ?, 1, ?)
                   ON CONFLICT (player_id, title_id) DO UPDATE SET is_active = 1"#,
            )
            .bind(player.id)
            .bind(title_id)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            Ok(format!("title {title_text:?} equipped"))
        }

        ItemEffect::Gradient {
            colors,
            direction,
            is_animated,
        } => {
            let gradient_id: i64 = sqlx::query_scalar(
                r#"INSERT INTO gradient_themes (name, colors, direction, is_animated)
                   VALUES (?, ?, ?, ?)
                   ON CONFLICT (name) DO UPDATE
                      SET colors = excluded.colors, direction = excluded.direction,
                          is_animated = excluded.is_animated
                   RETURNING id"#,
            )
            .bind(&item.name)
            .bind(Json(colors))
            .bind(direction)
            .bind(*is_animated)
            .fetch_one(&mut *conn)
            .await?;

            sqlx::query(
                r#"INSERT INTO player_gradient_settings (player_id, element, gradient_id)
                   VALUES (?, ?, ?)
                   ON CONFLICT (player_id, element) DO UPDATE SET gradient_id = excluded.gradient_id"#,
            )
            .bind(player.id)
            .bind(GRADIENT_ELEMENT)
            .bind(gradient_id)
            .execute(&mut *conn)
            .await?;
            player_repo::credit(conn, player.id, GRADIENT_XP_BONUS, 0, 0, 0).await?;
            Ok(format!("gradient applied, +{GRADIENT_XP_BONUS} XP"))
        }

        ItemEffect::Theme { primary_color } => {
            let theme_id: i64 = sqlx::query_scalar(
                r#"INSERT INTO site_themes (name, display_name, primary_color) VALUES (?, ?, ?)
                   ON CONFLICT (name) DO UPDATE
                      SET display_name = excluded.display_name,
                          primary_color = excluded.primary_color
                   RETURNING id"#,
            )
            .bind(&item.name)
            .bind(&item.display_name)
            .bind(primary_color)
            .fetch_one(&mut *conn)
            .await?;

            sqlx::query("UPDATE players SET selected_theme_id = ? WHERE id = ?")
                .bind(theme_id)
                .bind(player.id)
                .execute(&mut *conn)
                .await?;
            player_repo::credit(conn, player.id, THEME_XP_BONUS, 0, 0, 0).await?;
            Ok(format!("theme applied, +{THEME_XP_BONUS} XP"))
        }

        ItemEffect::Cursor | ItemEffect::Avatar | ItemEffect::Consumable { .. } => {
            add_to_inventory(conn, player.id, item, now).await?;
            Ok(format!("{} added to inventory", item.display_name))
        }
    }
}

async fn add_to_inventory(
    conn: &mut SqliteConnection,
    player_id: i64,
    item: &ShopItem,
    now: DateTime<Utc>,
) -> AppResult<()> {
    // consumables stack onto an unused entry of the same item
    if matches!(item.effect.0, ItemEffect::Consumable { .. }) {
        let stacked = sqlx::query(
            r#"UPDATE inventory_items SET quantity = quantity + 1
                WHERE id = (SELECT id FROM inventory_items
                             WHERE player_id = ? AND item_id = ? AND status = 'unused'
                             ORDER BY id LIMIT 1)"#,
        )
        .bind(player_id)
        .bind(item.id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        if stacked > 0 {
            return Ok(());
        }
    }

    sqlx::query(
        r#"INSERT INTO inventory_items (player_id, item_id, quantity, status, acquired_at)
           VALUES (?, ?, 1, ?, ?)"#,
    )
    .bind(player_id)
    .bind(item.id)
    .bind(InventoryStatus::Unused)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

// ───────────── boosters ─────────────

async fn live_boosters(
    conn: &mut SqliteConnection,
    player_id: i64,
    now: DateTime<Utc>,
) -> AppResult<Vec<PlayerBooster>> {
    let rows = sqlx::query_as::<_, PlayerBooster>(
        "SELECT * FROM player_boosters WHERE player_id = ? AND is_active = 1 ORDER BY expires_at DESC",
    )
    .bind(player_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().filter(|b| b.is_live(now)).collect())
}

/// Extend a live booster of the same kind or start a new one.
/// Returns `true` when an existing booster was extended.
pub async fn activate_booster(
    conn: &mut SqliteConnection,
    player_id: i64,
    kind: BoosterKind,
    multiplier: f64,
    duration_minutes: i64,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let duration = Duration::minutes(duration_minutes);
    let existing = live_boosters(&mut *conn, player_id, now)
        .await?
        .into_iter()
        .find(|b| b.booster_type == kind);

    if let Some(b) = existing {
        sqlx::query("UPDATE player_boosters SET expires_at = ?, multiplier = ? WHERE id = ?")
            .bind(b.expires_at + duration)
            .bind(b.multiplier.max(multiplier))
            .bind(b.id)
            .execute(conn)
            .await?;
        return Ok(true);
    }

    sqlx::query(
        r#"INSERT INTO player_boosters (player_id, booster_type, multiplier, started_at,
                                        expires_at, is_active)
           VALUES (?, ?, ?, ?, ?, 1)"#,
    )
    .bind(player_id)
    .bind(kind)
    .bind(multiplier)
    .bind(now)
    .bind(now + duration)
    .execute(conn)
    .await?;
    Ok(false)
}

pub async fn active_boosters(db: &SqlitePool, player_id: i64) -> AppResult<Vec<PlayerBooster>> {
    let mut conn = db.acquire().await?;
    live_boosters(&mut conn, player_id, Utc::now()).await
}

pub async fn multipliers(conn: &mut SqliteConnection, player_id: i64) -> AppResult<Multipliers> {
    let live: Vec<(BoosterKind, f64)> = live_boosters(conn, player_id, Utc::now())
        .await?
        .into_iter()
        .map(|b| (b.booster_type, b.multiplier))
        .collect();
    Ok(Multipliers {
        experience: combined_multiplier(live.iter().copied(), BoosterKind::Experience),
        coins: combined_multiplier(live.iter().copied(), BoosterKind::Coins),
        reputation: combined_multiplier(live.iter().copied(), BoosterKind::Reputation),
    })
}

/// Flag boosters whose expiry has passed as inactive. Returns rows touched.
pub async fn expire_boosters(db: &SqlitePool) -> AppResult<u64> {
    let now = Utc::now();
    let rows =
        sqlx::query_as::<_, PlayerBooster>("SELECT * FROM player_boosters WHERE is_active = 1")
            .fetch_all(db)
            .await?;
    let mut expired = 0;
    for b in rows.into_iter().filter(|b| !b.is_live(now)) {
        expired += sqlx::query("UPDATE player_boosters SET is_active = 0 WHERE id = ?")
            .bind(b.id)
            .execute(db)
            .await?
            .rows_affected();
    }
    Ok(expired)
}

// ───────────── inventory ─────────────

const INVENTORY_SELECT: &str = r#"
    SELECT inv.id, inv.player_id, inv.item_id, s.name AS item_name, s.display_name,
           s.category, s.effect, inv.quantity, inv.status, inv.acquired_at, inv.used_at
      FROM inventory_items inv
      JOIN shop_items s ON s.id = inv.item_id"#;

pub async fn inventory(db: &SqlitePool, player_id: i64) -> AppResult<Vec<InventoryItem>> {
    let sql = format!("{INVENTORY_SELECT} WHERE inv.player_id = ? ORDER BY inv.status DESC, inv.id");
    Ok(sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(player_id)
        .fetch_all(db)
        .await?)
}

/// Consume one unit of an inventory entry; consumables credit their resource.
pub async fn use_item(db: &SqlitePool, player_id: i64, entry_id: i64) -> AppResult<UseOutcome> {
    let mut tx = db.begin().await?;
    let sql = format!("{INVENTORY_SELECT} WHERE inv.id = ? AND inv.player_id = ?");
    let entry = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(entry_id)
        .bind(player_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("inventory item"))?;

    if entry.status == InventoryStatus::Used || entry.quantity <= 0 {
        return Err(AppError::validation("item already used"));
    }

    let message = match &entry.effect.0 {
        ItemEffect::Consumable { resource, amount } => {
            let (xp, coins, rep) = match resource {
                Resource::Experience => (*amount, 0, 0),
                Resource::Coins => (0, *amount, 0),
                Resource::Reputation => (0, 0, *amount),
            };
            player_repo::credit(&mut tx, player_id, xp, coins, rep, 0).await?;
            format!("+{amount} {resource:?}").to_lowercase()
        }
        _ => format!("{} equipped", entry.display_name),
    };

    let remaining = entry.quantity - 1;
    let now = Utc::now();
    sqlx::query(
        r#"UPDATE inventory_items
              SET quantity = ?, status = ?, used_at = ?
            WHERE id = ?"#,
    )
    .bind(remaining)
    .bind(if remaining > 0 {
        InventoryStatus::Unused
    } else {
        InventoryStatus::Used
    })
    .bind(now)
    .bind(entry.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    if matches!(entry.category, ShopCategory::Consumable) {
        cache::invalidate_stats();
    }
    Ok(UseOutcome { message, remaining })
}

pub async fn titles(db: &SqlitePool, player_id: i64) -> AppResult<Vec<PlayerTitle>> {
    Ok(sqlx::query_as::<_, PlayerTitle>(
        r#"SELECT t.id AS title_id, t.name, t.display_name, t.color, pt.is_active, pt.unlocked_at
             FROM player_titles pt
             JOIN custom_titles t ON t.id = pt.title_id
            WHERE pt.player_id = ?
            ORDER BY pt.is_active DESC, pt.unlocked_at"#,
    )
    .bind(player_id)
    .fetch_all(db)
    .await?)
}

/// Purchase ledger, newest first.
pub async fn purchases(db: &SqlitePool, player_id: i64) -> AppResult<Vec<ShopPurchase>> {
    Ok(sqlx::query_as::<_, ShopPurchase>(
        "SELECT * FROM shop_purchases WHERE player_id = ? ORDER BY purchased_at DESC, id DESC",
    )
    .bind(player_id)
    .fetch_all(db)
    .await?)
}

/// Gradient applied to the player's nickname, if any.
pub async fn nickname_gradient(db: &SqlitePool, player_id: i64) -> AppResult<Option<GradientTheme>> {
    Ok(sqlx::query_as::<_, GradientTheme>(
        r#"SELECT g.* FROM player_gradient_settings s
             JOIN gradient_themes g ON g.id = s.gradient_id
            WHERE s.player_id = ? AND s.element = ?"#,
    )
    .bind(player_id)
    .bind(GRADIENT_ELEMENT)
    .fetch_optional(db)
    .await?)
}

pub async fn selected_theme(db: &SqlitePool, player: &Player) -> AppResult<Option<SiteTheme>> {
    let Some(theme_id) = player.selected_theme_id else {
        return Ok(None);
    };
    Ok(sqlx::query_as::<_, SiteTheme>("SELECT * FROM site_themes WHERE id = ?")
        .bind(theme_id)
        .fetch_optional(db)
        .await?)
}

/// Features the player's purchased custom role may use.
pub fn role_features(player: &Player) -> Option<crate::game::types::RoleFeatures> {
    player
        .custom_role_purchased
        .then(|| player.custom_role_tier.unwrap_or(RoleTier::Basic).features())
}
