// tests/shop_flow.rs

mod common;

use chrono::{Duration, Utc};
use leaderboard_server::db::player_repo;
use leaderboard_server::db::shop_repo::{self, NewShopItem};
use leaderboard_server::game::effects::ItemEffect;
use leaderboard_server::game::types::{BoosterKind, Rarity, Resource, RoleTier};

fn item(name: &str, price_coins: i64, effect: ItemEffect) -> NewShopItem {
    NewShopItem {
        name: name.into(),
        display_name: name.to_uppercase(),
        description: String::new(),
        price_coins,
        price_reputation: 0,
        unlock_level: 1,
        rarity: Rarity::Common,
        effect,
    }
}

fn coin_booster(multiplier: f64) -> ItemEffect {
    ItemEffect::Booster {
        booster_type: BoosterKind::Coins,
        multiplier,
        duration_minutes: 30,
    }
}

#[tokio::test]
async fn duplicate_title_purchase_is_rejected_without_second_debit() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Buyer", 1000, 0).await;
    let title = ItemEffect::Title {
        title_text: "Bed Breaker".into(),
        title_color: "#ff0000".into(),
    };
    shop_repo::create_item(&db, &item("bed_breaker", 100, title))
        .await
        .unwrap();

    let first = shop_repo::purchase(&db, p.id, "bed_breaker").await.unwrap();
    assert_eq!(first.coins, 900);

    let err = shop_repo::purchase(&db, p.id, "bed_breaker")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already purchased"));

    let after = player_repo::fetch(&db, p.id).await.unwrap();
    assert_eq!(after.coins, 900);
    assert_eq!(after.items_purchased, 1);

    let titles = shop_repo::titles(&db, p.id).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert!(titles[0].is_active);
}

#[tokio::test]
async fn booster_stacking_extends_expiry_and_keeps_max_multiplier() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Booster", 1000, 0).await;
    shop_repo::create_item(&db, &item("coins_x2", 100, coin_booster(2.0)))
        .await
        .unwrap();
    shop_repo::create_item(&db, &item("coins_x1_5", 50, coin_booster(1.5)))
        .await
        .unwrap();

    shop_repo::purchase(&db, p.id, "coins_x2").await.unwrap();
    let before = shop_repo::active_boosters(&db, p.id).await.unwrap();
    assert_eq!(before.len(), 1);

    shop_repo::purchase(&db, p.id, "coins_x1_5").await.unwrap();
    let after = shop_repo::active_boosters(&db, p.id).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].multiplier, 2.0);
    assert_eq!(
        (after[0].expires_at - before[0].expires_at).num_seconds(),
        30 * 60
    );

    let mut conn = db.acquire().await.unwrap();
    let m = shop_repo::multipliers(&mut conn, p.id).await.unwrap();
    assert_eq!(m.coins, 2.0);
    assert_eq!(m.experience, 1.0);
}

#[tokio::test]
async fn level_gate_and_balance_are_checked_before_debit() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Newbie", 50, 0).await;

    let mut gated = item("mythic_role", 10, ItemEffect::CustomRole {
        role_tier: RoleTier::Mythic,
    });
    gated.unlock_level = 5;
    shop_repo::create_item(&db, &gated).await.unwrap();
    shop_repo::create_item(&db, &item("pricey", 500, ItemEffect::Avatar))
        .await
        .unwrap();

    assert!(shop_repo::purchase(&db, p.id, "mythic_role").await.is_err());
    assert!(shop_repo::purchase(&db, p.id, "pricey").await.is_err());
    assert!(shop_repo::purchase(&db, p.id, "no_such_item").await.is_err());

    let after = player_repo::fetch(&db, p.id).await.unwrap();
    assert_eq!(after.coins, 50);
    assert_eq!(after.items_purchased, 0);
}

#[tokio::test]
async fn consumables_stack_and_credit_on_use() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Hoarder", 100, 0).await;
    let pouch = ItemEffect::Consumable {
        resource: Resource::Reputation,
        amount: 25,
    };
    shop_repo::create_item(&db, &item("rep_pouch", 10, pouch))
        .await
        .unwrap();

    shop_repo::purchase(&db, p.id, "rep_pouch").await.unwrap();
    shop_repo::purchase(&db, p.id, "rep_pouch").await.unwrap();

    let inv = shop_repo::inventory(&db, p.id).await.unwrap();
    assert_eq!(inv.len(), 1);
    assert_eq!(inv[0].quantity, 2);

    let used = shop_repo::use_item(&db, p.id, inv[0].id).await.unwrap();
    assert_eq!(used.remaining, 1);
    let after = player_repo::fetch(&db, p.id).await.unwrap();
    assert_eq!(after.reputation, 25);
    assert_eq!(after.coins, 80);
}

#[tokio::test]
async fn disabled_items_cannot_be_bought() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Late", 100, 0).await;
    let created = shop_repo::create_item(&db, &item("cursor", 10, ItemEffect::Cursor))
        .await
        .unwrap();

    let toggled = shop_repo::toggle_item(&db, created.id).await.unwrap();
    assert!(!toggled.is_active);
    assert!(shop_repo::purchase(&db, p.id, "cursor").await.is_err());
    assert!(shop_repo::list_items(&db, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn cosmetics_apply_and_grant_experience() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Stylish", 1000, 0).await;
    let gradient = ItemEffect::Gradient {
        colors: vec!["#ff0000".into(), "#0000ff".into()],
        direction: "90deg".into(),
        is_animated: false,
    };
    let theme = ItemEffect::Theme {
        primary_color: "#123456".into(),
    };
    shop_repo::create_item(&db, &item("sunset", 100, gradient)).await.unwrap();
    shop_repo::create_item(&db, &item("ocean", 100, theme)).await.unwrap();

    shop_repo::purchase(&db, p.id, "sunset").await.unwrap();
    shop_repo::purchase(&db, p.id, "ocean").await.unwrap();

    let after = player_repo::fetch(&db, p.id).await.unwrap();
    assert_eq!(after.experience, 800);
    let applied = shop_repo::nickname_gradient(&db, p.id).await.unwrap().unwrap();
    assert_eq!(applied.colors.0.len(), 2);
    let selected = shop_repo::selected_theme(&db, &after).await.unwrap().unwrap();
    assert_eq!(selected.primary_color, "#123456");
    assert_eq!(shop_repo::purchases(&db, p.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn expired_boosters_are_deactivated() {
    let db = common::pool().await;
    let p = common::rich_player(&db, "Idle", 500, 0).await;
    shop_repo::create_item(&db, &item("coins_x3", 100, coin_booster(3.0)))
        .await
        .unwrap();
    shop_repo::purchase(&db, p.id, "coins_x3").await.unwrap();

    // still running: nothing to expire
    assert_eq!(shop_repo::expire_boosters(&db).await.unwrap(), 0);

    sqlx::query("UPDATE player_boosters SET expires_at = ? WHERE player_id = ?")
        .bind(Utc::now() - Duration::minutes(1))
        .bind(p.id)
        .execute(&db)
        .await
        .unwrap();

    assert_eq!(shop_repo::expire_boosters(&db).await.unwrap(), 1);
    assert!(shop_repo::active_boosters(&db, p.id).await.unwrap().is_empty());
    assert_eq!(shop_repo::expire_boosters(&db).await.unwrap(), 0);
}
