// tests/achievements_ascend.rs

mod common;

use leaderboard_server::db::achievement_repo::{self, NewAchievement};
use leaderboard_server::db::ascend_repo::{self, AscendInput};
use leaderboard_server::db::evaluation::evaluate;
use leaderboard_server::db::player_repo;
use leaderboard_server::game::scoring::{ChangeType, Tier};
use leaderboard_server::game::types::{Gamemode, Rarity};
use leaderboard_server::game::unlock::{StatKey, UnlockCondition};

fn hundred_kills() -> NewAchievement {
    NewAchievement {
        name: "centurion".into(),
        title: "Centurion".into(),
        description: "100 kills".into(),
        icon: String::new(),
        rarity: Rarity::Rare,
        unlock_condition: UnlockCondition::new().with(StatKey::Kills, 100.0),
        reward_xp: 0,
        reward_coins: 20,
        reward_reputation: 0,
        is_hidden: false,
    }
}

fn scores(gamemode: Gamemode, scores: [i64; 4]) -> AscendInput {
    AscendInput {
        gamemode,
        scores,
        skill_names: None,
        comment: String::new(),
        evaluator: Some("tester".into()),
    }
}

#[tokio::test]
async fn sweep_awards_each_achievement_once() {
    let db = common::pool().await;
    let p = common::player(&db, "Hunter").await;
    let a = achievement_repo::create(&db, &hundred_kills()).await.unwrap();

    common::set_kills(&db, p.id, 99).await;
    assert!(evaluate(&db, p.id).await.unwrap().new_achievements.is_empty());

    common::set_kills(&db, p.id, 150).await;
    let eval = evaluate(&db, p.id).await.unwrap();
    assert_eq!(eval.new_achievements.len(), 1);
    assert_eq!(eval.new_achievements[0].achievement_id, a.id);
    assert!(evaluate(&db, p.id).await.unwrap().new_achievements.is_empty());

    let earned = achievement_repo::for_player(&db, p.id).await.unwrap();
    assert_eq!(earned.len(), 1);
    assert_eq!(player_repo::fetch(&db, p.id).await.unwrap().coins, 20);
}

#[tokio::test]
async fn grant_and_revoke() {
    let db = common::pool().await;
    let p = common::player(&db, "Lucky").await;
    let a = achievement_repo::create(&db, &hundred_kills()).await.unwrap();

    achievement_repo::grant(&db, p.id, a.id).await.unwrap();
    assert!(achievement_repo::grant(&db, p.id, a.id).await.is_err());

    achievement_repo::revoke(&db, p.id, a.id).await.unwrap();
    assert!(achievement_repo::for_player(&db, p.id).await.unwrap().is_empty());
    // rewards already paid are kept
    assert_eq!(player_repo::fetch(&db, p.id).await.unwrap().coins, 20);
    assert!(achievement_repo::revoke(&db, p.id, a.id).await.is_err());
}

#[tokio::test]
async fn duplicate_and_empty_conditions_are_rejected() {
    let db = common::pool().await;
    achievement_repo::create(&db, &hundred_kills()).await.unwrap();
    assert!(achievement_repo::create(&db, &hundred_kills()).await.is_err());

    let mut empty = hundred_kills();
    empty.name = "nothing".into();
    empty.unlock_condition = UnlockCondition::new();
    assert!(achievement_repo::create(&db, &empty).await.is_err());
}

#[tokio::test]
async fn ascend_tiers_ranks_and_history() {
    let db = common::pool().await;
    let a = common::player(&db, "Ace").await;
    let b = common::player(&db, "Bee").await;

    let first = ascend_repo::upsert(&db, a.id, &scores(Gamemode::Bedwars, [60, 62, 64, 66]))
        .await
        .unwrap();
    assert_eq!(first.skill1_tier, Tier::C);
    assert_eq!(first.skill4_tier, Tier::CPlus);
    assert_eq!(first.overall_tier, Tier::C);
    assert_eq!(first.previous_tier, None);
    assert_eq!(first.skill1_name, "PVP");
    assert_eq!(first.global_rank, 1);

    let bee = ascend_repo::upsert(&db, b.id, &scores(Gamemode::Bedwars, [90, 90, 90, 90]))
        .await
        .unwrap();
    assert_eq!(bee.overall_tier, Tier::S);
    assert_eq!(bee.global_rank, 1);
    let ace = ascend_repo::fetch(&db, a.id, Gamemode::Bedwars)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ace.global_rank, 2);

    let upgraded = ascend_repo::upsert(&db, a.id, &scores(Gamemode::Bedwars, [95, 95, 95, 95]))
        .await
        .unwrap();
    assert_eq!(upgraded.overall_tier, Tier::SPlus);
    assert_eq!(upgraded.previous_tier, Some(Tier::C));
    assert_eq!(upgraded.global_rank, 1);

    let history = ascend_repo::history(&db, a.id, Some(Gamemode::Bedwars), 10)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].change_type, ChangeType::Upgrade);
    assert_eq!(history[0].old_scores.0, [60, 62, 64, 66]);

    // other modes are ranked separately
    assert!(ascend_repo::fetch(&db, a.id, Gamemode::Sumo).await.unwrap().is_none());
}

#[tokio::test]
async fn ascend_scores_out_of_range_are_rejected() {
    let db = common::pool().await;
    let p = common::player(&db, "Oops").await;
    assert!(ascend_repo::upsert(&db, p.id, &scores(Gamemode::Sumo, [101, 0, 0, 0]))
        .await
        .is_err());
    assert!(ascend_repo::upsert(&db, 9999, &scores(Gamemode::Sumo, [1, 2, 3, 4]))
        .await
        .is_err());
}
