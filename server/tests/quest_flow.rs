// tests/quest_flow.rs

mod common;

use chrono::{Duration, Utc};
use leaderboard_server::db::evaluation::evaluate;
use leaderboard_server::db::player_repo::{self, StatOp};
use leaderboard_server::db::quest_repo::{self, NewQuest};
use leaderboard_server::game::types::{Difficulty, QuestCategory};
use leaderboard_server::game::unlock::StatKey;

fn kill_quest(target: i64) -> NewQuest {
    NewQuest {
        title: "Slayer".into(),
        description: "Get some kills".into(),
        target_stat: StatKey::Kills,
        target_value: target,
        category: QuestCategory::Permanent,
        difficulty: Difficulty::Easy,
        reward_xp: 0,
        reward_coins: 50,
        reward_reputation: 5,
        reward_karma: 10,
    }
}

#[tokio::test]
async fn quest_pays_out_exactly_once() {
    let db = common::pool().await;
    let p = common::player(&db, "Steve").await;
    common::set_kills(&db, p.id, 5).await;

    let quest = quest_repo::create(&db, &kill_quest(10)).await.unwrap();
    let pq = quest_repo::accept(&db, p.id, quest.id).await.unwrap();
    assert_eq!(pq.baseline_value, 5);

    // progress counts from acceptance: 5 -> 12 is only 7
    common::set_kills(&db, p.id, 12).await;
    let eval = evaluate(&db, p.id).await.unwrap();
    assert!(eval.completed_quests.is_empty());

    common::set_kills(&db, p.id, 20).await;
    let eval = evaluate(&db, p.id).await.unwrap();
    assert_eq!(eval.completed_quests.len(), 1);
    assert_eq!(eval.completed_quests[0].coins, 50);

    let again = evaluate(&db, p.id).await.unwrap();
    assert!(again.completed_quests.is_empty());

    let after = player_repo::fetch(&db, p.id).await.unwrap();
    assert_eq!(after.coins, 50);
    assert_eq!(after.reputation, 5);
    assert_eq!(after.karma, 10);
}

#[tokio::test]
async fn accepting_twice_is_rejected() {
    let db = common::pool().await;
    let p = common::player(&db, "Alex").await;
    let quest = quest_repo::create(&db, &kill_quest(3)).await.unwrap();

    quest_repo::accept(&db, p.id, quest.id).await.unwrap();
    assert!(quest_repo::accept(&db, p.id, quest.id).await.is_err());
}

#[tokio::test]
async fn quests_must_track_counters() {
    let db = common::pool().await;
    let mut bad = kill_quest(3);
    bad.target_stat = StatKey::KdRatio;
    assert!(quest_repo::create(&db, &bad).await.is_err());

    let mut bad = kill_quest(0);
    bad.title = "Nothing".into();
    assert!(quest_repo::create(&db, &bad).await.is_err());
}

#[tokio::test]
async fn admin_reset_reopens_quest_and_tracks_completion_rate() {
    let db = common::pool().await;
    let p = common::player(&db, "Notch").await;
    let quest = quest_repo::create(&db, &kill_quest(1)).await.unwrap();

    quest_repo::accept(&db, p.id, quest.id).await.unwrap();
    common::set_kills(&db, p.id, 1).await;
    evaluate(&db, p.id).await.unwrap();
    assert_eq!(quest_repo::completion_rate(&db, quest.id).await.unwrap(), 100.0);

    quest_repo::reset(&db, quest.id).await.unwrap();
    assert!(quest_repo::for_player(&db, p.id).await.unwrap().is_empty());

    // accepted again, progress starts from the current count
    let pq = quest_repo::accept(&db, p.id, quest.id).await.unwrap();
    assert_eq!(pq.baseline_value, 1);
    assert!(!pq.is_completed);
}

#[tokio::test]
async fn daily_refresh_keeps_same_day_acceptance_and_clears_on_next_day() {
    let db = common::pool().await;
    let p = common::player(&db, "Herobrine").await;
    common::set_kills(&db, p.id, 4).await;

    let mut daily = kill_quest(10);
    daily.category = QuestCategory::Daily;
    let quest = quest_repo::create(&db, &daily).await.unwrap();
    assert!(quest.last_refresh.is_some());
    quest_repo::accept(&db, p.id, quest.id).await.unwrap();

    let now = Utc::now();
    assert_eq!(quest_repo::refresh_due(&db, now).await.unwrap(), 0);
    assert_eq!(quest_repo::list_active(&db).await.unwrap().len(), 1);
    assert_eq!(quest_repo::for_player(&db, p.id).await.unwrap().len(), 1);

    let tomorrow = now + Duration::days(1);
    assert_eq!(quest_repo::refresh_due(&db, tomorrow).await.unwrap(), 1);
    assert!(quest_repo::for_player(&db, p.id).await.unwrap().is_empty());

    let (accepted, completed, baseline): (bool, bool, i64) = sqlx::query_as(
        "SELECT is_accepted, is_completed, baseline_value FROM player_quests
          WHERE player_id = ? AND quest_id = ?",
    )
    .bind(p.id)
    .bind(quest.id)
    .fetch_one(&db)
    .await
    .unwrap();
    assert!(!accepted);
    assert!(!completed);
    assert_eq!(baseline, 0);

    // stamped for tomorrow, so a second pass that day is a no-op
    assert_eq!(quest_repo::refresh_due(&db, tomorrow).await.unwrap(), 0);
}

#[tokio::test]
async fn modify_stat_adds_subtracts_and_floors_at_zero() {
    let db = common::pool().await;
    let p = common::player(&db, "Jeb").await;
    common::set_kills(&db, p.id, 10).await;

    let after = player_repo::modify_stat(&db, p.id, StatKey::Kills, StatOp::Add, 5)
        .await
        .unwrap();
    assert_eq!(after.kills, 15);

    let after = player_repo::modify_stat(&db, p.id, StatKey::Kills, StatOp::Subtract, 40)
        .await
        .unwrap();
    assert_eq!(after.kills, 0);

    let after = player_repo::modify_stat(&db, p.id, StatKey::Wins, StatOp::Set, 7)
        .await
        .unwrap();
    assert_eq!(after.wins, 7);

    assert!(player_repo::modify_stat(&db, p.id, StatKey::KdRatio, StatOp::Set, 2)
        .await
        .is_err());
    assert!(player_repo::modify_stat(&db, p.id, StatKey::Kills, StatOp::Add, -1)
        .await
        .is_err());
}
