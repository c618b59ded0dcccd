// tests/clan_lists.rs

mod common;

use leaderboard_server::db::candidate_repo::{self, CandidateUpdate, NewCandidate};
use leaderboard_server::db::target_repo::{self, NewTarget, BLEEDING_THRESHOLD};
use leaderboard_server::game::types::{CandidateStatus, ReactionKind, TargetPriority, TargetStatus};

fn target(nickname: &str, priority: TargetPriority) -> NewTarget {
    NewTarget {
        nickname: nickname.into(),
        server: "mc.example.net".into(),
        gamemode: "bedwars".into(),
        reason: "camping".into(),
        priority,
    }
}

#[tokio::test]
async fn targets_are_listed_critical_first() {
    let db = common::pool().await;
    target_repo::create(&db, &target("low", TargetPriority::Low), "admin").await.unwrap();
    target_repo::create(&db, &target("crit", TargetPriority::Critical), "admin").await.unwrap();
    target_repo::create(&db, &target("mid", TargetPriority::Medium), "admin").await.unwrap();

    let names: Vec<String> = target_repo::list(&db, None)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.nickname)
        .collect();
    assert_eq!(names, ["crit", "mid", "low"]);
}

#[tokio::test]
async fn reactions_start_bleeding_at_threshold() {
    let db = common::pool().await;
    let t = target_repo::create(&db, &target("griefer", TargetPriority::High), "admin")
        .await
        .unwrap();

    for i in 1..BLEEDING_THRESHOLD {
        let t = target_repo::react(&db, t.id, ReactionKind::Rekt, "bot").await.unwrap();
        assert_eq!(t.total_reactions(), i);
        assert!(!t.bleeding_effect);
    }
    let t = target_repo::react(&db, t.id, ReactionKind::Fragged, "bot").await.unwrap();
    assert!(t.bleeding_effect);
    assert_eq!(t.rekt_count, BLEEDING_THRESHOLD - 1);
    assert_eq!(t.fragged_count, 1);
}

#[tokio::test]
async fn completing_a_target_stamps_it() {
    let db = common::pool().await;
    let t = target_repo::create(&db, &target("done", TargetPriority::Low), "admin")
        .await
        .unwrap();
    let t = target_repo::complete(&db, t.id).await.unwrap();
    assert_eq!(t.status, TargetStatus::Completed);
    assert!(t.completed_at.is_some());

    let active = target_repo::list(&db, Some(TargetStatus::Active)).await.unwrap();
    assert!(active.is_empty());
    target_repo::delete(&db, t.id).await.unwrap();
    assert!(target_repo::delete(&db, t.id).await.is_err());
}

#[tokio::test]
async fn candidates_are_unique_and_editable() {
    let db = common::pool().await;
    let new = NewCandidate {
        nickname: "Recruit".into(),
        description: "good at bridging".into(),
        servers: vec![" hypixel ".into(), "".into()],
        contact: "recruit#0001".into(),
        notes: String::new(),
    };
    let c = candidate_repo::create(&db, &new, "admin").await.unwrap();
    assert_eq!(c.servers.0, ["hypixel"]);
    assert_eq!(c.status, CandidateStatus::Candidate);
    assert!(candidate_repo::create(&db, &new, "admin").await.is_err());

    let upd = CandidateUpdate {
        status: Some(CandidateStatus::Invited),
        ..CandidateUpdate::default()
    };
    let c = candidate_repo::update(&db, c.id, &upd).await.unwrap();
    assert_eq!(c.status, CandidateStatus::Invited);
    assert_eq!(c.description, "good at bridging");
}
