// tests/http_api.rs

mod common;

use actix_web::{http::StatusCode, test, web, App};
use leaderboard_server::cache::{leaderboard_key, STATS};
use leaderboard_server::http::{self, auth::issue_token, leaderboard::MAX_CACHED_OFFSET};
use serde_json::{json, Value};

const ADMIN_PASSWORD: &str = "test-admin-password";

/// Settings are read once per process, so every test sets the env first.
async fn setup() -> sqlx::SqlitePool {
    std::env::set_var("ADMIN_PASSWORD", ADMIN_PASSWORD);
    common::pool().await
}

fn admin_bearer() -> (&'static str, String) {
    let token = issue_token(None, true).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

fn player_bearer(nickname: &str) -> (&'static str, String) {
    let token = issue_token(Some(nickname.into()), false).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .configure(http::routes::init_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn admin_routes_require_an_admin_session() {
    let db = setup().await;
    common::player(&db, "Regular").await;
    let app = app!(db);

    let body = json!({ "nickname": "Created" });
    let anon = test::TestRequest::post()
        .uri("/api/players")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, anon).await.status(), StatusCode::UNAUTHORIZED);

    let as_player = test::TestRequest::post()
        .uri("/api/players")
        .insert_header(player_bearer("Regular"))
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, as_player).await.status(), StatusCode::FORBIDDEN);

    let as_admin = test::TestRequest::post()
        .uri("/api/players")
        .insert_header(admin_bearer())
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, as_admin).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let v: Value = test::read_body_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["player"]["nickname"], "Created");
}

#[actix_rt::test]
async fn leaderboard_orders_by_requested_stat() {
    let db = setup().await;
    let low = common::player(&db, "Low").await;
    let high = common::player(&db, "High").await;
    common::set_kills(&db, low.id, 10).await;
    common::set_kills(&db, high.id, 500).await;
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/api/leaderboard?sort=kills&limit=10")
        .to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["players"][0]["nickname"], "High");
    assert_eq!(v["players"][0]["position"], 1);
    assert_eq!(v["players"][1]["nickname"], "Low");

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(v["stats"]["total_players"], 2);
    assert_eq!(v["stats"]["total_kills"], 510);
}

#[actix_rt::test]
async fn deep_leaderboard_pages_are_not_cached() {
    let db = setup().await;
    common::player(&db, "Pager").await;
    let app = app!(db);

    let offset = MAX_CACHED_OFFSET + 500;
    let req = test::TestRequest::get()
        .uri(&format!("/api/leaderboard?sort=wins&limit=7&offset={offset}"))
        .to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["players"].as_array().map(Vec::len), Some(0));
    assert!(STATS.get(&leaderboard_key("wins", 7, offset)).is_none());
}

#[actix_rt::test]
async fn players_can_only_buy_for_themselves() {
    let db = setup().await;
    let victim = common::rich_player(&db, "Victim", 100, 0).await;
    common::player(&db, "Thief").await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/shop/purchase")
        .insert_header(player_bearer("Thief"))
        .set_json(json!({ "player_id": victim.id, "item_name": "anything" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // the owner gets past the guard and hits the missing item
    let req = test::TestRequest::post()
        .uri("/api/shop/purchase")
        .insert_header(player_bearer("victim"))
        .set_json(json!({ "player_id": victim.id, "item_name": "anything" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v: Value = test::read_body_json(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "shop item not found");
}

#[actix_rt::test]
async fn player_login_and_quest_accept() {
    let db = setup().await;
    let p = common::player(&db, "Walker").await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/player/{}/password", p.id))
        .insert_header(admin_bearer())
        .set_json(json!({ "password": "correct horse" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "nickname": "Walker", "password": "wrong" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "nickname": "walker", "password": "correct horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().any(|c| c.name() == "session"));
    let v: Value = test::read_body_json(resp).await;
    let token = v["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/quests")
        .insert_header(admin_bearer())
        .set_json(json!({
            "title": "First blood",
            "target_stat": "kills",
            "target_value": 1,
            "reward_coins": 10
        }))
        .to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    let quest_id = v["quest"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/quests/{quest_id}/accept"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["player_quest"]["player_id"], p.id);

    // the admin login uses ADMIN_PASSWORD
    let req = test::TestRequest::post()
        .uri("/api/auth/admin")
        .set_json(json!({ "password": ADMIN_PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn health_and_gamemodes() {
    let db = setup().await;
    let app = app!(db);

    let req = test::TestRequest::get().uri("/api/healthz").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/gamemodes").to_request();
    let v: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(v["gamemodes"].as_array().map(Vec::len), Some(4));
}
