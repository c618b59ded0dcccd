//! Session login (admin + player) and the request extractors guarding the API.
//!
//! A session is an HS256 JWT carried in the `session` cookie, or as a
//! `Bearer` token for the Discord bot.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{post, web, HttpResponse};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::settings;
use crate::db::player_repo;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Nickname of the logged-in player, if any.
    pub player_nickname: Option<String>,
    pub is_admin: bool,
    pub exp: usize,
}

#[derive(Deserialize)]
pub struct AdminLoginReq {
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub nickname: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SetPasswordReq {
    pub password: String,
}

//////////////////////////////////////////////////
// ─────────────  Session extractors  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::{Claims, SESSION_COOKIE};
    use crate::config::settings;
    use crate::error::AppError;
    use actix_web::{dev::Payload, FromRequest, HttpRequest};
    use futures_util::future::{ready, Ready};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn claims(req: &HttpRequest) -> Result<Claims, AppError> {
        let token = req
            .cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| {
                req.headers()
                    .get("Authorization")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .map(str::to_string)
            })
            .ok_or_else(|| AppError::Unauthorized("login required".into()))?;

        decode::<Claims>(
            &token,
            &DecodingKey::from_secret(settings().session_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("invalid or expired session".into()))
    }

    /// Any valid session.
    #[derive(Debug, Clone)]
    pub struct Session {
        pub player_nickname: Option<String>,
        pub is_admin: bool,
    }

    impl Session {
        /// Name recorded as the author of clan list changes.
        pub fn actor(&self) -> String {
            match (&self.player_nickname, self.is_admin) {
                (Some(n), _) => n.clone(),
                (None, true) => "admin".into(),
                (None, false) => "unknown".into(),
            }
        }
    }

    impl FromRequest for Session {
        type Error = AppError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(claims(req).map(|c| Session {
                player_nickname: c.player_nickname,
                is_admin: c.is_admin,
            }))
        }
    }

    /// Admin-only guard.
    #[derive(Debug, Clone)]
    pub struct AdminAuth(pub Session);

    impl FromRequest for AdminAuth {
        type Error = AppError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(claims(req).and_then(|c| {
                if c.is_admin {
                    Ok(AdminAuth(Session {
                        player_nickname: c.player_nickname,
                        is_admin: true,
                    }))
                } else {
                    Err(AppError::Forbidden("admin access required".into()))
                }
            }))
        }
    }

    /// A logged-in player.
    #[derive(Debug, Clone)]
    pub struct PlayerAuth {
        pub nickname: String,
    }

    impl FromRequest for PlayerAuth {
        type Error = AppError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            ready(claims(req).and_then(|c| {
                c.player_nickname
                    .map(|nickname| PlayerAuth { nickname })
                    .ok_or_else(|| AppError::Unauthorized("player login required".into()))
            }))
        }
    }
}
pub use extractor::{AdminAuth, PlayerAuth, Session};

/// Admins may act for anyone; players only for themselves.
pub async fn authorize_player(
    session: &Session,
    db: &SqlitePool,
    player_id: i64,
) -> Result<(), AppError> {
    if session.is_admin {
        return Ok(());
    }
    let player = player_repo::fetch(db, player_id).await?;
    match &session.player_nickname {
        Some(n) if n.eq_ignore_ascii_case(&player.nickname) => Ok(()),
        _ => Err(AppError::Forbidden("you can only act for your own account".into())),
    }
}

/// Sign a session token valid for `SESSION_TTL_HOURS`.
pub fn issue_token(player_nickname: Option<String>, is_admin: bool) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::hours(settings().session_ttl_hours)).timestamp() as usize;
    let claims = Claims {
        player_nickname,
        is_admin,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings().session_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("signing session token: {e}")))
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing password: {e}")))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn session_response(token: String) -> HttpResponse {
    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(settings().session_ttl_hours))
        .finish();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true, "token": token }))
}

//////////////////////////////////////////////////
// POST /api/auth/admin
//////////////////////////////////////////////////
#[post("/auth/admin")]
pub async fn admin_login(info: web::Json<AdminLoginReq>) -> Result<HttpResponse, AppError> {
    let expected = &settings().admin_password;
    if expected.is_empty() {
        return Err(AppError::Unauthorized("admin login is disabled".into()));
    }
    if info.password != *expected {
        log::warn!("failed admin login attempt");
        return Err(AppError::Unauthorized("wrong password".into()));
    }
    Ok(session_response(issue_token(None, true)?))
}

//////////////////////////////////////////////////
// POST /api/auth/login
//////////////////////////////////////////////////
#[post("/auth/login")]
pub async fn player_login(
    info: web::Json<LoginReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let bad = || AppError::Unauthorized("wrong nickname or password".into());
    let player = player_repo::fetch_by_nickname(&db, &info.nickname)
        .await
        .map_err(|_| bad())?;
    let stored = player.password_hash.as_deref().ok_or_else(bad)?;
    if !verify_password(&info.password, stored) {
        return Err(bad());
    }
    log::info!("player {} logged in", player.nickname);
    Ok(session_response(issue_token(Some(player.nickname), false)?))
}

//////////////////////////////////////////////////
// POST /api/auth/logout
//////////////////////////////////////////////////
#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true }))
}

//////////////////////////////////////////////////
// POST /api/player/{id}/password   (admin)
//////////////////////////////////////////////////
#[post("/player/{id}/password")]
pub async fn set_password(
    _admin: AdminAuth,
    path: web::Path<i64>,
    info: web::Json<SetPasswordReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    if info.password.chars().count() < 6 {
        return Err(AppError::validation("password must be at least 6 characters"));
    }
    let hash = hash_password(&info.password)?;
    player_repo::set_password_hash(&db, path.into_inner(), &hash).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_login)
        .service(player_login)
        .service(logout)
        .service(set_password);
}
