use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::cache;
use crate::db::models::Player;
use crate::error::{AppError, AppResult};
use crate::game::experience::auto_experience;
use crate::game::unlock::StatKey;

/// Columns the public leaderboard may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    Experience,
    Kills,
    FinalKills,
    BedsBroken,
    Wins,
    GamesPlayed,
    KdRatio,
    WinRate,
    Coins,
    Reputation,
}

impl LeaderboardSort {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaderboardSort::Experience => "experience",
            LeaderboardSort::Kills => "kills",
            LeaderboardSort::FinalKills => "final_kills",
            LeaderboardSort::BedsBroken => "beds_broken",
            LeaderboardSort::Wins => "wins",
            LeaderboardSort::GamesPlayed => "games_played",
            LeaderboardSort::KdRatio => "kd_ratio",
            LeaderboardSort::WinRate => "win_rate",
            LeaderboardSort::Coins => "coins",
            LeaderboardSort::Reputation => "reputation",
        }
    }

    fn order_expr(self) -> &'static str {
        match self {
            // kills / max(deaths, 1) equals kills when there are no deaths
            LeaderboardSort::KdRatio => "CAST(kills AS REAL) / MAX(deaths, 1)",
            LeaderboardSort::WinRate => {
                "CASE WHEN games_played > 0 THEN CAST(wins AS REAL) / games_played ELSE 0 END"
            }
            other => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatOp {
    Add,
    Subtract,
    Set,
}

impl StatOp {
    pub fn apply(self, current: i64, value: i64) -> i64 {
        let next = match self {
            StatOp::Add => current.saturating_add(value),
            StatOp::Subtract => current.saturating_sub(value),
            StatOp::Set => value,
        };
        next.max(0)
    }
}

/// Full stat edit; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsEdit {
    pub kills: Option<i64>,
    pub final_kills: Option<i64>,
    pub deaths: Option<i64>,
    pub final_deaths: Option<i64>,
    pub beds_broken: Option<i64>,
    pub wins: Option<i64>,
    pub games_played: Option<i64>,
    pub experience: Option<i64>,
    pub iron_collected: Option<i64>,
    pub gold_collected: Option<i64>,
    pub diamond_collected: Option<i64>,
    pub emerald_collected: Option<i64>,
    pub kitpvp_kills: Option<i64>,
    pub kitpvp_deaths: Option<i64>,
    pub kitpvp_games: Option<i64>,
    pub skywars_wins: Option<i64>,
    pub skywars_kills: Option<i64>,
    pub sumo_games_played: Option<i64>,
    pub sumo_wins: Option<i64>,
    pub sumo_losses: Option<i64>,
    pub sumo_kills: Option<i64>,
    pub sumo_deaths: Option<i64>,
    pub sumo_winstreak: Option<i64>,
    pub sumo_best_winstreak: Option<i64>,
    pub role: Option<String>,
}

impl StatsEdit {
    fn apply(&self, p: &mut Player) -> AppResult<()> {
        let fields: [(&str, Option<i64>, &mut i64); 24] = [
            ("kills", self.kills, &mut p.kills),
            ("final_kills", self.final_kills, &mut p.final_kills),
            ("deaths", self.deaths, &mut p.deaths),
            ("final_deaths", self.final_deaths, &mut p.final_deaths),
            ("beds_broken", self.beds_broken, &mut p.beds_broken),
            ("wins", self.wins, &mut p.wins),
            ("games_played", self.games_played, &mut p.games_played),
            ("experience", self.experience, &mut p.experience),
            ("iron_collected", self.iron_collected, &mut p.iron_collected),
            ("gold_collected", self.gold_collected, &mut p.gold_collected),
            ("diamond_collected", self.diamond_collected, &mut p.diamond_collected),
            ("emerald_collected", self.emerald_collected, &mut p.emerald_collected),
            ("kitpvp_kills", self.kitpvp_kills, &mut p.kitpvp_kills),
            ("kitpvp_deaths", self.kitpvp_deaths, &mut p.kitpvp_deaths),
            ("kitpvp_games", self.kitpvp_games, &mut p.kitpvp_games),
            ("skywars_wins", self.skywars_wins, &mut p.skywars_wins),
            ("skywars_kills", self.skywars_kills, &mut p.skywars_kills),
            ("sumo_games_played", self.sumo_games_played, &mut p.sumo_games_played),
            ("sumo_wins", self.sumo_wins, &mut p.sumo_wins),
            ("sumo_losses", self.sumo_losses, &mut p.sumo_losses),
            ("sumo_kills", self.sumo_kills, &mut p.sumo_kills),
            ("sumo_deaths", self.sumo_deaths, &mut p.sumo_deaths),
            ("sumo_winstreak", self.sumo_winstreak, &mut p.sumo_winstreak),
            ("sumo_best_winstreak", self.sumo_best_winstreak, &mut p.sumo_best_winstreak),
        ];
        for (name, value, slot) in fields {
            if let Some(v) = value {
                if v < 0 {
                    return Err(AppError::validation(format!("{name} must not be negative")));
                }
                *slot = v;
            }
        }
        if let Some(role) = &self.role {
            p.role = role.trim().to_string();
        }
        Ok(())
    }
}

/// Balance adjustments; coins and reputation may not go below zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EconomyGrant {
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub karma: i64,
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct GlobalStats {
    pub total_players: i64,
    pub total_kills: i64,
    pub total_final_kills: i64,
    pub total_beds_broken: i64,
    pub total_wins: i64,
    pub total_games: i64,
    pub total_experience: i64,
}

pub async fn fetch(db: &SqlitePool, id: i64) -> AppResult<Player> {
    let mut conn = db.acquire().await?;
    fetch_conn(&mut conn, id).await
}

/// Same as [`fetch`] but on a caller-owned connection or transaction.
pub async fn fetch_conn(conn: &mut SqliteConnection, id: i64) -> AppResult<Player> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(AppError::NotFound("player"))
}

pub async fn fetch_by_nickname(db: &SqlitePool, nickname: &str) -> AppResult<Player> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE nickname = ? COLLATE NOCASE")
        .bind(nickname)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("player"))
}

pub async fn create(db: &SqlitePool, nickname: &str, role: Option<&str>) -> AppResult<Player> {
    let nickname = nickname.trim();
    if nickname.is_empty() || nickname.len() > 32 {
        return Err(AppError::validation("nickname must be 1-32 characters"));
    }
    let now = Utc::now();
    let res = sqlx::query(
        "INSERT INTO players (nickname, role, created_at, last_updated) VALUES (?, ?, ?, ?)",
    )
    .bind(nickname)
    .bind(role.unwrap_or("Player"))
    .bind(now)
    .bind(now)
    .execute(db)
    .await
    .map_err(AppError::from);

    let id = match res {
        Ok(r) => r.last_insert_rowid(),
        Err(e) if e.is_unique_violation() => {
            return Err(AppError::validation(format!("player {nickname} already exists")))
        }
        Err(e) => return Err(e),
    };
    cache::invalidate_stats();
    log::info!("created player {nickname} (#{id})");
    fetch(db, id).await
}

pub async fn search(db: &SqlitePool, query: &str, limit: i64) -> AppResult<Vec<Player>> {
    let pattern = format!("%{}%", query.trim());
    Ok(sqlx::query_as::<_, Player>(
        "SELECT * FROM players WHERE nickname LIKE ? ORDER BY experience DESC LIMIT ?",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(db)
    .await?)
}

pub async fn leaderboard(
    db: &SqlitePool,
    sort: LeaderboardSort,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<Player>> {
    let sql = format!(
        "SELECT * FROM players ORDER BY {} DESC, experience DESC, id LIMIT ? OFFSET ?",
        sort.order_expr()
    );
    Ok(sqlx::query_as::<_, Player>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?)
}

pub async fn global_stats(db: &SqlitePool) -> AppResult<GlobalStats> {
    Ok(sqlx::query_as::<_, GlobalStats>(
        r#"SELECT COUNT(*)                        AS total_players,
                  COALESCE(SUM(kills), 0)         AS total_kills,
                  COALESCE(SUM(final_kills), 0)   AS total_final_kills,
                  COALESCE(SUM(beds_broken), 0)   AS total_beds_broken,
                  COALESCE(SUM(wins), 0)          AS total_wins,
                  COALESCE(SUM(games_played), 0)  AS total_games,
                  COALESCE(SUM(experience), 0)    AS total_experience
             FROM players"#,
    )
    .fetch_one(db)
    .await?)
}

async fn write_counters(conn: &mut SqliteConnection, p: &Player) -> AppResult<()> {
    sqlx::query(
        r#"UPDATE players SET
               role = ?, kills = ?, final_kills = ?, deaths = ?, final_deaths = ?,
               beds_broken = ?, wins = ?, games_played = ?, experience = ?,
               iron_collected = ?, gold_collected = ?, diamond_collected = ?, emerald_collected = ?,
               kitpvp_kills = ?, kitpvp_deaths = ?, kitpvp_games = ?,
               skywars_wins = ?, skywars_kills = ?,
               sumo_games_played = ?, sumo_wins = ?, sumo_losses = ?, sumo_kills = ?,
               sumo_deaths = ?, sumo_winstreak = ?, sumo_best_winstreak = ?,
               last_updated = ?
           WHERE id = ?"#,
    )
    .bind(&p.role)
    .bind(p.kills)
    .bind(p.final_kills)
    .bind(p.deaths)
    .bind(p.final_deaths)
    .bind(p.beds_broken)
    .bind(p.wins)
    .bind(p.games_played)
    .bind(p.experience)
    .bind(p.iron_collected)
    .bind(p.gold_collected)
    .bind(p.diamond_collected)
    .bind(p.emerald_collected)
    .bind(p.kitpvp_kills)
    .bind(p.kitpvp_deaths)
    .bind(p.kitpvp_games)
    .bind(p.skywars_wins)
    .bind(p.skywars_kills)
    .bind(p.sumo_games_played)
    .bind(p.sumo_wins)
    .bind(p.sumo_losses)
    .bind(p.sumo_kills)
    .bind(p.sumo_deaths)
    .bind(p.sumo_winstreak)
    .bind(p.sumo_best_winstreak)
    .bind(Utc::now())
    .bind(p.id)
    .execute(conn)
    .await
    .context("writing player counters")?;
    Ok(())
}

/// Replace counters from an admin edit; experience never drops below the
/// estimate implied by the new counters.
pub async fn update_stats(db: &SqlitePool, id: i64, edit: &StatsEdit) -> AppResult<Player> {
    let mut tx = db.begin().await?;
    let mut player = fetch_conn(&mut tx, id).await?;
    edit.apply(&mut player)?;
    player.experience = player.experience.max(auto_experience(&player));
    write_counters(&mut tx, &player).await?;
    tx.commit().await?;
    cache::invalidate_stats();
    fetch(db, id).await
}

pub async fn modify_stat(
    db: &SqlitePool,
    id: i64,
    stat: StatKey,
    op: StatOp,
    value: i64,
) -> AppResult<Player> {
    let column = stat
        .column()
        .ok_or_else(|| AppError::validation(format!("{stat} is computed and cannot be edited")))?;
    if value < 0 {
        return Err(AppError::validation("value must not be negative"));
    }

    let mut tx = db.begin().await?;
    let player = fetch_conn(&mut tx, id).await?;
    let next = op.apply(stat.read(&player) as i64, value);
    // column comes from the closed StatKey registry
    let sql = format!("UPDATE players SET {column} = ?, last_updated = ? WHERE id = ?");
    sqlx::query(&sql)
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    cache::invalidate_stats();
    log::info!("player #{id}: {column} {op:?} {value} -> {next}");
    fetch(db, id).await
}

pub async fn delete(db: &SqlitePool, id: i64) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("player"));
    }
    cache::invalidate_stats();
    Ok(())
}

/// Add balance deltas inside an existing transaction.
pub async fn credit(
    conn: &mut SqliteConnection,
    id: i64,
    experience: i64,
    coins: i64,
    reputation: i64,
    karma: i64,
) -> AppResult<()> {
    sqlx::query(
        r#"UPDATE players
              SET experience = experience + ?, coins = coins + ?,
                  reputation = reputation + ?, karma = karma + ?, last_updated = ?
            WHERE id = ?"#,
    )
    .bind(experience)
    .bind(coins)
    .bind(reputation)
    .bind(karma)
    .bind(Utc::now())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn grant_economy(db: &SqlitePool, id: i64, grant: EconomyGrant) -> AppResult<Player> {
    let mut tx = db.begin().await?;
    let player = fetch_conn(&mut tx, id).await?;
    if player.coins + grant.coins < 0 {
        return Err(AppError::validation("coins would become negative"));
    }
    if player.reputation + grant.reputation < 0 {
        return Err(AppError::validation("reputation would become negative"));
    }
    credit(&mut tx, id, 0, grant.coins, grant.reputation, grant.karma).await?;
    tx.commit().await?;
    cache::invalidate_stats();
    fetch(db, id).await
}

pub async fn set_password_hash(db: &SqlitePool, id: i64, hash: &str) -> AppResult<()> {
    let res = sqlx::query("UPDATE players SET password_hash = ? WHERE id = ?")
        .bind(hash)
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("player"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_ops_never_go_negative() {
        assert_eq!(StatOp::Add.apply(5, 3), 8);
        assert_eq!(StatOp::Subtract.apply(5, 8), 0);
        assert_eq!(StatOp::Set.apply(5, 2), 2);
    }

    #[test]
    fn edit_rejects_negative_counters() {
        let mut p = Player::default();
        let edit = StatsEdit {
            kills: Some(-1),
            ..StatsEdit::default()
        };
        assert!(edit.apply(&mut p).is_err());

        let edit = StatsEdit {
            kills: Some(10),
            wins: Some(2),
            ..StatsEdit::default()
        };
        edit.apply(&mut p).unwrap();
        assert_eq!((p.kills, p.wins, p.deaths), (10, 2, 0));
    }
}
