//! Embedded SQLite schema, applied in order at startup.

pub const MIGRATION_V1_CORE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname            TEXT    NOT NULL UNIQUE,
    role                TEXT    NOT NULL DEFAULT 'Player',

    kills               INTEGER NOT NULL DEFAULT 0,
    final_kills         INTEGER NOT NULL DEFAULT 0,
    deaths              INTEGER NOT NULL DEFAULT 0,
    final_deaths        INTEGER NOT NULL DEFAULT 0,
    beds_broken         INTEGER NOT NULL DEFAULT 0,
    wins                INTEGER NOT NULL DEFAULT 0,
    games_played        INTEGER NOT NULL DEFAULT 0,
    experience          INTEGER NOT NULL DEFAULT 0,
    iron_collected      INTEGER NOT NULL DEFAULT 0,
    gold_collected      INTEGER NOT NULL DEFAULT 0,
    diamond_collected   INTEGER NOT NULL DEFAULT 0,
    emerald_collected   INTEGER NOT NULL DEFAULT 0,
    items_purchased     INTEGER NOT NULL DEFAULT 0,

    kitpvp_kills        INTEGER NOT NULL DEFAULT 0,
    kitpvp_deaths       INTEGER NOT NULL DEFAULT 0,
    kitpvp_games        INTEGER NOT NULL DEFAULT 0,
    skywars_wins        INTEGER NOT NULL DEFAULT 0,
    skywars_kills       INTEGER NOT NULL DEFAULT 0,
    sumo_games_played   INTEGER NOT NULL DEFAULT 0,
    sumo_wins           INTEGER NOT NULL DEFAULT 0,
    sumo_losses         INTEGER NOT NULL DEFAULT 0,
    sumo_kills          INTEGER NOT NULL DEFAULT 0,
    sumo_deaths         INTEGER NOT NULL DEFAULT 0,
    sumo_winstreak      INTEGER NOT NULL DEFAULT 0,
    sumo_best_winstreak INTEGER NOT NULL DEFAULT 0,

    coins               INTEGER NOT NULL DEFAULT 0,
    reputation          INTEGER NOT NULL DEFAULT 0,
    karma               INTEGER NOT NULL DEFAULT 0,

    custom_role           TEXT,
    custom_role_color     TEXT,
    custom_role_emoji     TEXT,
    custom_role_purchased INTEGER NOT NULL DEFAULT 0,
    custom_role_tier      TEXT,
    custom_emoji_slots    INTEGER NOT NULL DEFAULT 0,
    selected_theme_id     INTEGER,

    password_hash       TEXT,
    created_at          TEXT    NOT NULL,
    last_updated        TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_players_experience ON players(experience DESC);

CREATE TABLE IF NOT EXISTS quests (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT    NOT NULL,
    description       TEXT    NOT NULL DEFAULT '',
    target_stat       TEXT    NOT NULL,
    target_value      INTEGER NOT NULL,
    category          TEXT    NOT NULL,
    difficulty        TEXT    NOT NULL,
    reward_xp         INTEGER NOT NULL DEFAULT 0,
    reward_coins      INTEGER NOT NULL DEFAULT 0,
    reward_reputation INTEGER NOT NULL DEFAULT 0,
    reward_karma      INTEGER NOT NULL DEFAULT 0,
    is_active         INTEGER NOT NULL DEFAULT 1,
    last_refresh      TEXT,
    created_at        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS player_quests (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id        INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    quest_id         INTEGER NOT NULL REFERENCES quests(id)  ON DELETE CASCADE,
    baseline_value   INTEGER NOT NULL DEFAULT 0,
    current_progress INTEGER NOT NULL DEFAULT 0,
    is_accepted      INTEGER NOT NULL DEFAULT 0,
    is_completed     INTEGER NOT NULL DEFAULT 0,
    accepted_at      TEXT,
    completed_at     TEXT,
    UNIQUE (player_id, quest_id)
);

CREATE TABLE IF NOT EXISTS achievements (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT    NOT NULL UNIQUE,
    title             TEXT    NOT NULL,
    description       TEXT    NOT NULL DEFAULT '',
    icon              TEXT    NOT NULL DEFAULT '',
    rarity            TEXT    NOT NULL,
    unlock_condition  TEXT    NOT NULL,
    reward_xp         INTEGER NOT NULL DEFAULT 0,
    reward_coins      INTEGER NOT NULL DEFAULT 0,
    reward_reputation INTEGER NOT NULL DEFAULT 0,
    is_hidden         INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS player_achievements (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id      INTEGER NOT NULL REFERENCES players(id)      ON DELETE CASCADE,
    achievement_id INTEGER NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
    earned_at      TEXT    NOT NULL,
    UNIQUE (player_id, achievement_id)
);
"#;

pub const MIGRATION_V2_SHOP: &str = r#"
CREATE TABLE IF NOT EXISTS shop_items (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL UNIQUE,
    display_name     TEXT    NOT NULL,
    description      TEXT    NOT NULL DEFAULT '',
    category         TEXT    NOT NULL,
    price_coins      INTEGER NOT NULL DEFAULT 0,
    price_reputation INTEGER NOT NULL DEFAULT 0,
    unlock_level     INTEGER NOT NULL DEFAULT 1,
    rarity           TEXT    NOT NULL,
    effect           TEXT    NOT NULL,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS shop_purchases (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id             INTEGER NOT NULL REFERENCES players(id)    ON DELETE CASCADE,
    item_id               INTEGER NOT NULL REFERENCES shop_items(id) ON DELETE CASCADE,
    price_paid_coins      INTEGER NOT NULL,
    price_paid_reputation INTEGER NOT NULL,
    non_consumable        INTEGER NOT NULL DEFAULT 0,
    purchased_at          TEXT    NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS uq_shop_purchases_owned
    ON shop_purchases(player_id, item_id) WHERE non_consumable = 1;

CREATE TABLE IF NOT EXISTS inventory_items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id  INTEGER NOT NULL REFERENCES players(id)    ON DELETE CASCADE,
    item_id    INTEGER NOT NULL REFERENCES shop_items(id) ON DELETE CASCADE,
    quantity   INTEGER NOT NULL DEFAULT 1,
    status     TEXT    NOT NULL DEFAULT 'unused',
    acquired_at TEXT   NOT NULL,
    used_at    TEXT
);

CREATE TABLE IF NOT EXISTS player_boosters (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id    INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    booster_type TEXT    NOT NULL,
    multiplier   REAL    NOT NULL,
    started_at   TEXT    NOT NULL,
    expires_at   TEXT    NOT NULL,
    is_active    INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS custom_titles (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    color        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS player_titles (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id  INTEGER NOT NULL REFERENCES players(id)       ON DELETE CASCADE,
    title_id   INTEGER NOT NULL REFERENCES custom_titles(id) ON DELETE CASCADE,
    is_active  INTEGER NOT NULL DEFAULT 0,
    unlocked_at TEXT   NOT NULL,
    UNIQUE (player_id, title_id)
);

CREATE TABLE IF NOT EXISTS gradient_themes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    colors      TEXT    NOT NULL,
    direction   TEXT    NOT NULL,
    is_animated INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS player_gradient_settings (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id   INTEGER NOT NULL REFERENCES players(id)         ON DELETE CASCADE,
    element     TEXT    NOT NULL,
    gradient_id INTEGER NOT NULL REFERENCES gradient_themes(id) ON DELETE CASCADE,
    UNIQUE (player_id, element)
);

CREATE TABLE IF NOT EXISTS site_themes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    primary_color TEXT NOT NULL
);
"#;

pub const MIGRATION_V3_ASCEND: &str = r#"
CREATE TABLE IF NOT EXISTS ascend_data (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id     INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    gamemode      TEXT    NOT NULL,
    skill1_name   TEXT    NOT NULL,
    skill1_score  INTEGER NOT NULL,
    skill1_tier   TEXT    NOT NULL,
    skill2_name   TEXT    NOT NULL,
    skill2_score  INTEGER NOT NULL,
    skill2_tier   TEXT    NOT NULL,
    skill3_name   TEXT    NOT NULL,
    skill3_score  INTEGER NOT NULL,
    skill3_tier   TEXT    NOT NULL,
    skill4_name   TEXT    NOT NULL,
    skill4_score  INTEGER NOT NULL,
    skill4_tier   TEXT    NOT NULL,
    overall_tier  TEXT    NOT NULL,
    previous_tier TEXT,
    comment       TEXT    NOT NULL DEFAULT '',
    evaluator     TEXT,
    global_rank   INTEGER NOT NULL DEFAULT 0,
    updated_at    TEXT    NOT NULL,
    UNIQUE (player_id, gamemode)
);

CREATE TABLE IF NOT EXISTS ascend_history (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id    INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    gamemode     TEXT    NOT NULL,
    old_tier     TEXT    NOT NULL,
    new_tier     TEXT    NOT NULL,
    old_scores   TEXT    NOT NULL,
    new_scores   TEXT    NOT NULL,
    change_type  TEXT    NOT NULL,
    evaluator    TEXT,
    comment      TEXT    NOT NULL DEFAULT '',
    created_at   TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ascend_history_player
    ON ascend_history(player_id, gamemode, created_at DESC);
"#;

pub const MIGRATION_V4_CLAN: &str = r#"
CREATE TABLE IF NOT EXISTS targets (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname          TEXT    NOT NULL,
    server            TEXT    NOT NULL DEFAULT '',
    gamemode          TEXT    NOT NULL DEFAULT '',
    reason            TEXT    NOT NULL DEFAULT '',
    priority          TEXT    NOT NULL,
    priority_rank     INTEGER NOT NULL,
    status            TEXT    NOT NULL,
    added_by          TEXT    NOT NULL,
    fragged_count     INTEGER NOT NULL DEFAULT 0,
    killed_count      INTEGER NOT NULL DEFAULT 0,
    exploded_count    INTEGER NOT NULL DEFAULT 0,
    slayed_count      INTEGER NOT NULL DEFAULT 0,
    destroyed_count   INTEGER NOT NULL DEFAULT 0,
    eliminated_count  INTEGER NOT NULL DEFAULT 0,
    rekt_count        INTEGER NOT NULL DEFAULT 0,
    obliterated_count INTEGER NOT NULL DEFAULT 0,
    bleeding_effect   INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT    NOT NULL,
    completed_at      TEXT
);

CREATE TABLE IF NOT EXISTS target_reactions (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    target_id  INTEGER NOT NULL REFERENCES targets(id) ON DELETE CASCADE,
    reaction   TEXT    NOT NULL,
    reacted_by TEXT    NOT NULL,
    created_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS candidates (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname    TEXT    NOT NULL UNIQUE,
    description TEXT    NOT NULL DEFAULT '',
    servers     TEXT    NOT NULL DEFAULT '[]',
    contact     TEXT    NOT NULL DEFAULT '',
    status      TEXT    NOT NULL,
    added_by    TEXT    NOT NULL,
    notes       TEXT    NOT NULL DEFAULT '',
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
"#;

pub fn all() -> [(&'static str, &'static str); 4] {
    [
        ("v1_core", MIGRATION_V1_CORE),
        ("v2_shop", MIGRATION_V2_SHOP),
        ("v3_ascend", MIGRATION_V3_ASCEND),
        ("v4_clan", MIGRATION_V4_CLAN),
    ]
}
