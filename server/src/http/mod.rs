pub mod achievements;
pub mod ascend;
pub mod auth;
pub mod candidates;
pub mod health;
pub mod inventory;
pub mod leaderboard;
pub mod players;
pub mod quests;
pub mod routes;
pub mod shop;
pub mod targets;
