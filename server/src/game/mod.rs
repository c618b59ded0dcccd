pub mod effects;
pub mod experience;
pub mod leveling;
pub mod quests;
pub mod scoring;
pub mod stats;
pub mod types;
pub mod unlock;
