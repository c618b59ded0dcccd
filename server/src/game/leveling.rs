//! Experience → level curve.
//!
//! Levels 1–100 come from a fixed threshold table; past the last entry every
//! level costs a flat 2500 XP, up to the level cap.

/// XP needed to *reach* each of levels 1..=100 (index 0 is level 1).
pub const LEVEL_THRESHOLDS: [i64; 100] = [
    0, 10000, 22500, 37500, 55000, 75000, 97500, 122500, 150000, 180000,
    212500, 247500, 285000, 325000, 367500, 412500, 460000, 510000, 562500, 617500,
    675000, 735000, 797500, 862500, 930000, 1000000, 1072500, 1147500, 1225000, 1305000,
    1387500, 1472500, 1560000, 1650000, 1742500, 1837500, 1935000, 2035000, 2137500, 2242500,
    2350000, 2460000, 2572500, 2687500, 2805000, 2925000, 3047500, 3172500, 3300000, 3430000,
    3562500, 3697500, 3835000, 3975000, 4117500, 4262500, 4410000, 4560000, 4712500, 4867500,
    5025000, 5185000, 5347500, 5512500, 5680000, 5850000, 6022500, 6197500, 6375000, 6555000,
    6737500, 6922500, 7110000, 7300000, 7492500, 7687500, 7885000, 8085000, 8287500, 8492500,
    8700000, 8910000, 9122500, 9337500, 9555000, 9775000, 9997500, 10222500, 10450000, 10680000,
    10912500, 11147500, 11385000, 11625000, 11867500, 12112500, 12360000, 12610000, 12862500, 13117500,
];

/// XP per level beyond the table.
pub const XP_PER_EXTRA_LEVEL: i64 = 2500;

pub const MAX_LEVEL: u32 = 1000;

const TABLE_TOP: i64 = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];

/// Level for a given amount of experience (always in `1..=MAX_LEVEL`).
pub fn level(experience: i64) -> u32 {
    if experience >= TABLE_TOP {
        let extra = (experience - TABLE_TOP) / XP_PER_EXTRA_LEVEL;
        let lvl = 100i64.saturating_add(extra);
        return lvl.min(MAX_LEVEL as i64) as u32;
    }

    // First threshold strictly above `experience`; its index is the level
    // we are still working towards.
    let next = LEVEL_THRESHOLDS
        .iter()
        .position(|&t| experience < t)
        .unwrap_or(LEVEL_THRESHOLDS.len());
    (next as u32).max(1)
}

/// XP at which `lvl` starts.
pub fn threshold_for(lvl: u32) -> i64 {
    let lvl = lvl.clamp(1, MAX_LEVEL);
    if lvl <= 100 {
        LEVEL_THRESHOLDS[(lvl - 1) as usize]
    } else {
        TABLE_TOP + (lvl as i64 - 100) * XP_PER_EXTRA_LEVEL
    }
}

/// Progress towards the next level, in percent with one decimal.
pub fn level_progress(experience: i64) -> f64 {
    let current = level(experience);
    if current >= MAX_LEVEL {
        return 100.0;
    }

    let floor = threshold_for(current);
    let ceil = threshold_for(current + 1);
    if ceil == floor {
        return 100.0;
    }

    let pct = (experience - floor) as f64 / (ceil - floor) as f64 * 100.0;
    crate::game::stats::round_to(pct, 1).clamp(0.0, 100.0)
}

/// Cosmetic features unlocked purely by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LevelPerks {
    pub basic_custom_role: bool,
    pub custom_avatars: bool,
    pub custom_banners: bool,
    pub customize_colors: bool,
    pub gradient_custom_role: bool,
    pub leaderboard_gradients: bool,
    pub animated_avatars: bool,
    pub leaderboard_animated_gradients: bool,
    pub static_gradients: bool,
    pub animated_banners: bool,
    pub animated_gradients: bool,
    pub free_custom_role: bool,
}

impl LevelPerks {
    pub fn for_level(lvl: u32) -> Self {
        LevelPerks {
            basic_custom_role: lvl >= 10,
            custom_avatars: lvl >= 20,
            custom_banners: lvl >= 30,
            customize_colors: lvl >= 40,
            gradient_custom_role: lvl >= 40,
            leaderboard_gradients: lvl >= 50,
            animated_avatars: lvl >= 70,
            leaderboard_animated_gradients: lvl >= 75,
            static_gradients: lvl >= 80,
            animated_banners: lvl >= 135,
            animated_gradients: lvl >= 150,
            free_custom_role: lvl >= 500,
        }
    }
}

/// Percent of the way to the free custom role (level 500).
pub fn free_custom_role_progress(lvl: u32) -> f64 {
    if lvl >= 500 {
        return 100.0;
    }
    crate::game::stats::round_to(lvl as f64 / 500.0 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_ascending() {
        assert!(LEVEL_THRESHOLDS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(TABLE_TOP, 13_117_500);
    }

    #[test]
    fn known_boundaries() {
        assert_eq!(level(0), 1);
        assert_eq!(level(9_999), 1);
        assert_eq!(level(10_000), 2);
        assert_eq!(level(22_499), 2);
        assert_eq!(level(22_500), 3);
        assert_eq!(level(13_117_499), 99);
        assert_eq!(level(13_117_500), 100);
        assert_eq!(level(13_119_999), 100);
        assert_eq!(level(13_120_000), 101);
    }

    #[test]
    fn negative_experience_is_level_one() {
        assert_eq!(level(-50), 1);
    }

    #[test]
    fn level_is_capped() {
        assert_eq!(level(i64::MAX / 2), MAX_LEVEL);
        let at_cap = TABLE_TOP + 900 * XP_PER_EXTRA_LEVEL;
        assert_eq!(level(at_cap), MAX_LEVEL);
        assert_eq!(level(at_cap - 1), MAX_LEVEL - 1);
    }

    #[test]
    fn level_is_monotonic() {
        let mut prev = level(0);
        let mut xp = 0;
        while xp < 16_000_000 {
            let l = level(xp);
            assert!(l >= prev, "level dropped at {xp}");
            assert!(l >= 1);
            prev = l;
            xp += 1_250;
        }
    }

    #[test]
    fn progress_interpolates_between_thresholds() {
        assert_eq!(level_progress(0), 0.0);
        assert_eq!(level_progress(5_000), 50.0);
        assert_eq!(level_progress(10_000), 0.0);
        // level 2 spans 10_000..22_500
        assert_eq!(level_progress(12_500), 20.0);
        // past the table: 2500 per level
        assert_eq!(level_progress(13_117_500 + 1_250), 50.0);
    }

    #[test]
    fn progress_is_full_at_cap() {
        assert_eq!(level_progress(TABLE_TOP + 900 * XP_PER_EXTRA_LEVEL), 100.0);
    }

    #[test]
    fn perks_follow_level() {
        let p = LevelPerks::for_level(45);
        assert!(p.basic_custom_role && p.custom_avatars && p.customize_colors);
        assert!(!p.leaderboard_gradients && !p.static_gradients);
        assert!(LevelPerks::for_level(500).free_custom_role);
        assert_eq!(free_custom_role_progress(250), 50.0);
    }
}
