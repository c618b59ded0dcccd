//! Quest progress and periodic rollover rules.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::game::types::QuestCategory;

/// What a refresh pass should do with a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// Nothing to do.
    None,
    /// Periodic quest never stamped; only record `last_refresh`.
    StampOnly,
    /// Period changed: wipe every player's progress and stamp.
    Reset,
}

fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

pub fn rollover(
    category: QuestCategory,
    last_refresh: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Rollover {
    let today = now.date_naive();
    match (category, last_refresh) {
        (QuestCategory::Daily | QuestCategory::Weekly | QuestCategory::Monthly, None) => {
            Rollover::StampOnly
        }
        (QuestCategory::Daily, Some(last)) if last.date_naive() < today => Rollover::Reset,
        (QuestCategory::Weekly, Some(last)) if week_start(last.date_naive()) < week_start(today) => {
            Rollover::Reset
        }
        (QuestCategory::Monthly, Some(last))
            if (last.year(), last.month()) < (now.year(), now.month()) =>
        {
            Rollover::Reset
        }
        _ => Rollover::None,
    }
}

/// Progress since acceptance; never negative.
pub fn progress(current: i64, baseline: i64) -> i64 {
    (current - baseline).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn daily_resets_only_on_new_day() {
        let now = at(2024, 5, 10, 0);
        assert_eq!(rollover(QuestCategory::Daily, None, now), Rollover::StampOnly);
        assert_eq!(
            rollover(QuestCategory::Daily, Some(at(2024, 5, 9, 23)), now),
            Rollover::Reset
        );
        assert_eq!(
            rollover(QuestCategory::Daily, Some(at(2024, 5, 10, 0)), at(2024, 5, 10, 22)),
            Rollover::None
        );
    }

    #[test]
    fn weekly_uses_monday_boundaries() {
        // 2024-05-12 is a Sunday, 2024-05-13 a Monday
        let sunday = at(2024, 5, 12, 20);
        let monday = at(2024, 5, 13, 1);
        assert_eq!(
            rollover(QuestCategory::Weekly, Some(at(2024, 5, 6, 9)), sunday),
            Rollover::None
        );
        assert_eq!(
            rollover(QuestCategory::Weekly, Some(sunday), monday),
            Rollover::Reset
        );
        assert_eq!(rollover(QuestCategory::Weekly, None, monday), Rollover::StampOnly);
    }

    #[test]
    fn monthly_rolls_over_year_end() {
        assert_eq!(
            rollover(QuestCategory::Monthly, Some(at(2023, 12, 31, 12)), at(2024, 1, 1, 0)),
            Rollover::Reset
        );
        assert_eq!(
            rollover(QuestCategory::Monthly, Some(at(2024, 1, 2, 0)), at(2024, 1, 31, 0)),
            Rollover::None
        );
    }

    #[test]
    fn permanent_quests_never_roll_over() {
        for cat in [QuestCategory::Permanent, QuestCategory::Thematic, QuestCategory::Mythic] {
            assert_eq!(rollover(cat, None, at(2024, 1, 1, 0)), Rollover::None);
        }
    }

    #[test]
    fn progress_clamps_at_zero() {
        assert_eq!(progress(10, 4), 6);
        assert_eq!(progress(3, 5), 0);
    }
}
