//! Week numbering and bucket identities.
//!
//! Weeks are numbered from a configured Monday (week 1). Containers on the
//! board are identified by strings; day columns use `day-YYYY-MM-DD` and week
//! groups use `week-N`. Anything else is an opaque container the scheduling
//! layer refuses to move into.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::CalendarConfig;
use crate::task::Task;

/// Identity of a drop container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Container for a single calendar day.
    pub fn day(date: NaiveDate) -> Self {
        Self(format!("day-{}", date.format("%Y-%m-%d")))
    }

    /// Container for a week group.
    pub fn week(week: u32) -> Self {
        Self(format!("week-{week}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the id as a schedulable bucket, if it names one.
    pub fn bucket(&self) -> Option<Bucket> {
        if let Some(rest) = self.0.strip_prefix("day-") {
            return NaiveDate::parse_from_str(rest, "%Y-%m-%d")
                .ok()
                .map(Bucket::Day);
        }
        if let Some(rest) = self.0.strip_prefix("week-") {
            return rest.parse::<u32>().ok().filter(|w| *w > 0).map(Bucket::Week);
        }
        None
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A time bucket a container stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// An authoritative calendar day: moves here reschedule the task.
    Day(NaiveDate),
    /// A week grouping: moves here only reposition the card.
    Week(u32),
}

/// Week arithmetic anchored on the configured week-one Monday.
#[derive(Debug, Clone)]
pub struct WeekCalendar {
    config: CalendarConfig,
}

impl WeekCalendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// First day (Monday) of `week`, or `None` past the representable range.
    pub fn week_start_date(&self, week: u32) -> Option<NaiveDate> {
        let offset = i64::from(week.max(1) - 1) * 7;
        self.config
            .week_one_start
            .checked_add_signed(Duration::days(offset))
    }

    /// Week containing `date`, clamped to week 1 for dates before the anchor.
    pub fn week_for_date(&self, date: NaiveDate) -> u32 {
        let days = (date - self.config.week_one_start).num_days();
        if days < 0 {
            return 1;
        }
        u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
    }

    /// Whether `date` falls within the seven days of `week`.
    pub fn is_in_week(&self, date: NaiveDate, week: u32) -> bool {
        let Some(start) = self.week_start_date(week) else {
            return false;
        };
        date >= start && (date - start).num_days() <= 6
    }

    /// Weekday offset (0 = Monday) a task lands on when moved between weeks.
    ///
    /// Category wins; otherwise the persisted start date's weekday is kept;
    /// otherwise Monday.
    pub fn visual_day_offset(&self, task: &Task) -> u32 {
        if let Some(category) = &task.category {
            return self
                .config
                .category_day_offsets
                .get(category)
                .copied()
                .unwrap_or(self.config.default_category_offset)
                .min(6);
        }
        task.start_date
            .map(|d| d.weekday().num_days_from_monday())
            .unwrap_or(0)
    }

    /// Visual start date for `task` when shown in `week`.
    pub fn visual_start_in_week(&self, task: &Task, week: u32) -> Option<NaiveDate> {
        self.week_start_date(week)?
            .checked_add_signed(Duration::days(i64::from(self.visual_day_offset(task))))
    }
}

impl Default for WeekCalendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{date, task};

    #[test]
    fn container_ids_parse_into_buckets() {
        assert_eq!(
            ContainerId::from("day-2025-05-14").bucket(),
            Some(Bucket::Day(date("2025-05-14")))
        );
        assert_eq!(ContainerId::from("week-12").bucket(), Some(Bucket::Week(12)));
        assert_eq!(ContainerId::from("week-0").bucket(), None);
        assert_eq!(ContainerId::from("day-2025-13-40").bucket(), None);
        assert_eq!(ContainerId::from("sidebar").bucket(), None);
    }

    #[test]
    fn constructors_round_trip() {
        assert_eq!(ContainerId::day(date("2025-05-12")).as_str(), "day-2025-05-12");
        assert_eq!(ContainerId::week(3).bucket(), Some(Bucket::Week(3)));
    }

    #[test]
    fn week_numbering_from_anchor() {
        let cal = WeekCalendar::default();
        assert_eq!(cal.week_start_date(1), Some(date("2025-05-12")));
        assert_eq!(cal.week_start_date(2), Some(date("2025-05-19")));
        assert_eq!(cal.week_for_date(date("2025-05-18")), 1);
        assert_eq!(cal.week_for_date(date("2025-05-19")), 2);
        assert_eq!(cal.week_for_date(date("2025-01-01")), 1);
        assert!(cal.is_in_week(date("2025-05-25"), 2));
        assert!(!cal.is_in_week(date("2025-05-26"), 2));
    }

    #[test]
    fn visual_offset_prefers_category_then_weekday() {
        let mut config = CalendarConfig::default();
        config.category_day_offsets.insert("Weekly Test".into(), 6);
        let cal = WeekCalendar::new(config);

        let tagged = task("a", "2025-05-14", Some(1)).with_category("Weekly Test");
        assert_eq!(cal.visual_day_offset(&tagged), 6);

        let other = task("b", "2025-05-14", Some(1)).with_category("Reading");
        assert_eq!(cal.visual_day_offset(&other), 3);

        // 2025-05-14 is a Wednesday.
        let dated = task("c", "2025-05-15", Some(1)).with_start_date(date("2025-05-14"));
        assert_eq!(cal.visual_day_offset(&dated), 2);

        let bare = task("d", "2025-05-15", Some(1));
        assert_eq!(cal.visual_day_offset(&bare), 0);
        assert_eq!(cal.visual_start_in_week(&dated, 3), Some(date("2025-05-28")));
    }

    #[test]
    fn far_weeks_are_out_of_range_not_fatal() {
        let cal = WeekCalendar::default();
        assert_eq!(cal.week_start_date(u32::MAX), None);
        assert!(!cal.is_in_week(date("2025-05-14"), u32::MAX));
        let t = task("a", "2025-05-14", Some(1));
        assert_eq!(cal.visual_start_in_week(&t, u32::MAX), None);
    }
}
