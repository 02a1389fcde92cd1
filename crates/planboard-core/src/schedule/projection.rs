//! Turning a drop into a schedule change.
//!
//! | destination       | effect                                                   |
//! |-------------------|----------------------------------------------------------|
//! | `day-YYYY-MM-DD`  | persisted move; start = that day, due keeps its offset    |
//! | `week-N`          | visual move; start = week start + category/weekday offset |
//! | anything else     | rejected, board unchanged                                |

use chrono::{Duration, NaiveDate};

use crate::calendar::{Bucket, ContainerId, WeekCalendar};
use crate::error::ProjectionError;
use crate::rollover::is_rollover_id;
use crate::task::board::{MoveReceipt, TaskBoard};
use crate::task::Task;

/// New persisted schedule for a task dropped on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPlan {
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub week_number: u32,
}

/// Applies drops to a [`TaskBoard`] using a [`WeekCalendar`].
#[derive(Debug, Clone, Default)]
pub struct Projector {
    calendar: WeekCalendar,
}

impl Projector {
    pub fn new(calendar: WeekCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &WeekCalendar {
        &self.calendar
    }

    /// Plan a drop of `task` onto `day`.
    ///
    /// The start-to-due gap is preserved; tasks without a start date end up
    /// due on the day itself.
    ///
    /// # Errors
    /// Returns [`ProjectionError::DateOutOfRange`] if the due date overflows.
    pub fn plan_day_drop(&self, task: &Task, day: NaiveDate) -> Result<DayPlan, ProjectionError> {
        let due_date = day
            .checked_add_signed(Duration::days(task.due_offset_days()))
            .ok_or_else(|| ProjectionError::DateOutOfRange(task.id.clone()))?;
        Ok(DayPlan {
            start_date: day,
            due_date,
            week_number: self.calendar.week_for_date(day),
        })
    }

    /// Apply a resolved drop of `item_id` from `from` to `to`.
    ///
    /// # Errors
    /// All errors leave the board unchanged: reminders cannot be moved, both
    /// containers must be schedulable buckets of the same kind, and the task
    /// must still exist.
    pub fn apply_drop(
        &self,
        board: &mut TaskBoard,
        item_id: &str,
        from: &ContainerId,
        to: &ContainerId,
    ) -> Result<MoveReceipt, ProjectionError> {
        if is_rollover_id(item_id) {
            return Err(ProjectionError::VirtualItem(item_id.to_string()));
        }
        let source = from
            .bucket()
            .ok_or_else(|| ProjectionError::UnknownBucket(from.to_string()))?;
        let destination = to
            .bucket()
            .ok_or_else(|| ProjectionError::UnknownBucket(to.to_string()))?;

        let receipt = match (source, destination) {
            (Bucket::Day(_), Bucket::Day(day)) => {
                let task = board
                    .get(item_id)
                    .ok_or_else(|| ProjectionError::TaskNotFound(item_id.to_string()))?;
                let plan = self.plan_day_drop(task, day)?;
                board.persisted_move(item_id, plan.start_date, plan.due_date, plan.week_number)?
            }
            (Bucket::Week(_), Bucket::Week(week)) => {
                let task = board
                    .get(item_id)
                    .ok_or_else(|| ProjectionError::TaskNotFound(item_id.to_string()))?;
                let start = self
                    .calendar
                    .visual_start_in_week(task, week)
                    .ok_or_else(|| ProjectionError::DateOutOfRange(item_id.to_string()))?;
                board.visual_move(item_id, week, Some(start))?
            }
            _ => {
                return Err(ProjectionError::MixedBuckets {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        };

        tracing::info!(
            task_id = item_id,
            %from,
            %to,
            kind = ?receipt.kind,
            changed = receipt.changed(),
            "drop applied"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CalendarConfig;
    use crate::task::board::MoveKind;
    use crate::task::fixtures::{date, task};

    fn board() -> TaskBoard {
        TaskBoard::from_tasks(vec![
            task("t1", "2025-05-13", Some(1)).with_start_date(date("2025-05-12")),
            task("t2", "2025-05-14", Some(1)),
            task("t3", "2025-05-16", Some(1)).with_category("Weekly Test"),
        ])
    }

    #[test]
    fn day_drop_preserves_offset() {
        let projector = Projector::default();
        let mut b = board();
        let receipt = projector
            .apply_drop(&mut b, "t1", &"day-2025-05-12".into(), &"day-2025-05-14".into())
            .unwrap();
        assert_eq!(receipt.kind, MoveKind::Persisted);
        let t1 = b.get("t1").unwrap();
        assert_eq!(t1.start_date, Some(date("2025-05-14")));
        assert_eq!(t1.due_date, date("2025-05-15"));
        assert_eq!(t1.due_offset_days(), 1);
    }

    #[test]
    fn day_drop_recomputes_week() {
        let projector = Projector::default();
        let mut b = board();
        projector
            .apply_drop(&mut b, "t2", &"day-2025-05-14".into(), &"day-2025-05-27".into())
            .unwrap();
        let t2 = b.get("t2").unwrap();
        assert_eq!(t2.week_number, Some(3));
        assert_eq!(t2.start_date, Some(date("2025-05-27")));
        assert_eq!(t2.due_date, date("2025-05-27"));
    }

    #[test]
    fn week_drop_only_touches_visual_fields() {
        let mut config = CalendarConfig::default();
        config.category_day_offsets.insert("Weekly Test".into(), 6);
        let projector = Projector::new(WeekCalendar::new(config));
        let mut b = board();
        let before = b.get("t3").unwrap().clone();

        let receipt = projector
            .apply_drop(&mut b, "t3", &"week-1".into(), &"week-2".into())
            .unwrap();
        assert_eq!(receipt.kind, MoveKind::Visual);

        let t3 = b.get("t3").unwrap();
        assert_eq!(t3.visual_week_number, Some(2));
        assert_eq!(t3.visual_start_date, Some(date("2025-05-25")));
        assert_eq!(t3.due_date, before.due_date);
        assert_eq!(t3.week_number, before.week_number);
        assert_eq!(t3.start_date, before.start_date);
    }

    #[test]
    fn default_calendar_places_known_categories() {
        let projector = Projector::default();
        let mut b = TaskBoard::from_tasks(vec![
            task("gs", "2025-05-16", Some(1)).with_category("GS Subject 1"),
            task("ca", "2025-05-16", Some(1)).with_category("Current Affairs"),
        ]);
        projector
            .apply_drop(&mut b, "gs", &"week-1".into(), &"week-3".into())
            .unwrap();
        projector
            .apply_drop(&mut b, "ca", &"week-1".into(), &"week-3".into())
            .unwrap();
        assert_eq!(b.get("gs").unwrap().visual_start_date, Some(date("2025-05-26")));
        assert_eq!(b.get("ca").unwrap().visual_start_date, Some(date("2025-05-30")));
    }

    #[test]
    fn week_past_calendar_range_is_rejected() {
        let projector = Projector::default();
        let mut b = board();
        let before = b.tasks().to_vec();
        assert_eq!(
            projector.apply_drop(&mut b, "t1", &"week-1".into(), &"week-4294967295".into()),
            Err(ProjectionError::DateOutOfRange("t1".into()))
        );
        assert_eq!(b.tasks(), &before[..]);
    }

    #[test]
    fn rejected_drops_leave_board_unchanged() {
        let projector = Projector::default();
        let mut b = board();
        let before = b.tasks().to_vec();

        assert_eq!(
            projector.apply_drop(&mut b, "t1", &"week-1".into(), &"day-2025-05-14".into()),
            Err(ProjectionError::MixedBuckets {
                from: "week-1".into(),
                to: "day-2025-05-14".into(),
            })
        );
        assert_eq!(
            projector.apply_drop(&mut b, "t1", &"week-1".into(), &"sidebar".into()),
            Err(ProjectionError::UnknownBucket("sidebar".into()))
        );
        assert_eq!(
            projector.apply_drop(&mut b, "gone", &"week-1".into(), &"week-2".into()),
            Err(ProjectionError::TaskNotFound("gone".into()))
        );
        assert_eq!(
            projector.apply_drop(&mut b, "t1-rollover-week-3", &"week-3".into(), &"week-4".into()),
            Err(ProjectionError::VirtualItem("t1-rollover-week-3".into()))
        );
        assert_eq!(b.tasks(), before.as_slice());
    }
}
