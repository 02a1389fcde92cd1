//! Grouping tasks into day and week buckets.
//!
//! Grouping reads the *effective* schedule (visual override first, then
//! persisted), which is where visual moves become visible. Rollover reminders
//! are merged into week groups after the real tasks.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::calendar::WeekCalendar;
use crate::rollover::RolloverInstance;
use crate::task::Task;

/// Week a task is shown in.
///
/// Tasks with neither a visual nor a persisted week fall back to the week of
/// their effective start date, or of their due date.
pub fn effective_week(task: &Task, calendar: &WeekCalendar) -> u32 {
    task.effective_week().unwrap_or_else(|| {
        calendar.week_for_date(task.effective_start_date().unwrap_or(task.due_date))
    })
}

/// Day a task is shown on: effective start date, else due date.
pub fn effective_day(task: &Task) -> NaiveDate {
    task.effective_start_date().unwrap_or(task.due_date)
}

/// Tasks and reminders grouped by effective week, in ascending week order.
pub fn group_by_week<'a>(
    tasks: &'a [Task],
    reminders: &'a [RolloverInstance],
    calendar: &WeekCalendar,
) -> BTreeMap<u32, Vec<&'a Task>> {
    let mut groups: BTreeMap<u32, Vec<&'a Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(effective_week(task, calendar)).or_default().push(task);
    }
    for reminder in reminders {
        groups.entry(reminder.target_week).or_default().push(&reminder.task);
    }
    groups
}

/// Tasks grouped by effective day.
pub fn group_by_day(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(effective_day(task)).or_default().push(task);
    }
    groups
}
