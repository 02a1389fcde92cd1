//! Overdue rollover projection.
//!
//! Overdue, incomplete tasks are echoed into later weeks as display-only
//! reminders. A reminder is a copy of the task with a synthetic id and a
//! `visual_week_number`; its persisted schedule is the original's, so asking a
//! reminder whether it is overdue always answers for the real task.
//!
//! # Usage
//! ```rust,ignore
//! use planboard_core::rollover::RolloverEngine;
//!
//! let engine = RolloverEngine::new();
//! let reminders = engine.generate(board.tasks(), current_week, today);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::RolloverConfig;
use crate::task::Task;

/// Separator between the original id and the target week in a reminder id.
pub const ROLLOVER_SEPARATOR: &str = "-rollover-week-";

/// A virtual reminder of an overdue task in a later week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverInstance {
    /// Id of the real task this reminder points at.
    pub original_id: String,
    /// Week the reminder is shown in.
    pub target_week: u32,
    /// Display copy; `id` is synthetic and `visual_week_number == target_week`.
    pub task: Task,
}

/// Synthetic id for the reminder of `original_id` in `week`.
pub fn rollover_id(original_id: &str, week: u32) -> String {
    format!("{original_id}{ROLLOVER_SEPARATOR}{week}")
}

/// Whether `id` names a reminder rather than a real task.
pub fn is_rollover_id(id: &str) -> bool {
    split_rollover_id(id).is_some()
}

/// The real task id behind a reminder id, or `id` itself for real tasks.
pub fn original_id(id: &str) -> &str {
    split_rollover_id(id).map(|(orig, _)| orig).unwrap_or(id)
}

fn split_rollover_id(id: &str) -> Option<(&str, u32)> {
    let (orig, week) = id.rsplit_once(ROLLOVER_SEPARATOR)?;
    if orig.is_empty() {
        return None;
    }
    week.parse::<u32>().ok().map(|w| (orig, w))
}

/// Produce reminders for every overdue incomplete task.
///
/// Offsets `0..=max_weeks_ahead` from `current_week` are considered and a
/// reminder is emitted only for weeks strictly after the task's own week
/// (tasks without a week count as week 1). Output order follows input order,
/// then ascending week. No input is mutated.
pub fn generate(
    items: &[Task],
    current_week: u32,
    max_weeks_ahead: u32,
    today: NaiveDate,
) -> Vec<RolloverInstance> {
    items
        .iter()
        .filter(|task| task.is_overdue(today))
        .flat_map(|task| {
            let original_week = task.week_number.filter(|w| *w > 0).unwrap_or(1);
            (0..=max_weeks_ahead)
                .filter_map(move |offset| current_week.checked_add(offset))
                .filter(move |week| *week > original_week)
                .map(move |week| reminder(task, week))
        })
        .collect()
}

fn reminder(task: &Task, week: u32) -> RolloverInstance {
    let mut copy = task.clone();
    copy.id = rollover_id(&task.id, week);
    copy.visual_week_number = Some(week);
    RolloverInstance {
        original_id: task.id.clone(),
        target_week: week,
        task: copy,
    }
}

/// Rollover generation bound to a configured horizon.
pub struct RolloverEngine {
    max_weeks_ahead: u32,
}

impl RolloverEngine {
    /// Engine with the default ten-week horizon
    pub fn new() -> Self {
        Self::with_config(&RolloverConfig::default())
    }

    /// Engine using the configured horizon
    pub fn with_config(config: &RolloverConfig) -> Self {
        Self {
            max_weeks_ahead: config.max_weeks_ahead,
        }
    }

    pub fn max_weeks_ahead(&self) -> u32 {
        self.max_weeks_ahead
    }

    /// See [`generate`].
    pub fn generate(
        &self,
        items: &[Task],
        current_week: u32,
        today: NaiveDate,
    ) -> Vec<RolloverInstance> {
        let reminders = generate(items, current_week, self.max_weeks_ahead, today);
        tracing::debug!(
            current_week,
            horizon = self.max_weeks_ahead,
            count = reminders.len(),
            "generated rollover reminders"
        );
        reminders
    }
}

impl Default for RolloverEngine {
    fn default() -> Self {
        Self::new()
    }
}
