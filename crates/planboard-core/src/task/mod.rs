//! Schedulable task model.
//!
//! A task carries two schedules:
//!
//! - the *persisted* schedule (`start_date`, `due_date`, `week_number`), which is
//!   what the store holds and what overdue checks read;
//! - an optional *visual* schedule (`visual_start_date`, `visual_week_number`)
//!   that only changes which bucket the task is drawn in.
//!
//! ```text
//!            persisted                 visual
//!   start_date ─┐                ┌─ visual_start_date
//!   due_date    ├─ overdue? ──X  │   (never read for overdue)
//!   week_number ┘                └─ visual_week_number
//!                     effective bucket = visual ?? persisted
//! ```

pub mod board;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use board::TaskBoard;

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// A schedulable work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is completed
    #[serde(default)]
    pub completed: bool,
    /// Priority level
    #[serde(default)]
    pub priority: Priority,
    /// Persisted start date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Persisted due date (drives overdue detection)
    pub due_date: NaiveDate,
    /// Persisted week bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u32>,
    /// Optional category; also selects the weekday for week-level moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Study phase the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
    /// Main focus of the task's week, shown as the week header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_focus: Option<String>,
    /// Display-only start date override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_start_date: Option<NaiveDate>,
    /// Display-only week override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_week_number: Option<u32>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new incomplete task with a generated id.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            priority: Priority::default(),
            start_date: None,
            due_date,
            week_number: None,
            category: None,
            phase: None,
            primary_focus: None,
            visual_start_date: None,
            visual_week_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the persisted start date.
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Set the persisted week.
    pub fn with_week(mut self, week: u32) -> Self {
        self.week_number = Some(week);
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Overdue means incomplete with a persisted due date strictly before `today`.
    ///
    /// Visual fields are deliberately ignored.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }

    /// Week used for grouping: visual override first, then the persisted week.
    pub fn effective_week(&self) -> Option<u32> {
        self.visual_week_number.or(self.week_number)
    }

    /// Start date used for grouping: visual override first, then persisted.
    pub fn effective_start_date(&self) -> Option<NaiveDate> {
        self.visual_start_date.or(self.start_date)
    }

    /// Days between persisted start and due date (0 without a start date).
    pub fn due_offset_days(&self) -> i64 {
        self.start_date
            .map(|start| (self.due_date - start).num_days())
            .unwrap_or(0)
    }

    /// Whether this task carries a visual override.
    pub fn is_visually_moved(&self) -> bool {
        self.visual_week_number.is_some() || self.visual_start_date.is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{date, task};
    use super::*;

    #[test]
    fn overdue_reads_persisted_due_date_only() {
        let mut t = task("t1", "2025-05-10", Some(1));
        t.visual_week_number = Some(9);
        t.visual_start_date = Some(date("2025-07-07"));
        assert!(t.is_overdue(date("2025-05-11")));
        assert!(!t.is_overdue(date("2025-05-10")));
    }

    #[test]
    fn completed_task_is_never_overdue() {
        let mut t = task("t1", "2025-01-01", Some(1));
        t.completed = true;
        assert!(!t.is_overdue(date("2026-01-01")));
    }

    #[test]
    fn effective_week_prefers_visual() {
        let mut t = task("t1", "2025-05-10", Some(2));
        assert_eq!(t.effective_week(), Some(2));
        t.visual_week_number = Some(4);
        assert_eq!(t.effective_week(), Some(4));
    }

    #[test]
    fn due_offset_defaults_to_zero_without_start() {
        let t = task("t1", "2025-05-13", None);
        assert_eq!(t.due_offset_days(), 0);
        let t = t.with_start_date(date("2025-05-12"));
        assert_eq!(t.due_offset_days(), 1);
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let mut t = task("t1", "2025-05-13", Some(1));
        t.visual_week_number = Some(3);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["dueDate"], "2025-05-13");
        assert_eq!(json["weekNumber"], 1);
        assert_eq!(json["visualWeekNumber"], 3);
        assert!(json.get("startDate").is_none());
    }

    #[test]
    fn priority_defaults_to_medium_when_missing() {
        let json = r#"{
            "id": "a",
            "title": "Read",
            "dueDate": "2025-05-20",
            "createdAt": "2025-05-01T00:00:00Z",
            "updatedAt": "2025-05-01T00:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.completed);
        assert_eq!(t.week_number, None);
    }

    #[test]
    fn phase_and_focus_survive_reserialization() {
        let json = r#"{
            "id": "a",
            "title": "Polity revision",
            "dueDate": "2025-05-20",
            "phase": 2,
            "primaryFocus": "Polity",
            "createdAt": "2025-05-01T00:00:00Z",
            "updatedAt": "2025-05-01T00:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.phase, Some(2));
        assert_eq!(t.primary_focus.as_deref(), Some("Polity"));

        let out = serde_json::to_value(&t).unwrap();
        assert_eq!(out["phase"], 2);
        assert_eq!(out["primaryFocus"], "Polity");

        let bare = serde_json::to_value(task("b", "2025-05-20", None)).unwrap();
        assert!(bare.get("phase").is_none());
        assert!(bare.get("primaryFocus").is_none());
    }
}
