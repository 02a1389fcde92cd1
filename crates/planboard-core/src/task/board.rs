//! In-memory task board with optimistic schedule moves.
//!
//! The board is the single owner of task state for a session. Moves are
//! applied here synchronously; persistence happens afterwards and its result
//! is folded back in with [`TaskBoard::settle`].

use chrono::{NaiveDate, Utc};

use crate::error::ProjectionError;
use crate::events::BoardEvent;
use crate::rollover::is_rollover_id;
use crate::schedule::SaveOutcome;
use crate::storage::FailurePolicy;

use super::Task;

/// Which schedule a move wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Start, due and week were overwritten.
    Persisted,
    /// Only the visual week/start were written.
    Visual,
}

/// Result of an applied move: the task before and after.
///
/// `task` is what must be handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReceipt {
    pub kind: MoveKind,
    pub previous: Task,
    pub task: Task,
}

impl MoveReceipt {
    /// Whether the move changed anything.
    pub fn changed(&self) -> bool {
        self.previous != self.task
    }

    /// Notification describing the applied change.
    pub fn event(&self) -> BoardEvent {
        let at = Utc::now();
        match self.kind {
            MoveKind::Persisted => BoardEvent::TaskRescheduled {
                task_id: self.task.id.clone(),
                start_date: self.task.start_date,
                due_date: self.task.due_date,
                week_number: self.task.week_number,
                at,
            },
            MoveKind::Visual => BoardEvent::TaskRepositioned {
                task_id: self.task.id.clone(),
                visual_week_number: self.task.visual_week_number.unwrap_or_default(),
                visual_start_date: self.task.visual_start_date,
                at,
            },
        }
    }
}

/// Ordered collection of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board seeded from stored tasks, in stored order.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    // ── CRUD ───────────────────────────────────────────────────────────

    /// Insert a task, replacing any task with the same id in place.
    pub fn add(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Replace an existing task.
    ///
    /// # Errors
    /// Returns [`ProjectionError::TaskNotFound`] if no task has this id.
    pub fn update(&mut self, task: Task) -> Result<(), ProjectionError> {
        let slot = self.find_mut(&task.id)?;
        *slot = task;
        slot.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a task and return it.
    ///
    /// # Errors
    /// Returns [`ProjectionError::TaskNotFound`] if no task has this id.
    pub fn delete(&mut self, id: &str) -> Result<Task, ProjectionError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| self.missing(id))?;
        Ok(self.tasks.remove(pos))
    }

    /// Flip completion and return the new state.
    ///
    /// # Errors
    /// Returns [`ProjectionError::TaskNotFound`] if no task has this id.
    pub fn toggle(&mut self, id: &str) -> Result<bool, ProjectionError> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        task.updated_at = Utc::now();
        Ok(task.completed)
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Incomplete tasks whose persisted due date is before `today`.
    pub fn overdue(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_overdue(today)).collect()
    }

    // ── Moves ──────────────────────────────────────────────────────────

    /// Overwrite the persisted schedule of `id`.
    ///
    /// Visual overrides are cleared so the task shows where it now lives.
    /// Re-applying the same schedule leaves the task untouched.
    ///
    /// # Errors
    /// Fails without touching the board if the task is missing or virtual.
    pub fn persisted_move(
        &mut self,
        id: &str,
        start_date: NaiveDate,
        due_date: NaiveDate,
        week_number: u32,
    ) -> Result<MoveReceipt, ProjectionError> {
        let task = self.find_mut(id)?;
        let previous = task.clone();

        let mut next = previous.clone();
        next.start_date = Some(start_date);
        next.due_date = due_date;
        next.week_number = Some(week_number);
        next.visual_start_date = None;
        next.visual_week_number = None;

        Ok(commit(task, previous, next, MoveKind::Persisted))
    }

    /// Write only the visual placement of `id`.
    ///
    /// Persisted start, due and week are never touched.
    ///
    /// # Errors
    /// Fails without touching the board if the task is missing or virtual.
    pub fn visual_move(
        &mut self,
        id: &str,
        visual_week_number: u32,
        visual_start_date: Option<NaiveDate>,
    ) -> Result<MoveReceipt, ProjectionError> {
        let task = self.find_mut(id)?;
        let previous = task.clone();

        let mut next = previous.clone();
        next.visual_week_number = Some(visual_week_number);
        next.visual_start_date = visual_start_date;

        Ok(commit(task, previous, next, MoveKind::Visual))
    }

    /// Fold a persistence result back into the board.
    ///
    /// On failure with [`FailurePolicy::Rollback`] the task is restored to
    /// `receipt.previous`, unless a later move already replaced it. With
    /// [`FailurePolicy::KeepOptimistic`] the board is left as is.
    pub fn settle(
        &mut self,
        receipt: &MoveReceipt,
        outcome: &SaveOutcome,
        policy: FailurePolicy,
    ) -> BoardEvent {
        let at = Utc::now();
        match outcome {
            SaveOutcome::Saved { attempts } => BoardEvent::TaskSaved {
                task_id: receipt.task.id.clone(),
                attempts: *attempts,
                at,
            },
            SaveOutcome::Failed { attempts, error } => {
                if policy == FailurePolicy::Rollback {
                    self.rollback(receipt);
                } else {
                    tracing::warn!(
                        task_id = %receipt.task.id,
                        "keeping unsaved move; it may not survive a reload"
                    );
                }
                BoardEvent::SaveFailed {
                    task_id: receipt.task.id.clone(),
                    attempts: *attempts,
                    message: error.clone(),
                    policy,
                    at,
                }
            }
        }
    }

    fn rollback(&mut self, receipt: &MoveReceipt) {
        match self.tasks.iter_mut().find(|t| t.id == receipt.task.id) {
            Some(current) if *current == receipt.task => {
                tracing::info!(task_id = %receipt.task.id, "rolling back unsaved move");
                *current = receipt.previous.clone();
            }
            Some(_) => {
                tracing::debug!(task_id = %receipt.task.id, "newer move present; rollback skipped");
            }
            None => {
                tracing::debug!(task_id = %receipt.task.id, "task deleted; rollback skipped");
            }
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, ProjectionError> {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            return Ok(&mut self.tasks[pos]);
        }
        Err(self.missing(id))
    }

    fn missing(&self, id: &str) -> ProjectionError {
        if is_rollover_id(id) {
            ProjectionError::VirtualItem(id.to_string())
        } else {
            ProjectionError::TaskNotFound(id.to_string())
        }
    }
}

fn commit(slot: &mut Task, previous: Task, mut next: Task, kind: MoveKind) -> MoveReceipt {
    if next != previous {
        next.updated_at = Utc::now();
        *slot = next.clone();
    }
    MoveReceipt {
        kind,
        previous,
        task: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{date, task};

    fn board() -> TaskBoard {
        TaskBoard::from_tasks(vec![
            task("a", "2025-05-13", Some(1)).with_start_date(date("2025-05-12")),
            task("b", "2025-05-20", Some(2)),
        ])
    }

    #[test]
    fn persisted_move_overwrites_schedule() {
        let mut b = board();
        let receipt = b
            .persisted_move("a", date("2025-05-14"), date("2025-05-15"), 1)
            .unwrap();
        assert!(receipt.changed());
        assert_eq!(receipt.kind, MoveKind::Persisted);

        let a = b.get("a").unwrap();
        assert_eq!(a.start_date, Some(date("2025-05-14")));
        assert_eq!(a.due_date, date("2025-05-15"));
        assert_eq!(a.week_number, Some(1));
        assert_eq!(receipt.previous.due_date, date("2025-05-13"));
    }

    #[test]
    fn persisted_move_clears_visual_override() {
        let mut b = board();
        b.visual_move("a", 4, None).unwrap();
        b.persisted_move("a", date("2025-05-19"), date("2025-05-20"), 2)
            .unwrap();
        let a = b.get("a").unwrap();
        assert_eq!(a.visual_week_number, None);
        assert_eq!(a.effective_week(), Some(2));
    }

    #[test]
    fn visual_move_leaves_persisted_schedule() {
        let mut b = board();
        let before = b.get("a").unwrap().clone();
        let receipt = b.visual_move("a", 3, Some(date("2025-05-29"))).unwrap();
        assert_eq!(receipt.kind, MoveKind::Visual);

        let a = b.get("a").unwrap();
        assert_eq!(a.visual_week_number, Some(3));
        assert_eq!(a.visual_start_date, Some(date("2025-05-29")));
        assert_eq!(a.start_date, before.start_date);
        assert_eq!(a.due_date, before.due_date);
        assert_eq!(a.week_number, before.week_number);
    }

    #[test]
    fn repeating_a_move_is_a_no_op() {
        let mut b = board();
        b.visual_move("b", 5, None).unwrap();
        let snapshot = b.get("b").unwrap().clone();
        let again = b.visual_move("b", 5, None).unwrap();
        assert!(!again.changed());
        assert_eq!(b.get("b").unwrap(), &snapshot);
    }

    #[test]
    fn moving_missing_task_is_recoverable() {
        let mut b = board();
        let before = b.tasks().to_vec();
        assert_eq!(
            b.visual_move("zzz", 2, None),
            Err(ProjectionError::TaskNotFound("zzz".into()))
        );
        assert_eq!(
            b.persisted_move("a-rollover-week-3", date("2025-05-19"), date("2025-05-19"), 2),
            Err(ProjectionError::VirtualItem("a-rollover-week-3".into()))
        );
        assert_eq!(b.tasks(), before.as_slice());
    }

    #[test]
    fn crud_operations() {
        let mut b = board();
        b.add(task("c", "2025-05-21", Some(2)));
        assert_eq!(b.len(), 3);

        let mut replaced = task("c", "2025-05-22", Some(2));
        replaced.title = "Renamed".into();
        b.update(replaced).unwrap();
        assert_eq!(b.get("c").unwrap().title, "Renamed");

        assert!(b.toggle("c").unwrap());
        assert!(!b.toggle("c").unwrap());

        let removed = b.delete("c").unwrap();
        assert_eq!(removed.id, "c");
        assert!(b.delete("c").is_err());
        assert!(b.update(task("nope", "2025-05-22", None)).is_err());
    }

    #[test]
    fn overdue_lists_incomplete_past_due() {
        let mut b = board();
        b.toggle("b").unwrap();
        let ids: Vec<&str> = b
            .overdue(date("2025-06-01"))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn settle_keeps_optimistic_state_by_default() {
        let mut b = board();
        let receipt = b.visual_move("a", 3, None).unwrap();
        let failed = SaveOutcome::Failed {
            attempts: 3,
            error: "offline".into(),
        };
        let event = b.settle(&receipt, &failed, FailurePolicy::KeepOptimistic);
        assert!(event.needs_attention());
        assert_eq!(b.get("a").unwrap().visual_week_number, Some(3));
    }

    #[test]
    fn settle_rolls_back_when_configured() {
        let mut b = board();
        let receipt = b.visual_move("a", 3, None).unwrap();
        let failed = SaveOutcome::Failed {
            attempts: 3,
            error: "offline".into(),
        };
        b.settle(&receipt, &failed, FailurePolicy::Rollback);
        assert_eq!(b.get("a").unwrap(), &receipt.previous);
    }

    #[test]
    fn rollback_skips_superseded_move() {
        let mut b = board();
        let first = b.visual_move("a", 3, None).unwrap();
        b.visual_move("a", 4, None).unwrap();
        let failed = SaveOutcome::Failed {
            attempts: 1,
            error: "offline".into(),
        };
        b.settle(&first, &failed, FailurePolicy::Rollback);
        assert_eq!(b.get("a").unwrap().visual_week_number, Some(4));
    }

    #[test]
    fn settle_success_reports_attempts() {
        let mut b = board();
        let receipt = b.visual_move("a", 3, None).unwrap();
        let event = b.settle(
            &receipt,
            &SaveOutcome::Saved { attempts: 2 },
            FailurePolicy::Rollback,
        );
        assert!(matches!(event, BoardEvent::TaskSaved { attempts: 2, .. }));
    }
}
