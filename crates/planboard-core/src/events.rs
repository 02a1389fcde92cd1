use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dnd::{CleanupReport, CleanupTrigger, ControllerEvent, DragNotification, InputModality};
use crate::storage::FailurePolicy;

/// Every observable change on the board produces an event.
/// Renderers use the drag events for highlighting; the move and save events
/// drive persistence and user notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardEvent {
    DragStarted {
        item_id: String,
        container_id: String,
        modality: InputModality,
        at: DateTime<Utc>,
    },
    /// The hovered container changed (`None` when over nothing droppable).
    CandidateChanged {
        item_id: String,
        candidate: Option<String>,
        at: DateTime<Utc>,
    },
    TaskMoved {
        item_id: String,
        from: String,
        to: String,
        at: DateTime<Utc>,
    },
    DragCancelled {
        item_id: String,
        at: DateTime<Utc>,
    },
    /// Every drag decoration was cleared.
    DragStateReset {
        trigger: CleanupTrigger,
        cleared: usize,
        at: DateTime<Utc>,
    },
    /// Persisted schedule changed.
    TaskRescheduled {
        task_id: String,
        start_date: Option<NaiveDate>,
        due_date: NaiveDate,
        week_number: Option<u32>,
        at: DateTime<Utc>,
    },
    /// Only the displayed bucket changed.
    TaskRepositioned {
        task_id: String,
        visual_week_number: u32,
        visual_start_date: Option<NaiveDate>,
        at: DateTime<Utc>,
    },
    /// A move could not be applied; the board is unchanged.
    MoveRejected {
        item_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
    TaskSaved {
        task_id: String,
        attempts: u32,
        at: DateTime<Utc>,
    },
    /// Saving failed after every retry. With `keep_optimistic` the change is
    /// still shown but may not survive a reload.
    SaveFailed {
        task_id: String,
        attempts: u32,
        message: String,
        policy: FailurePolicy,
        at: DateTime<Utc>,
    },
}

impl BoardEvent {
    /// Whether the user should be told about this event.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            BoardEvent::SaveFailed { .. } | BoardEvent::MoveRejected { .. }
        )
    }
}

impl From<&DragNotification> for BoardEvent {
    fn from(note: &DragNotification) -> Self {
        let at = Utc::now();
        match note {
            DragNotification::Started {
                item_id,
                origin,
                modality,
            } => BoardEvent::DragStarted {
                item_id: item_id.clone(),
                container_id: origin.to_string(),
                modality: *modality,
                at,
            },
            DragNotification::CandidateChanged { item_id, candidate } => {
                BoardEvent::CandidateChanged {
                    item_id: item_id.clone(),
                    candidate: candidate.as_ref().map(ToString::to_string),
                    at,
                }
            }
            DragNotification::Moved { item_id, from, to } => BoardEvent::TaskMoved {
                item_id: item_id.clone(),
                from: from.to_string(),
                to: to.to_string(),
                at,
            },
            DragNotification::Cancelled { item_id } => BoardEvent::DragCancelled {
                item_id: item_id.clone(),
                at,
            },
        }
    }
}

impl From<&CleanupReport> for BoardEvent {
    fn from(report: &CleanupReport) -> Self {
        BoardEvent::DragStateReset {
            trigger: report.trigger,
            cleared: report.total(),
            at: Utc::now(),
        }
    }
}

impl BoardEvent {
    /// Board event for a controller event; taps carry no board change.
    pub fn from_controller(event: &ControllerEvent) -> Option<Self> {
        match event {
            ControllerEvent::Drag(note) => Some(note.into()),
            ControllerEvent::Reset(report) => Some(report.into()),
            ControllerEvent::Tap { .. } => None,
        }
    }
}
