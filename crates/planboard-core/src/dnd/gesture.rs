//! Device-independent gesture stream.
//!
//! Every adapter, whatever it listens to, produces [`GestureEvent`]s of the
//! same shape. A well-formed stream for one drag is exactly one `Start`, zero
//! or more `Move`s and exactly one `End`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Point;
use crate::calendar::ContainerId;

/// Which input family produced a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    /// Native drag events.
    Pointer,
    /// Touch events with a synthetic preview.
    Touch,
    /// Mouse events with distance detection.
    Fallback,
}

impl fmt::Display for InputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputModality::Pointer => write!(f, "pointer"),
            InputModality::Touch => write!(f, "touch"),
            InputModality::Fallback => write!(f, "fallback"),
        }
    }
}

/// The pressed drag handle: which item, where it lives, and its position there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragHandle {
    pub item_id: String,
    pub container_id: ContainerId,
    #[serde(default)]
    pub index: usize,
}

impl DragHandle {
    pub fn new(item_id: impl Into<String>, container_id: impl Into<ContainerId>, index: usize) -> Self {
        Self {
            item_id: item_id.into(),
            container_id: container_id.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Start { handle: DragHandle, at: Point },
    Move { at: Point },
    End { at: Point },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub modality: InputModality,
    pub gesture: Gesture,
}

impl GestureEvent {
    pub fn start(modality: InputModality, handle: DragHandle, at: Point) -> Self {
        Self {
            modality,
            gesture: Gesture::Start { handle, at },
        }
    }

    pub fn moved(modality: InputModality, at: Point) -> Self {
        Self {
            modality,
            gesture: Gesture::Move { at },
        }
    }

    pub fn end(modality: InputModality, at: Point) -> Self {
        Self {
            modality,
            gesture: Gesture::End { at },
        }
    }
}

/// What an adapter recognized from raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognized {
    Gesture(GestureEvent),
    /// Press and release without crossing the drag threshold.
    Tap { item_id: String },
}
