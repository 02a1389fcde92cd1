use chrono::{DateTime, Utc};

use super::geometry::Point;
use super::gesture::{DragHandle, InputModality};
use crate::calendar::ContainerId;

/// The one in-flight drag.
///
/// Owned by [`super::DragCoordinator`]; nothing else mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item_id: String,
    pub origin: ContainerId,
    pub origin_index: usize,
    pub modality: InputModality,
    /// Container currently under the pointer, if any.
    pub candidate: Option<ContainerId>,
    pub last_point: Point,
    pub started_at: DateTime<Utc>,
}

impl DragSession {
    pub(crate) fn begin(handle: DragHandle, modality: InputModality, at: Point) -> Self {
        Self {
            item_id: handle.item_id,
            origin: handle.container_id,
            origin_index: handle.index,
            modality,
            candidate: None,
            last_point: at,
            started_at: Utc::now(),
        }
    }

    /// Store a new candidate; returns whether it changed.
    pub(crate) fn retarget(&mut self, candidate: Option<ContainerId>) -> bool {
        if self.candidate == candidate {
            return false;
        }
        self.candidate = candidate;
        true
    }

    /// Where the drop would land, if it would move anything.
    pub fn destination(&self) -> Option<&ContainerId> {
        self.candidate.as_ref().filter(|c| **c != self.origin)
    }
}
