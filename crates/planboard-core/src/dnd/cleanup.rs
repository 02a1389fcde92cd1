//! Drag decorations and the idempotent reset.
//!
//! Decorations are the residue a drag leaves on the board: flags on items and
//! containers and floating touch previews. They live in one
//! [`DragDecorations`] value so a single [`DragDecorations::reset_all`] can
//! clear every one of them, whichever channel noticed that the drag ended.
//!
//! ```text
//!   GestureEnd ─┐
//!   pointer-up ─┤
//!   touch-end  ─┤
//!   drag-end   ─┼──▶ reset_all()  (applying twice == applying once)
//!   blur       ─┤
//!   Escape     ─┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::geometry::Point;
use super::gesture::InputModality;
use crate::calendar::ContainerId;

/// Closed vocabulary of drag-related flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragFlag {
    Dragging,
    BeingDragged,
    TouchDragging,
    DraggingActive,
    IsDragging,
    FallbackDragging,
    IsOver,
    TouchDropActive,
    FallbackDroppableActive,
}

impl DragFlag {
    pub const ALL: [DragFlag; 9] = [
        DragFlag::Dragging,
        DragFlag::BeingDragged,
        DragFlag::TouchDragging,
        DragFlag::DraggingActive,
        DragFlag::IsDragging,
        DragFlag::FallbackDragging,
        DragFlag::IsOver,
        DragFlag::TouchDropActive,
        DragFlag::FallbackDroppableActive,
    ];

    /// Class name used by renderers.
    pub fn class_name(self) -> &'static str {
        match self {
            DragFlag::Dragging => "dragging",
            DragFlag::BeingDragged => "being-dragged",
            DragFlag::TouchDragging => "touch-dragging",
            DragFlag::DraggingActive => "dragging-active",
            DragFlag::IsDragging => "is-dragging",
            DragFlag::FallbackDragging => "fallback-dragging",
            DragFlag::IsOver => "is-over",
            DragFlag::TouchDropActive => "touch-drop-active",
            DragFlag::FallbackDroppableActive => "fallback-droppable-active",
        }
    }

    /// Whether the flag marks a drop candidate rather than a dragged item.
    pub fn is_drop_flag(self) -> bool {
        matches!(
            self,
            DragFlag::IsOver | DragFlag::TouchDropActive | DragFlag::FallbackDroppableActive
        )
    }

    /// Modality-specific flag for the dragged item.
    pub fn dragging(modality: InputModality) -> DragFlag {
        match modality {
            InputModality::Pointer => DragFlag::IsDragging,
            InputModality::Touch => DragFlag::TouchDragging,
            InputModality::Fallback => DragFlag::FallbackDragging,
        }
    }

    /// Modality-specific flag for the hovered container.
    pub fn drop_candidate(modality: InputModality) -> DragFlag {
        match modality {
            InputModality::Pointer => DragFlag::IsOver,
            InputModality::Touch => DragFlag::TouchDropActive,
            InputModality::Fallback => DragFlag::FallbackDroppableActive,
        }
    }
}

/// What a flag is attached to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FlagTarget {
    Item(String),
    Container(ContainerId),
    /// The document root; carries `dragging-active` while any drag runs.
    Root,
}

/// Floating copy of a touched item that follows the finger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub item_id: String,
    /// Top-left corner of the preview.
    pub position: Point,
    /// Finger position relative to the preview's top-left corner.
    pub grab_offset: Point,
}

impl DragPreview {
    /// Follow the finger, keeping the grab offset.
    pub fn follow(&mut self, finger: Point) {
        self.position = finger.offset_from(self.grab_offset);
    }
}

/// Which channel triggered a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupTrigger {
    GestureEnd,
    PointerUp,
    TouchEnd,
    NativeDragEnd,
    WindowBlur,
    Escape,
    Explicit,
}

/// What a reset removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub trigger: CleanupTrigger,
    pub flags_cleared: usize,
    pub previews_removed: usize,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.flags_cleared == 0 && self.previews_removed == 0
    }

    pub fn total(&self) -> usize {
        self.flags_cleared + self.previews_removed
    }
}

/// Every drag decoration currently on the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragDecorations {
    flags: BTreeMap<FlagTarget, BTreeSet<DragFlag>>,
    previews: BTreeMap<String, DragPreview>,
}

impl DragDecorations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: FlagTarget, flag: DragFlag) {
        self.flags.entry(target).or_default().insert(flag);
    }

    pub fn unset(&mut self, target: &FlagTarget, flag: DragFlag) -> bool {
        let Some(set) = self.flags.get_mut(target) else {
            return false;
        };
        let removed = set.remove(&flag);
        if set.is_empty() {
            self.flags.remove(target);
        }
        removed
    }

    pub fn has(&self, target: &FlagTarget, flag: DragFlag) -> bool {
        self.flags.get(target).is_some_and(|s| s.contains(&flag))
    }

    pub fn flags_on(&self, target: &FlagTarget) -> Vec<DragFlag> {
        self.flags
            .get(target)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove `flag` from whichever targets carry it.
    pub fn clear_flag(&mut self, flag: DragFlag) -> usize {
        let mut cleared = 0;
        self.flags.retain(|_, set| {
            if set.remove(&flag) {
                cleared += 1;
            }
            !set.is_empty()
        });
        cleared
    }

    /// Clear every decoration belonging to one item.
    pub fn clear_item(&mut self, item_id: &str) -> usize {
        let target = FlagTarget::Item(item_id.to_string());
        let flags = self.flags.remove(&target).map(|s| s.len()).unwrap_or(0);
        let preview = usize::from(self.previews.remove(item_id).is_some());
        flags + preview
    }

    pub fn spawn_preview(&mut self, preview: DragPreview) {
        self.previews.insert(preview.item_id.clone(), preview);
    }

    pub fn preview_mut(&mut self, item_id: &str) -> Option<&mut DragPreview> {
        self.previews.get_mut(item_id)
    }

    pub fn preview(&self, item_id: &str) -> Option<&DragPreview> {
        self.previews.get(item_id)
    }

    pub fn remove_preview(&mut self, item_id: &str) -> bool {
        self.previews.remove(item_id).is_some()
    }

    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.values().map(BTreeSet::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.flags.is_empty() && self.previews.is_empty()
    }

    /// Clear every known flag and remove every preview.
    ///
    /// Safe with nothing to clear; a second call reports zero removals and
    /// leaves the same (empty) state.
    pub fn reset_all(&mut self, trigger: CleanupTrigger) -> CleanupReport {
        let flags_cleared: usize = DragFlag::ALL
            .iter()
            .map(|flag| self.clear_flag(*flag))
            .sum();
        let previews_removed = self.previews.len();
        self.previews.clear();

        let report = CleanupReport {
            trigger,
            flags_cleared,
            previews_removed,
        };
        if !report.is_empty() {
            tracing::debug!(
                ?trigger,
                flags = report.flags_cleared,
                previews = report.previews_removed,
                "drag decorations reset"
            );
        }
        report
    }
}
