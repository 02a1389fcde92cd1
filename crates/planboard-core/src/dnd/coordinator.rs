//! Drag session state machine.
//!
//! ```text
//!            Start                     End
//!   Idle ───────────▶ Active ───────────▶ (resolve) ───▶ Idle
//!                      │  ▲                  │
//!                      └──┘ Move             └─ reset_all()
//!                  (re-hit-test)
//! ```
//!
//! The coordinator is adapter-agnostic: it only sees [`GestureEvent`]s. While a
//! session is active, gestures from other modalities and further `Start`s are
//! ignored (first wins).

use serde::{Deserialize, Serialize};

use super::cleanup::{CleanupReport, CleanupTrigger, DragDecorations};
use super::geometry::Point;
use super::gesture::{Gesture, GestureEvent, InputModality};
use super::registry::DropTargetRegistry;
use super::session::DragSession;
use crate::calendar::ContainerId;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Idle,
    Active,
}

/// What the coordinator tells its consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragNotification {
    Started {
        item_id: String,
        origin: ContainerId,
        modality: InputModality,
    },
    CandidateChanged {
        item_id: String,
        candidate: Option<ContainerId>,
    },
    Moved {
        item_id: String,
        from: ContainerId,
        to: ContainerId,
    },
    Cancelled {
        item_id: String,
    },
}

impl DragNotification {
    /// `Moved` and `Cancelled` end a drag.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DragNotification::Moved { .. } | DragNotification::Cancelled { .. }
        )
    }
}

/// Holder of the single drag session.
#[derive(Debug, Default)]
pub struct DragCoordinator {
    session: Option<DragSession>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn state(&self) -> CoordinatorState {
        if self.session.is_some() {
            CoordinatorState::Active
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    // ── Transitions ────────────────────────────────────────────────────

    /// Feed one gesture.
    ///
    /// `End` always resets `decorations`, whatever the outcome.
    pub fn handle(
        &mut self,
        event: GestureEvent,
        registry: &DropTargetRegistry,
        decorations: &mut DragDecorations,
    ) -> Vec<DragNotification> {
        let GestureEvent { modality, gesture } = event;

        if let Some(session) = &self.session {
            if session.modality != modality {
                tracing::debug!(
                    active = %session.modality,
                    ignored = %modality,
                    "gesture from another modality ignored"
                );
                return Vec::new();
            }
        }

        match gesture {
            Gesture::Start { handle, at } => {
                if let Some(session) = &self.session {
                    tracing::debug!(
                        active = %session.item_id,
                        ignored = %handle.item_id,
                        "drag already active; start ignored"
                    );
                    return Vec::new();
                }
                let mut session = DragSession::begin(handle, modality, at);
                tracing::debug!(item_id = %session.item_id, origin = %session.origin, %modality, "drag started");

                let mut out = vec![DragNotification::Started {
                    item_id: session.item_id.clone(),
                    origin: session.origin.clone(),
                    modality,
                }];
                let candidate = resolve_candidate(registry, at);
                if session.retarget(candidate) {
                    out.push(DragNotification::CandidateChanged {
                        item_id: session.item_id.clone(),
                        candidate: session.candidate.clone(),
                    });
                }
                self.session = Some(session);
                out
            }
            Gesture::Move { at } => {
                let Some(session) = self.session.as_mut() else {
                    return Vec::new();
                };
                session.last_point = at;
                if session.retarget(resolve_candidate(registry, at)) {
                    vec![DragNotification::CandidateChanged {
                        item_id: session.item_id.clone(),
                        candidate: session.candidate.clone(),
                    }]
                } else {
                    Vec::new()
                }
            }
            Gesture::End { at } => {
                let Some(mut session) = self.session.take() else {
                    return Vec::new();
                };
                session.last_point = at;
                session.retarget(resolve_candidate(registry, at));

                let outcome = resolve(&session);
                decorations.reset_all(CleanupTrigger::GestureEnd);
                vec![outcome]
            }
        }
    }

    /// Abort the active drag, if any, and reset decorations.
    ///
    /// Returns `Cancelled` when a session was active.
    pub fn cancel(
        &mut self,
        decorations: &mut DragDecorations,
        trigger: CleanupTrigger,
    ) -> (Option<DragNotification>, CleanupReport) {
        let cancelled = self.session.take().map(|session| {
            tracing::info!(item_id = %session.item_id, ?trigger, "drag cancelled");
            DragNotification::Cancelled {
                item_id: session.item_id,
            }
        });
        (cancelled, decorations.reset_all(trigger))
    }
}

/// Hit-test, degrading failures to "no candidate".
fn resolve_candidate(registry: &DropTargetRegistry, at: Point) -> Option<ContainerId> {
    match registry.hit_test(at) {
        Ok(candidate) => candidate,
        Err(e) => {
            tracing::warn!(error = %e, x = at.x, y = at.y, "hit test failed; treating as no drop target");
            None
        }
    }
}

fn resolve(session: &DragSession) -> DragNotification {
    match session.destination() {
        Some(to) => {
            tracing::info!(item_id = %session.item_id, from = %session.origin, %to, "drag resolved to move");
            DragNotification::Moved {
                item_id: session.item_id.clone(),
                from: session.origin.clone(),
                to: to.clone(),
            }
        }
        None => {
            tracing::debug!(item_id = %session.item_id, candidate = ?session.candidate, "drag resolved to cancel");
            DragNotification::Cancelled {
                item_id: session.item_id.clone(),
            }
        }
    }
}
