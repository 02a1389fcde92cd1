//! Drag controller: the one object a board view owns for drag and drop.
//!
//! It routes raw input to the matching adapter, feeds recognized gestures to
//! the coordinator, applies the "being dragged" and candidate highlighting
//! flags, and subscribes the cleanup reset to every global end-of-drag
//! channel.
//!
//! # Usage
//! ```rust,ignore
//! use planboard_core::dnd::{DragController, RawInput, MouseInput, GlobalSignal};
//!
//! let mut controller = DragController::new(&config.drag);
//! let _week = controller.registry_mut().register("week-1", &region);
//!
//! for event in controller.handle(RawInput::Mouse(MouseInput::Up { at })) {
//!     // forward Moved outcomes to the scheduling layer
//! }
//! controller.handle(RawInput::Global(GlobalSignal::WindowBlur));
//! ```

use serde::{Deserialize, Serialize};

use super::adapters::{
    GestureAdapter, MouseDistanceAdapter, MouseInput, NativeDragAdapter, NativeInput,
    TouchAdapter, TouchInput,
};
use super::cleanup::{CleanupReport, CleanupTrigger, DragDecorations, DragFlag, FlagTarget};
use super::coordinator::{DragCoordinator, DragNotification};
use super::gesture::{InputModality, Recognized};
use super::registry::DropTargetRegistry;
use crate::storage::DragConfig;

/// Document-level signals that may end a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GlobalSignal {
    PointerUp,
    TouchEnd,
    NativeDragEnd,
    WindowBlur,
    KeyDown { key: String },
}

/// Any raw input the controller understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum RawInput {
    Native(NativeInput),
    Mouse(MouseInput),
    Touch(TouchInput),
    Global(GlobalSignal),
}

/// What the controller reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    Drag(DragNotification),
    /// A press that never became a drag; the item's click action should run.
    Tap { item_id: String },
    /// Leftover decorations were cleared by a global channel.
    Reset(CleanupReport),
}

/// Owns adapters, registry, coordinator and decorations.
pub struct DragController {
    config: DragConfig,
    native: NativeDragAdapter,
    mouse: MouseDistanceAdapter,
    touch: TouchAdapter,
    registry: DropTargetRegistry,
    coordinator: DragCoordinator,
    decorations: DragDecorations,
}

impl DragController {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            config: config.clone(),
            native: NativeDragAdapter::new(config),
            mouse: MouseDistanceAdapter::new(config),
            touch: TouchAdapter::new(config),
            registry: DropTargetRegistry::new(),
            coordinator: DragCoordinator::new(),
            decorations: DragDecorations::new(),
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn registry(&self) -> &DropTargetRegistry {
        &self.registry
    }

    /// Containers register and unregister here on mount and unmount.
    pub fn registry_mut(&mut self) -> &mut DropTargetRegistry {
        &mut self.registry
    }

    pub fn coordinator(&self) -> &DragCoordinator {
        &self.coordinator
    }

    pub fn decorations(&self) -> &DragDecorations {
        &self.decorations
    }

    /// Process one raw input.
    ///
    /// Adapter-level release events (`mouseup`, `touchend`, `dragend`) are
    /// also delivered to the matching global channel afterwards, the way a
    /// document-level listener would see them.
    pub fn handle(&mut self, input: RawInput) -> Vec<ControllerEvent> {
        let (recognized, echo) = match input {
            RawInput::Native(input) => {
                let echo = match input {
                    NativeInput::DragEnd { .. } => Some(GlobalSignal::NativeDragEnd),
                    NativeInput::Release { .. } => Some(GlobalSignal::PointerUp),
                    _ => None,
                };
                (self.native.handle(input, &mut self.decorations), echo)
            }
            RawInput::Mouse(input) => {
                let echo = matches!(input, MouseInput::Up { .. }).then_some(GlobalSignal::PointerUp);
                (self.mouse.handle(input, &mut self.decorations), echo)
            }
            RawInput::Touch(input) => {
                let echo = matches!(input, TouchInput::End { .. }).then_some(GlobalSignal::TouchEnd);
                (self.touch.handle(input, &mut self.decorations), echo)
            }
            RawInput::Global(signal) => return self.on_global(signal),
        };

        let mut out = Vec::new();
        for item in recognized {
            match item {
                Recognized::Tap { item_id } => {
                    if !self.coordinator.is_active() {
                        out.push(ControllerEvent::Tap { item_id });
                    }
                }
                Recognized::Gesture(event) => {
                    let notes = self
                        .coordinator
                        .handle(event, &self.registry, &mut self.decorations);
                    for note in notes {
                        self.decorate(&note);
                        out.push(ControllerEvent::Drag(note));
                    }
                }
            }
        }
        if let Some(signal) = echo {
            out.extend(self.on_global(signal));
        }
        out
    }

    /// React to a document-level end-of-drag signal.
    ///
    /// Cancels any active drag, forgets pending presses and clears every
    /// decoration. Unknown keys (and Escape when disabled) are ignored.
    pub fn on_global(&mut self, signal: GlobalSignal) -> Vec<ControllerEvent> {
        let trigger = match signal {
            GlobalSignal::PointerUp => CleanupTrigger::PointerUp,
            GlobalSignal::TouchEnd => CleanupTrigger::TouchEnd,
            GlobalSignal::NativeDragEnd => CleanupTrigger::NativeDragEnd,
            GlobalSignal::WindowBlur => CleanupTrigger::WindowBlur,
            GlobalSignal::KeyDown { key } => {
                if key != "Escape" || !self.config.cancel_on_escape {
                    return Vec::new();
                }
                CleanupTrigger::Escape
            }
        };
        self.cancel(trigger)
    }

    /// Abort everything in flight and reset decorations.
    pub fn cancel(&mut self, trigger: CleanupTrigger) -> Vec<ControllerEvent> {
        self.native.reset();
        self.mouse.reset();
        self.touch.reset();

        let (cancelled, report) = self.coordinator.cancel(&mut self.decorations, trigger);
        let mut out = Vec::new();
        if let Some(note) = cancelled {
            out.push(ControllerEvent::Drag(note));
        }
        if !report.is_empty() {
            out.push(ControllerEvent::Reset(report));
        }
        out
    }

    fn decorate(&mut self, note: &DragNotification) {
        match note {
            DragNotification::Started {
                item_id, modality, ..
            } => {
                let item = FlagTarget::Item(item_id.clone());
                self.decorations.set(item.clone(), DragFlag::BeingDragged);
                self.decorations.set(item, DragFlag::dragging(*modality));
                self.decorations.set(FlagTarget::Root, DragFlag::DraggingActive);
            }
            DragNotification::CandidateChanged { candidate, .. } => {
                let flag = self
                    .coordinator
                    .session()
                    .map(|s| DragFlag::drop_candidate(s.modality))
                    .unwrap_or(DragFlag::IsOver);
                self.decorations.clear_flag(flag);
                if let Some(container) = candidate {
                    self.decorations
                        .set(FlagTarget::Container(container.clone()), flag);
                }
            }
            DragNotification::Moved { .. } | DragNotification::Cancelled { .. } => {}
        }
    }

    /// Modality of the active drag, if any.
    pub fn active_modality(&self) -> Option<InputModality> {
        self.coordinator.session().map(|s| s.modality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::geometry::{Point, Rect};
    use crate::dnd::gesture::DragHandle;
    use crate::dnd::registry::RectRegion;
    use std::rc::Rc;

    fn setup() -> (DragController, Vec<Rc<RectRegion>>) {
        let mut c = DragController::new(&DragConfig::default());
        let w1 = Rc::new(RectRegion::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let w2 = Rc::new(RectRegion::new(Rect::new(100.0, 0.0, 100.0, 100.0)));
        let _ = c.registry_mut().register("week-1", &w1);
        let _ = c.registry_mut().register("week-2", &w2);
        (c, vec![w1, w2])
    }

    fn handle() -> DragHandle {
        DragHandle::new("t1", "week-1", 0)
    }

    fn mouse(input: MouseInput) -> RawInput {
        RawInput::Mouse(input)
    }

    #[test]
    fn mouse_drag_moves_and_leaves_no_residue() {
        let (mut c, _regions) = setup();
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(150.0, 10.0) }));

        let item = FlagTarget::Item("t1".into());
        assert!(c.decorations().has(&item, DragFlag::BeingDragged));
        assert!(c.decorations().has(&item, DragFlag::FallbackDragging));
        assert!(c.decorations().has(
            &FlagTarget::Container("week-2".into()),
            DragFlag::FallbackDroppableActive
        ));

        let out = c.handle(mouse(MouseInput::Up { at: Point::new(150.0, 10.0) }));
        assert!(out.contains(&ControllerEvent::Drag(DragNotification::Moved {
            item_id: "t1".into(),
            from: "week-1".into(),
            to: "week-2".into(),
        })));
        assert!(c.decorations().is_clean());
        assert!(!c.coordinator().is_active());
    }

    #[test]
    fn highlight_follows_candidate() {
        let (mut c, _regions) = setup();
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(150.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(50.0, 10.0) }));
        let flag = DragFlag::FallbackDroppableActive;
        assert!(c.decorations().has(&FlagTarget::Container("week-1".into()), flag));
        assert!(!c.decorations().has(&FlagTarget::Container("week-2".into()), flag));

        c.handle(mouse(MouseInput::Move { at: Point::new(500.0, 10.0) }));
        assert_eq!(c.decorations().flags_on(&FlagTarget::Container("week-1".into())), vec![]);
    }

    #[test]
    fn click_passes_through_as_tap() {
        let (mut c, _regions) = setup();
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        let out = c.handle(mouse(MouseInput::Up { at: Point::new(11.0, 10.0) }));
        assert_eq!(out, vec![ControllerEvent::Tap { item_id: "t1".into() }]);
    }

    #[test]
    fn escape_cancels_active_drag() {
        let (mut c, _regions) = setup();
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(150.0, 10.0) }));

        let out = c.handle(RawInput::Global(GlobalSignal::KeyDown { key: "Escape".into() }));
        assert_eq!(
            out[0],
            ControllerEvent::Drag(DragNotification::Cancelled { item_id: "t1".into() })
        );
        assert!(matches!(out[1], ControllerEvent::Reset(_)));
        assert!(c.decorations().is_clean());

        // the release that follows neither moves nor taps
        let out = c.handle(mouse(MouseInput::Up { at: Point::new(150.0, 10.0) }));
        assert!(out.is_empty());
    }

    #[test]
    fn explicit_cancel_clears_drag_and_pending_press() {
        let (mut c, _regions) = setup();
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(150.0, 10.0) }));

        let out = c.cancel(CleanupTrigger::Explicit);
        assert_eq!(
            out[0],
            ControllerEvent::Drag(DragNotification::Cancelled { item_id: "t1".into() })
        );
        match &out[1] {
            ControllerEvent::Reset(report) => assert_eq!(report.trigger, CleanupTrigger::Explicit),
            other => panic!("unexpected {other:?}"),
        }
        assert!(c.cancel(CleanupTrigger::Explicit).is_empty());
        assert!(c.handle(mouse(MouseInput::Up { at: Point::new(150.0, 10.0) })).is_empty());
    }

    #[test]
    fn escape_can_be_disabled() {
        let mut config = DragConfig::default();
        config.cancel_on_escape = false;
        let mut c = DragController::new(&config);
        let region = Rc::new(RectRegion::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let _ = c.registry_mut().register("week-1", &region);
        c.handle(mouse(MouseInput::Down { handle: handle(), at: Point::new(10.0, 10.0) }));
        c.handle(mouse(MouseInput::Move { at: Point::new(50.0, 10.0) }));
        assert!(c
            .handle(RawInput::Global(GlobalSignal::KeyDown { key: "Escape".into() }))
            .is_empty());
        assert!(c.coordinator().is_active());
    }

    #[test]
    fn blur_mid_touch_drag_removes_preview() {
        let (mut c, _regions) = setup();
        c.handle(RawInput::Touch(TouchInput::Start {
            handle: handle(),
            at: Point::new(10.0, 10.0),
            grab_offset: Point::new(2.0, 2.0),
        }));
        c.handle(RawInput::Touch(TouchInput::Move { at: Point::new(150.0, 10.0) }));
        assert_eq!(c.decorations().preview_count(), 1);
        assert_eq!(c.active_modality(), Some(InputModality::Touch));

        c.handle(RawInput::Global(GlobalSignal::WindowBlur));
        assert!(c.decorations().is_clean());
        assert!(!c.coordinator().is_active());

        // the touchend arriving after blur is harmless
        assert!(c
            .handle(RawInput::Touch(TouchInput::End { at: Point::new(150.0, 10.0) }))
            .is_empty());
    }

    #[test]
    fn repeated_global_signals_converge() {
        let (mut c, _regions) = setup();
        for signal in [
            GlobalSignal::PointerUp,
            GlobalSignal::TouchEnd,
            GlobalSignal::NativeDragEnd,
            GlobalSignal::WindowBlur,
        ] {
            assert!(c.handle(RawInput::Global(signal)).is_empty());
        }
        assert!(c.decorations().is_clean());
    }

    #[test]
    fn raw_input_deserializes_from_script_json() {
        let json = r#"{"source":"touch","event":{"type":"move","at":{"x":1.0,"y":2.0}}}"#;
        let input: RawInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, RawInput::Touch(TouchInput::Move { at: Point::new(1.0, 2.0) }));

        let json = r#"{"source":"global","event":{"type":"key_down","key":"Escape"}}"#;
        let input: RawInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, RawInput::Global(GlobalSignal::KeyDown { key: "Escape".into() }));
    }
}
