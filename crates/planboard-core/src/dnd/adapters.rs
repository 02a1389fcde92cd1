//! Input adapters.
//!
//! Three adapters turn raw input into the shared gesture stream:
//!
//! - [`NativeDragAdapter`]: native drag events (`dragstart`/`dragover`/`drop`/`dragend`).
//! - [`MouseDistanceAdapter`]: plain mouse events, used when native drag misbehaves.
//! - [`TouchAdapter`]: touch events; draws its own floating preview.
//!
//! All three debounce with a Euclidean distance gate so that a press that
//! barely moves comes out as a [`Recognized::Tap`] instead of a drag.

use serde::{Deserialize, Serialize};

use super::cleanup::{DragDecorations, DragPreview};
use super::geometry::Point;
use super::gesture::{DragHandle, GestureEvent, InputModality, Recognized};
use crate::storage::DragConfig;

/// Common surface of the input adapters.
pub trait GestureAdapter {
    type Input;

    fn modality(&self) -> InputModality;

    /// Feed one raw input. Touch adapters draw their preview into `decorations`.
    fn handle(&mut self, input: Self::Input, decorations: &mut DragDecorations) -> Vec<Recognized>;

    /// Whether a press or drag is being tracked.
    fn is_tracking(&self) -> bool;

    /// Forget any press or drag in progress without emitting anything.
    fn reset(&mut self);
}

// ── Distance gate ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Press {
    handle: DragHandle,
    origin: Point,
    dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
    /// Nothing pressed.
    Idle,
    /// Pressed, still within the threshold.
    Pending,
    /// Threshold crossed on this motion.
    Started { handle: DragHandle, origin: Point },
    /// Already dragging.
    Dragging,
}

/// Press tracker that promotes a press to a drag once it travels strictly
/// further than `threshold`.
#[derive(Debug, Clone)]
struct DistanceGate {
    threshold: f64,
    press: Option<Press>,
}

impl DistanceGate {
    fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            press: None,
        }
    }

    /// Record a press. A press while already dragging is ignored.
    fn press(&mut self, handle: DragHandle, at: Point) {
        if self.is_dragging() || !at.is_finite() {
            return;
        }
        self.press = Some(Press {
            handle,
            origin: at,
            dragging: false,
        });
    }

    fn motion(&mut self, at: Point) -> Motion {
        let threshold = self.threshold;
        let Some(press) = self.press.as_mut() else {
            return Motion::Idle;
        };
        if press.dragging {
            return Motion::Dragging;
        }
        if !at.is_finite() || press.origin.distance_to(at) <= threshold {
            return Motion::Pending;
        }
        press.dragging = true;
        Motion::Started {
            handle: press.handle.clone(),
            origin: press.origin,
        }
    }

    fn release(&mut self) -> Option<Press> {
        self.press.take()
    }

    fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.dragging)
    }

    fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    fn clear(&mut self) {
        self.press = None;
    }
}

fn release_signal(press: Option<Press>, modality: InputModality, at: Point) -> Vec<Recognized> {
    match press {
        Some(p) if p.dragging => vec![Recognized::Gesture(GestureEvent::end(modality, at))],
        Some(p) => vec![Recognized::Tap {
            item_id: p.handle.item_id,
        }],
        None => Vec::new(),
    }
}

fn started(modality: InputModality, handle: DragHandle, origin: Point, at: Point) -> Vec<Recognized> {
    tracing::debug!(%modality, item_id = %handle.item_id, "drag threshold crossed");
    vec![
        Recognized::Gesture(GestureEvent::start(modality, handle, origin)),
        Recognized::Gesture(GestureEvent::moved(modality, at)),
    ]
}

// ── Native drag ────────────────────────────────────────────────────────

/// Raw native drag input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NativeInput {
    /// Pointer pressed on a drag handle.
    Press { handle: DragHandle, at: Point },
    /// Pointer released without the browser starting a drag.
    Release { at: Point },
    DragStart { at: Point },
    DragOver { at: Point },
    Drop { at: Point },
    /// Fired on the source after a drop, or when the drag ends elsewhere.
    DragEnd { at: Point },
}

/// Adapter over native drag events.
///
/// Emits exactly one `End` per drag whether the drag finishes with `drop`,
/// with `dragend`, or with both.
#[derive(Debug, Clone)]
pub struct NativeDragAdapter {
    gate: DistanceGate,
    native_started: bool,
}

impl NativeDragAdapter {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            gate: DistanceGate::new(config.native_threshold_px),
            native_started: false,
        }
    }

    fn advance(&mut self, at: Point) -> Vec<Recognized> {
        match self.gate.motion(at) {
            Motion::Started { handle, origin } => started(self.modality(), handle, origin, at),
            Motion::Dragging => vec![Recognized::Gesture(GestureEvent::moved(
                self.modality(),
                at,
            ))],
            Motion::Idle | Motion::Pending => Vec::new(),
        }
    }

    fn finish(&mut self, at: Point) -> Vec<Recognized> {
        self.native_started = false;
        match self.gate.release() {
            Some(p) if p.dragging => release_signal(Some(p), self.modality(), at),
            // A native drag that never crossed the threshold is neither a
            // drag nor a click.
            _ => Vec::new(),
        }
    }
}

impl GestureAdapter for NativeDragAdapter {
    type Input = NativeInput;

    fn modality(&self) -> InputModality {
        InputModality::Pointer
    }

    fn handle(&mut self, input: NativeInput, _decorations: &mut DragDecorations) -> Vec<Recognized> {
        match input {
            NativeInput::Press { handle, at } => {
                self.gate.press(handle, at);
                Vec::new()
            }
            NativeInput::Release { at } => {
                if self.native_started {
                    return Vec::new();
                }
                release_signal(self.gate.release(), self.modality(), at)
            }
            NativeInput::DragStart { at } => {
                if !self.gate.is_pressed() {
                    return Vec::new();
                }
                self.native_started = true;
                self.advance(at)
            }
            NativeInput::DragOver { at } => {
                if !self.native_started {
                    return Vec::new();
                }
                self.advance(at)
            }
            NativeInput::Drop { at } | NativeInput::DragEnd { at } => {
                if !self.native_started {
                    return Vec::new();
                }
                self.finish(at)
            }
        }
    }

    fn is_tracking(&self) -> bool {
        self.gate.is_pressed()
    }

    fn reset(&mut self) {
        self.gate.clear();
        self.native_started = false;
    }
}

// ── Mouse distance fallback ────────────────────────────────────────────

/// Raw mouse input for the fallback adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MouseInput {
    Down { handle: DragHandle, at: Point },
    Move { at: Point },
    Up { at: Point },
}

/// Drag detection from plain mouse events.
#[derive(Debug, Clone)]
pub struct MouseDistanceAdapter {
    gate: DistanceGate,
}

impl MouseDistanceAdapter {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            gate: DistanceGate::new(config.pointer_threshold_px),
        }
    }
}

impl GestureAdapter for MouseDistanceAdapter {
    type Input = MouseInput;

    fn modality(&self) -> InputModality {
        InputModality::Fallback
    }

    fn handle(&mut self, input: MouseInput, _decorations: &mut DragDecorations) -> Vec<Recognized> {
        let modality = self.modality();
        match input {
            MouseInput::Down { handle, at } => {
                self.gate.press(handle, at);
                Vec::new()
            }
            MouseInput::Move { at } => match self.gate.motion(at) {
                Motion::Started { handle, origin } => started(modality, handle, origin, at),
                Motion::Dragging => vec![Recognized::Gesture(GestureEvent::moved(modality, at))],
                Motion::Idle | Motion::Pending => Vec::new(),
            },
            MouseInput::Up { at } => release_signal(self.gate.release(), modality, at),
        }
    }

    fn is_tracking(&self) -> bool {
        self.gate.is_pressed()
    }

    fn reset(&mut self) {
        self.gate.clear();
    }
}

// ── Touch ──────────────────────────────────────────────────────────────

/// Raw touch input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TouchInput {
    Start {
        handle: DragHandle,
        at: Point,
        /// Finger position relative to the item's top-left corner.
        #[serde(default)]
        grab_offset: Point,
    },
    Move { at: Point },
    End { at: Point },
}

/// Drag detection from touch events with a synthetic preview.
///
/// The preview appears once the touch crosses the threshold and is removed
/// when the touch ends.
#[derive(Debug, Clone)]
pub struct TouchAdapter {
    gate: DistanceGate,
    grab_offset: Point,
    dragged_item: Option<String>,
}

impl TouchAdapter {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            gate: DistanceGate::new(config.touch_threshold_px),
            grab_offset: Point::default(),
            dragged_item: None,
        }
    }
}

impl GestureAdapter for TouchAdapter {
    type Input = TouchInput;

    fn modality(&self) -> InputModality {
        InputModality::Touch
    }

    fn handle(&mut self, input: TouchInput, decorations: &mut DragDecorations) -> Vec<Recognized> {
        let modality = self.modality();
        match input {
            TouchInput::Start {
                handle,
                at,
                grab_offset,
            } => {
                if !self.gate.is_dragging() {
                    self.grab_offset = grab_offset;
                }
                self.gate.press(handle, at);
                Vec::new()
            }
            TouchInput::Move { at } => match self.gate.motion(at) {
                Motion::Started { handle, origin } => {
                    let mut preview = DragPreview {
                        item_id: handle.item_id.clone(),
                        position: Point::default(),
                        grab_offset: self.grab_offset,
                    };
                    preview.follow(at);
                    decorations.spawn_preview(preview);
                    self.dragged_item = Some(handle.item_id.clone());
                    started(modality, handle, origin, at)
                }
                Motion::Dragging => {
                    if let Some(preview) = self
                        .dragged_item
                        .as_deref()
                        .and_then(|id| decorations.preview_mut(id))
                    {
                        preview.follow(at);
                    }
                    vec![Recognized::Gesture(GestureEvent::moved(modality, at))]
                }
                Motion::Idle | Motion::Pending => Vec::new(),
            },
            TouchInput::End { at } => {
                if let Some(id) = self.dragged_item.take() {
                    decorations.remove_preview(&id);
                }
                release_signal(self.gate.release(), modality, at)
            }
        }
    }

    fn is_tracking(&self) -> bool {
        self.gate.is_pressed()
    }

    fn reset(&mut self) {
        self.gate.clear();
        self.dragged_item = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::gesture::Gesture;

    fn handle() -> DragHandle {
        DragHandle::new("t1", "week-1", 0)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn kinds(out: &[Recognized]) -> Vec<&'static str> {
        out.iter()
            .map(|r| match r {
                Recognized::Tap { .. } => "tap",
                Recognized::Gesture(g) => match g.gesture {
                    Gesture::Start { .. } => "start",
                    Gesture::Move { .. } => "move",
                    Gesture::End { .. } => "end",
                },
            })
            .collect()
    }

    #[test]
    fn mouse_press_without_travel_is_a_tap() {
        let mut deco = DragDecorations::new();
        let mut a = MouseDistanceAdapter::new(&DragConfig::default());
        assert!(a.handle(MouseInput::Down { handle: handle(), at: p(10.0, 10.0) }, &mut deco).is_empty());
        assert!(a.handle(MouseInput::Move { at: p(13.0, 14.0) }, &mut deco).is_empty());
        let out = a.handle(MouseInput::Up { at: p(13.0, 14.0) }, &mut deco);
        assert_eq!(out, vec![Recognized::Tap { item_id: "t1".into() }]);
        assert!(!a.is_tracking());
    }

    #[test]
    fn mouse_threshold_is_strict_euclidean() {
        let mut deco = DragDecorations::new();
        let mut a = MouseDistanceAdapter::new(&DragConfig::default());
        a.handle(MouseInput::Down { handle: handle(), at: p(0.0, 0.0) }, &mut deco);
        // exactly 5px: not yet
        assert!(a.handle(MouseInput::Move { at: p(3.0, 4.0) }, &mut deco).is_empty());
        // 4px on each axis is under 5 per axis but 5.66 Euclidean
        let out = a.handle(MouseInput::Move { at: p(4.0, 4.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["start", "move"]);
        match &out[0] {
            Recognized::Gesture(GestureEvent {
                modality,
                gesture: Gesture::Start { handle, at },
            }) => {
                assert_eq!(*modality, InputModality::Fallback);
                assert_eq!(handle.item_id, "t1");
                assert_eq!(*at, p(0.0, 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        let out = a.handle(MouseInput::Move { at: p(40.0, 4.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["move"]);
        let out = a.handle(MouseInput::Up { at: p(40.0, 4.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["end"]);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut deco = DragDecorations::new();
        let mut a = MouseDistanceAdapter::new(&DragConfig::default());
        assert!(a.handle(MouseInput::Move { at: p(100.0, 100.0) }, &mut deco).is_empty());
        assert!(a.handle(MouseInput::Up { at: p(100.0, 100.0) }, &mut deco).is_empty());
    }

    #[test]
    fn touch_below_threshold_stays_a_tap() {
        let mut deco = DragDecorations::new();
        let mut a = TouchAdapter::new(&DragConfig::default());
        a.handle(
            TouchInput::Start { handle: handle(), at: p(50.0, 50.0), grab_offset: p(5.0, 5.0) },
            &mut deco,
        );
        // 8px: over the mouse threshold but under the touch one
        assert!(a.handle(TouchInput::Move { at: p(58.0, 50.0) }, &mut deco).is_empty());
        assert_eq!(deco.preview_count(), 0);
        let out = a.handle(TouchInput::End { at: p(58.0, 50.0) }, &mut deco);
        assert_eq!(out, vec![Recognized::Tap { item_id: "t1".into() }]);
    }

    #[test]
    fn touch_drag_manages_its_preview() {
        let mut deco = DragDecorations::new();
        let mut a = TouchAdapter::new(&DragConfig::default());
        a.handle(
            TouchInput::Start { handle: handle(), at: p(50.0, 50.0), grab_offset: p(5.0, 5.0) },
            &mut deco,
        );
        let out = a.handle(TouchInput::Move { at: p(50.0, 70.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["start", "move"]);
        assert_eq!(deco.preview("t1").unwrap().position, p(45.0, 65.0));

        a.handle(TouchInput::Move { at: p(60.0, 90.0) }, &mut deco);
        assert_eq!(deco.preview("t1").unwrap().position, p(55.0, 85.0));

        let out = a.handle(TouchInput::End { at: p(60.0, 90.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["end"]);
        assert_eq!(deco.preview_count(), 0);
    }

    #[test]
    fn native_drop_then_dragend_ends_once() {
        let mut deco = DragDecorations::new();
        let mut a = NativeDragAdapter::new(&DragConfig::default());
        a.handle(NativeInput::Press { handle: handle(), at: p(0.0, 0.0) }, &mut deco);
        let out = a.handle(NativeInput::DragStart { at: p(10.0, 0.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["start", "move"]);
        let out = a.handle(NativeInput::DragOver { at: p(20.0, 0.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["move"]);
        let out = a.handle(NativeInput::Drop { at: p(20.0, 0.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["end"]);
        assert!(a.handle(NativeInput::DragEnd { at: p(20.0, 0.0) }, &mut deco).is_empty());
    }

    #[test]
    fn native_dragend_without_drop_still_ends() {
        let mut deco = DragDecorations::new();
        let mut a = NativeDragAdapter::new(&DragConfig::default());
        a.handle(NativeInput::Press { handle: handle(), at: p(0.0, 0.0) }, &mut deco);
        a.handle(NativeInput::DragStart { at: p(2.0, 0.0) }, &mut deco);
        // early dragstart: gesture waits for real travel
        let out = a.handle(NativeInput::DragOver { at: p(30.0, 0.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["start", "move"]);
        let out = a.handle(NativeInput::DragEnd { at: p(30.0, 0.0) }, &mut deco);
        assert_eq!(kinds(&out), vec!["end"]);
    }

    #[test]
    fn native_click_is_a_tap() {
        let mut deco = DragDecorations::new();
        let mut a = NativeDragAdapter::new(&DragConfig::default());
        a.handle(NativeInput::Press { handle: handle(), at: p(0.0, 0.0) }, &mut deco);
        let out = a.handle(NativeInput::Release { at: p(1.0, 0.0) }, &mut deco);
        assert_eq!(out, vec![Recognized::Tap { item_id: "t1".into() }]);
    }

    #[test]
    fn reset_forgets_press() {
        let mut deco = DragDecorations::new();
        let mut a = MouseDistanceAdapter::new(&DragConfig::default());
        a.handle(MouseInput::Down { handle: handle(), at: p(0.0, 0.0) }, &mut deco);
        a.handle(MouseInput::Move { at: p(50.0, 0.0) }, &mut deco);
        a.reset();
        assert!(!a.is_tracking());
        assert!(a.handle(MouseInput::Up { at: p(50.0, 0.0) }, &mut deco).is_empty());
    }
}
