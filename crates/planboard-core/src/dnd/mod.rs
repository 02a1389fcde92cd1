//! Drag and drop coordination.
//!
//! ```text
//!   raw input ──▶ adapters ──▶ GestureEvent ──▶ DragCoordinator ──▶ DragNotification
//!                   │                              │    ▲
//!                   ▼                              ▼    │ hit_test
//!            DragDecorations ◀── reset_all ── DropTargetRegistry
//! ```
//!
//! [`DragController`] bundles all of it into one owned value.

pub mod adapters;
pub mod cleanup;
pub mod controller;
pub mod coordinator;
pub mod geometry;
pub mod gesture;
pub mod registry;
pub mod session;

pub use adapters::{
    GestureAdapter, MouseDistanceAdapter, MouseInput, NativeDragAdapter, NativeInput,
    TouchAdapter, TouchInput,
};
pub use cleanup::{CleanupReport, CleanupTrigger, DragDecorations, DragFlag, DragPreview, FlagTarget};
pub use controller::{ControllerEvent, DragController, GlobalSignal, RawInput};
pub use coordinator::{CoordinatorState, DragCoordinator, DragNotification};
pub use geometry::{Point, Rect};
pub use gesture::{DragHandle, Gesture, GestureEvent, InputModality, Recognized};
pub use registry::{DropRegion, DropTargetRegistry, RectRegion, Registration};
pub use session::DragSession;
