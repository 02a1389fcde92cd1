//! # Planboard Core Library
//!
//! Core logic for a day/week task planner where tasks are rearranged by drag
//! and drop. The CLI and any GUI are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Drag and drop** ([`dnd`]): input adapters for native drag, mouse and
//!   touch feed one gesture stream into a single-session coordinator that
//!   hit-tests a registry of drop targets. Every end-of-drag channel funnels
//!   into one idempotent decoration reset.
//! - **Scheduling** ([`schedule`]): a drop on a day rewrites the task's
//!   persisted schedule; a drop on a week only moves it visually. Moves are
//!   optimistic and saved afterwards with bounded retries.
//! - **Rollover** ([`rollover`]): overdue tasks are echoed into later weeks as
//!   display-only reminders.
//! - **Storage** ([`storage`]): TOML configuration and a JSON task store.
//!
//! ## Key Components
//!
//! - [`DragController`]: owns the whole drag pipeline
//! - [`TaskBoard`]: in-memory tasks with persisted and visual moves
//! - [`Projector`]: maps drop outcomes to board moves
//! - [`RolloverEngine`]: overdue reminder generation
//! - [`Config`]: application configuration

pub mod bucketing;
pub mod calendar;
pub mod dnd;
pub mod error;
pub mod events;
pub mod rollover;
pub mod schedule;
pub mod storage;
pub mod task;

pub use calendar::{Bucket, ContainerId, WeekCalendar};
pub use dnd::{ControllerEvent, DragController, DragNotification, InputModality, RawInput};
pub use error::{ConfigError, CoreError, HitTestError, ProjectionError, StoreError};
pub use events::BoardEvent;
pub use rollover::{RolloverEngine, RolloverInstance};
pub use schedule::{dispatch_save, Projector, RetryPolicy, SaveOutcome};
pub use storage::{Config, FailurePolicy, JsonFileStore, TaskStore};
pub use task::board::{MoveKind, MoveReceipt};
pub use task::{Priority, Task, TaskBoard};
