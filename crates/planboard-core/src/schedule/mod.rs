//! Scheduling projection: drops become persisted or visual moves, and moved
//! tasks are handed to the store.

pub mod dispatch;
pub mod projection;

pub use dispatch::{dispatch_save, spawn_save, RetryPolicy, SaveOutcome};
pub use projection::{DayPlan, Projector};
