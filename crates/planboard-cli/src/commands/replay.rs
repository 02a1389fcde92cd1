//! Replays a recorded drag script through the full controller pipeline.
//!
//! # Script format
//!
//! ```json
//! {
//!   "targets": [
//!     { "id": "week-1", "bounds": { "x": 0, "y": 0, "width": 200, "height": 600 } },
//!     { "id": "week-2", "bounds": { "x": 200, "y": 0, "width": 200, "height": 600 } }
//!   ],
//!   "steps": [
//!     { "source": "mouse", "event": { "type": "down", "handle": { "item_id": "t1", "container_id": "week-1" }, "at": { "x": 20, "y": 20 } } },
//!     { "source": "mouse", "event": { "type": "move", "at": { "x": 250, "y": 20 } } },
//!     { "source": "mouse", "event": { "type": "up", "at": { "x": 250, "y": 20 } } },
//!     { "unmount": "week-2" },
//!     { "unregister": "week-1" },
//!     { "cancel": true }
//!   ]
//! }
//! ```
//!
//! `unmount` drops a region without unregistering it, `unregister` removes it
//! from the registry and `cancel` aborts whatever drag is in flight.
//!
//! Every resulting board event is printed as one JSON line. Resolved moves are
//! applied to the board and saved unless `--dry-run` is given.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use planboard_core::dnd::{CleanupTrigger, Rect, RectRegion};
use planboard_core::{
    BoardEvent, ContainerId, ControllerEvent, DragController, DragNotification, Projector,
    RawInput,
};
use serde::Deserialize;

use super::move_cmd::save_move;
use super::{CliResult, Context};

#[derive(Args)]
pub struct ReplayArgs {
    /// Script file (JSON)
    script: PathBuf,
    /// Apply moves in memory only
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    targets: Vec<Target>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Target {
    id: ContainerId,
    bounds: Rect,
    #[serde(default)]
    depth: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    /// Drop the region without unregistering it, like a column leaving the screen.
    Unmount { unmount: ContainerId },
    Unregister { unregister: ContainerId },
    Cancel { cancel: bool },
    Input(RawInput),
}

pub fn run(args: ReplayArgs, ctx: &Context) -> CliResult {
    let content = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("cannot read {}: {e}", args.script.display()))?;
    let script: Script = serde_json::from_str(&content)?;

    let config = ctx.config()?;
    let (store, mut board) = ctx.open_board()?;
    let projector = Projector::new(planboard_core::WeekCalendar::new(config.calendar.clone()));

    let mut controller = DragController::new(&config.drag);
    let mut mounted: BTreeMap<ContainerId, Rc<RectRegion>> = BTreeMap::new();
    for target in script.targets {
        let region = Rc::new(RectRegion::nested(target.bounds, target.depth));
        let _ = controller.registry_mut().register(target.id.clone(), &region);
        mounted.insert(target.id, region);
    }
    tracing::debug!(targets = mounted.len(), steps = script.steps.len(), "replaying script");

    let mut finished = 0usize;
    for step in script.steps {
        let events = match step {
            Step::Unmount { unmount } => {
                if mounted.remove(&unmount).is_none() {
                    tracing::warn!(container = %unmount, "unmount of unknown target");
                }
                continue;
            }
            Step::Unregister { unregister } => {
                if !controller.registry_mut().unregister_id(&unregister) {
                    tracing::warn!(container = %unregister, "unregister of unknown target");
                }
                mounted.remove(&unregister);
                continue;
            }
            Step::Cancel { cancel: false } => continue,
            Step::Cancel { cancel: true } => controller.cancel(CleanupTrigger::Explicit),
            Step::Input(input) => controller.handle(input),
        };

        for event in events {
            if let Some(board_event) = BoardEvent::from_controller(&event) {
                emit(&board_event)?;
            }
            if matches!(&event, ControllerEvent::Drag(note) if note.is_terminal()) {
                finished += 1;
            }
            let ControllerEvent::Drag(DragNotification::Moved { item_id, from, to }) = event
            else {
                continue;
            };
            let receipt = match projector.apply_drop(&mut board, &item_id, &from, &to) {
                Ok(receipt) => receipt,
                Err(e) => {
                    emit(&BoardEvent::MoveRejected {
                        item_id,
                        reason: e.to_string(),
                        at: chrono::Utc::now(),
                    })?;
                    continue;
                }
            };
            if !receipt.changed() {
                continue;
            }
            emit(&receipt.event())?;
            if !args.dry_run {
                emit(&save_move(&config, &store, &mut board, &receipt)?)?;
            }
        }
    }
    tracing::debug!(finished, "replay complete");
    Ok(())
}

fn emit(event: &BoardEvent) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
