//! Moving tasks between buckets from the command line.
//!
//! A day move rewrites the persisted schedule, a week move only changes where
//! the task is shown. Either way the board is updated first and saved after,
//! with the retry and failure settings from the config.

use chrono::NaiveDate;
use clap::Subcommand;
use planboard_core::bucketing::{effective_day, effective_week};
use planboard_core::{
    dispatch_save, BoardEvent, Config, ContainerId, JsonFileStore, MoveReceipt, Projector,
    RetryPolicy, TaskBoard,
};

use super::{parse_date, CliResult, Context};

#[derive(Subcommand)]
pub enum MoveAction {
    /// Reschedule a task onto a day, keeping its start-to-due gap
    Day {
        /// Task ID
        id: String,
        /// Target day (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Show a task in another week without changing its dates
    Week {
        /// Task ID
        id: String,
        /// Target week (1-based)
        week: u32,
    },
}

pub fn run(action: MoveAction, ctx: &Context) -> CliResult {
    let config = ctx.config()?;
    let (store, mut board) = ctx.open_board()?;
    let projector = Projector::new(planboard_core::WeekCalendar::new(config.calendar.clone()));

    let (id, from, to) = match action {
        MoveAction::Day { id, date } => {
            let task = board
                .get(&id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            let from = ContainerId::day(effective_day(task));
            (id, from, ContainerId::day(date))
        }
        MoveAction::Week { id, week } => {
            if week == 0 {
                return Err("weeks are numbered from 1".into());
            }
            let task = board
                .get(&id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            let from = ContainerId::week(effective_week(task, projector.calendar()));
            (id, from, ContainerId::week(week))
        }
    };

    let receipt = projector.apply_drop(&mut board, &id, &from, &to)?;
    if !receipt.changed() {
        println!("Task {id} already in {to}");
        return Ok(());
    }
    println!("{}", serde_json::to_string(&receipt.event())?);

    let settled = save_move(&config, &store, &mut board, &receipt)?;
    println!("{}", serde_json::to_string(&settled)?);
    if settled.needs_attention() {
        return Err(format!("task {id} was moved but could not be saved").into());
    }
    Ok(())
}

/// Save the task a receipt describes and fold the outcome back into `board`.
pub(crate) fn save_move(
    config: &Config,
    store: &JsonFileStore,
    board: &mut TaskBoard,
    receipt: &MoveReceipt,
) -> Result<BoardEvent, Box<dyn std::error::Error>> {
    let policy = RetryPolicy::from_config(&config.persistence);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(dispatch_save(store, &receipt.task, &policy));
    Ok(board.settle(receipt, &outcome, config.persistence.failure_policy))
}
