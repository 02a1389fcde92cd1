//! Board views: tasks grouped into the columns a drag can target.

use chrono::NaiveDate;
use clap::Subcommand;
use planboard_core::bucketing::{group_by_day, group_by_week};
use planboard_core::{ContainerId, RolloverEngine, Task};
use serde::Serialize;

use super::{parse_date, today_or_now, CliResult, Context};

#[derive(Subcommand)]
pub enum BoardAction {
    /// Week columns, including overdue reminders
    Week {
        /// Current planning week; defaults to the week containing today
        #[arg(long)]
        current: Option<u32>,
        /// Reference date for overdue checks (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
        /// Leave overdue reminders out
        #[arg(long)]
        no_rollover: bool,
    },
    /// Day columns
    Day,
}

/// One droppable column and the tasks it shows.
#[derive(Serialize)]
struct Column<'a> {
    container: ContainerId,
    tasks: Vec<&'a Task>,
}

pub fn run(action: BoardAction, ctx: &Context) -> CliResult {
    let (_, board) = ctx.open_board()?;
    let config = ctx.config()?;
    let calendar = planboard_core::WeekCalendar::new(config.calendar.clone());

    match action {
        BoardAction::Week {
            current,
            today,
            no_rollover,
        } => {
            let today = today_or_now(today);
            let current = current.unwrap_or_else(|| calendar.week_for_date(today));
            let reminders = if no_rollover {
                Vec::new()
            } else {
                RolloverEngine::with_config(&config.rollover).generate(
                    board.tasks(),
                    current,
                    today,
                )
            };
            let columns: Vec<Column<'_>> = group_by_week(board.tasks(), &reminders, &calendar)
                .into_iter()
                .map(|(week, tasks)| Column {
                    container: ContainerId::week(week),
                    tasks,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
        BoardAction::Day => {
            let columns: Vec<Column<'_>> = group_by_day(board.tasks())
                .into_iter()
                .map(|(day, tasks)| Column {
                    container: ContainerId::day(day),
                    tasks,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
    }
    Ok(())
}
