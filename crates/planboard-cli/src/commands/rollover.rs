//! Overdue reminders.

use chrono::NaiveDate;
use clap::Args;
use planboard_core::RolloverEngine;

use super::{parse_date, today_or_now, CliResult, Context};

#[derive(Args)]
pub struct RolloverArgs {
    /// Current planning week; defaults to the week containing today
    #[arg(long)]
    week: Option<u32>,
    /// Reference date for overdue checks (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// How many weeks past the current one to echo into (overrides config)
    #[arg(long)]
    max_ahead: Option<u32>,
}

pub fn run(args: RolloverArgs, ctx: &Context) -> CliResult {
    let config = ctx.config()?;
    let (_, board) = ctx.open_board()?;
    let calendar = planboard_core::WeekCalendar::new(config.calendar);

    let today = today_or_now(args.today);
    let week = args.week.unwrap_or_else(|| calendar.week_for_date(today));
    let mut rollover = config.rollover;
    if let Some(max_ahead) = args.max_ahead {
        rollover.max_weeks_ahead = max_ahead;
    }

    let reminders = RolloverEngine::with_config(&rollover).generate(board.tasks(), week, today);
    println!("{}", serde_json::to_string_pretty(&reminders)?);
    Ok(())
}
