//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use planboard_core::{Priority, Task, TaskStore};

use super::{parse_date, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: NaiveDate,
        /// Start date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        /// Planning week (1-based)
        #[arg(long)]
        week: Option<u32>,
        /// Category, used to place the task inside a week
        #[arg(long)]
        category: Option<String>,
        /// Priority: low, medium or high
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        /// Task description
        #[arg(long)]
        description: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks that are not completed
        #[arg(long)]
        open: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Flip the completed flag
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(format!("unknown priority '{other}' (low, medium, high)")),
    }
}

pub fn run(action: TaskAction, ctx: &Context) -> CliResult {
    match action {
        TaskAction::Add {
            title,
            due,
            start,
            week,
            category,
            priority,
            description,
        } => {
            let mut task = Task::new(title, due).with_priority(priority);
            if let Some(start) = start {
                if start > due {
                    return Err(format!("start date {start} is after due date {due}").into());
                }
                task = task.with_start_date(start);
            }
            if let Some(week) = week {
                task = task.with_week(week);
            }
            if let Some(category) = category {
                task = task.with_category(category);
            }
            task.description = description;

            ctx.store()?.save(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { open } => {
            let (_, board) = ctx.open_board()?;
            let tasks: Vec<&Task> = board
                .tasks()
                .iter()
                .filter(|t| !open || !t.completed)
                .collect();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => {
            let (_, board) = ctx.open_board()?;
            let task = board
                .get(&id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(task)?);
        }
        TaskAction::Toggle { id } => {
            let (store, mut board) = ctx.open_board()?;
            let completed = board.toggle(&id)?;
            if let Some(task) = board.get(&id) {
                store.save(task)?;
            }
            println!("Task {id} completed: {completed}");
        }
        TaskAction::Delete { id } => {
            let (store, mut board) = ctx.open_board()?;
            let removed = board.delete(&id)?;
            store.save_all(board.tasks())?;
            println!("Task deleted: {}", removed.id);
        }
    }
    Ok(())
}
