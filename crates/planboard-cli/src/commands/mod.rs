//! CLI subcommands and the helpers they share.

pub mod board;
pub mod config;
pub mod move_cmd;
pub mod replay;
pub mod rollover;
pub mod task;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use planboard_core::{Config, JsonFileStore, TaskBoard, TaskStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Options shared by every board-facing command.
pub struct Context {
    tasks: Option<PathBuf>,
}

impl Context {
    pub fn new(tasks: Option<PathBuf>) -> Self {
        Self { tasks }
    }

    /// Store at `--tasks`, or the default data directory.
    pub fn store(&self) -> Result<JsonFileStore, Box<dyn std::error::Error>> {
        match &self.tasks {
            Some(path) => Ok(JsonFileStore::new(path)),
            None => Ok(JsonFileStore::open_default()?),
        }
    }

    /// Store plus the board loaded from it.
    pub fn open_board(&self) -> Result<(JsonFileStore, TaskBoard), Box<dyn std::error::Error>> {
        let store = self.store()?;
        let board = TaskBoard::from_tasks(store.load_all()?);
        Ok((store, board))
    }

    /// Current config; never writes a default file.
    pub fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        Ok(Config::read()?)
    }
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

/// `--today` if given, else the local date.
pub fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}
