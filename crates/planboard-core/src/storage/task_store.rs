//! Persistence collaborator contract and a JSON file implementation.
//!
//! The board never talks to storage directly; after every optimistic move the
//! caller hands the full updated task to a [`TaskStore`], usually through
//! [`crate::schedule::dispatch_save`] which adds bounded retries.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::task::Task;

/// Storage backend for tasks.
///
/// `save` is an upsert keyed by task id.
pub trait TaskStore: Send + Sync {
    /// Persist the full task.
    fn save(&self, task: &Task) -> Result<(), StoreError>;

    /// Load every stored task in stored order.
    fn load_all(&self) -> Result<Vec<Task>, StoreError>;
}

/// Tasks stored as a pretty-printed JSON array.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles between concurrent saves.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `~/.config/planboard/tasks.json`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, crate::error::ConfigError> {
        Ok(Self::new(super::data_dir()?.join("tasks.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole file with `tasks`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.write(tasks)
    }

    fn read(&self) -> Result<Vec<Task>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Unavailable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Unavailable {
            path: self.path.clone(),
            source,
        })
    }
}

impl TaskStore for JsonFileStore {
    fn save(&self, task: &Task) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut tasks = self.read()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.write(&tasks)
    }

    fn load_all(&self) -> Result<Vec<Task>, StoreError> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tasks.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_upserts_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tasks.json"));

        store.save(&task("a", "2025-05-13", Some(1))).unwrap();
        store.save(&task("b", "2025-05-14", Some(1))).unwrap();

        let mut moved = task("a", "2025-05-20", Some(2));
        moved.title = "Moved".into();
        store.save(&moved).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].week_number, Some(2));
        assert_eq!(all[0].title, "Moved");
        assert_eq!(all[1].id, "b");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load_all(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn moves_keep_fields_written_by_other_clients() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut stored = task("a", "2025-05-13", Some(1));
        stored.phase = Some(1);
        stored.primary_focus = Some("Economy".into());
        std::fs::write(&path, serde_json::to_string(&vec![stored]).unwrap()).unwrap();

        let store = JsonFileStore::new(&path);
        let mut board = crate::task::TaskBoard::from_tasks(store.load_all().unwrap());
        let receipt = board.visual_move("a", 3, None).unwrap();
        store.save(&receipt.task).unwrap();

        let reloaded = store.load_all().unwrap();
        assert_eq!(reloaded[0].phase, Some(1));
        assert_eq!(reloaded[0].primary_focus.as_deref(), Some("Economy"));
        assert_eq!(reloaded[0].visual_week_number, Some(3));
    }
}
