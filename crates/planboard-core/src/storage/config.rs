//! TOML-based application configuration.
//!
//! Stores:
//! - Drag thresholds per input modality
//! - Rollover horizon
//! - Week numbering and weekday placement for week-level moves
//! - Persistence retry and failure policy
//!
//! Configuration is stored at `~/.config/planboard/config.toml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Drag gesture detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Pixels a mouse press must travel before a drag starts.
    #[serde(default = "default_pointer_threshold")]
    pub pointer_threshold_px: f64,
    /// Pixels a touch must travel before a drag starts.
    #[serde(default = "default_touch_threshold")]
    pub touch_threshold_px: f64,
    /// Minimum travel honoured for native drag-start events.
    #[serde(default = "default_pointer_threshold")]
    pub native_threshold_px: f64,
    /// Whether Escape cancels an active drag.
    #[serde(default = "default_true")]
    pub cancel_on_escape: bool,
}

/// Overdue rollover settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloverConfig {
    #[serde(default = "default_max_weeks_ahead")]
    pub max_weeks_ahead: u32,
}

/// Week numbering and weekday placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Monday that starts week 1.
    #[serde(default = "default_week_one_start")]
    pub week_one_start: NaiveDate,
    /// Offset for categories missing from the map.
    #[serde(default = "default_category_offset")]
    pub default_category_offset: u32,
    /// Category name -> weekday offset (0 = Monday) used for week-level moves.
    #[serde(default = "default_category_day_offsets")]
    pub category_day_offsets: BTreeMap<String, u32>,
}

/// What to do with an optimistic move whose save ultimately failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep showing the move and notify the user it may not survive a reload.
    KeepOptimistic,
    /// Restore the task to its pre-move state.
    Rollback,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::KeepOptimistic
    }
}

/// Persistence retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: u32,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/planboard/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub rollover: RolloverConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_pointer_threshold() -> f64 {
    5.0
}
fn default_touch_threshold() -> f64 {
    10.0
}
fn default_true() -> bool {
    true
}
fn default_max_weeks_ahead() -> u32 {
    10
}
fn default_week_one_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 12).unwrap_or_default()
}
fn default_category_offset() -> u32 {
    3
}
fn default_category_day_offsets() -> BTreeMap<String, u32> {
    [
        ("GS Subject 1", 0),
        ("GS Subject 2 / Optional", 1),
        ("CSAT", 2),
        ("Current Affairs", 4),
        ("Weekly Test", 6),
    ]
    .into_iter()
    .map(|(category, offset)| (category.to_string(), offset))
    .collect()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    250
}
fn default_backoff_factor() -> u32 {
    2
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pointer_threshold_px: default_pointer_threshold(),
            touch_threshold_px: default_touch_threshold(),
            native_threshold_px: default_pointer_threshold(),
            cancel_on_escape: true,
        }
    }
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            max_weeks_ahead: default_max_weeks_ahead(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            week_one_start: default_week_one_start(),
            default_category_offset: default_category_offset(),
            category_day_offsets: default_category_day_offsets(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or defaults cannot be written.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load without writing anything: defaults when the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Self, ConfigError> {
        Self::read_from(&Self::path()?)
    }

    /// [`Config::read`] from an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| load_failed(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(load_failed(e.to_string())),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
