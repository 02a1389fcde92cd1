//! Saving moved tasks with bounded retries.
//!
//! The board is updated before anything is saved. This module only decides
//! how hard to try; what happens after a final failure is up to
//! [`crate::task::TaskBoard::settle`] and the configured failure policy.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::{PersistenceConfig, TaskStore};
use crate::task::Task;

/// Exponential backoff settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_factor: backoff_factor.max(1),
        }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            config.backoff_factor,
        )
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1);
        let factor = self.backoff_factor.saturating_pow(exp);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PersistenceConfig::default())
    }
}

/// Final result of saving one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { attempts: u32 },
    Failed { attempts: u32, error: String },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            SaveOutcome::Saved { attempts } | SaveOutcome::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Save `task`, retrying with exponential backoff.
pub async fn dispatch_save<S>(store: &S, task: &Task, policy: &RetryPolicy) -> SaveOutcome
where
    S: TaskStore + ?Sized,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match store.save(task) {
            Ok(()) => {
                tracing::debug!(task_id = %task.id, attempt, "task saved");
                return SaveOutcome::Saved { attempts: attempt };
            }
            Err(e) if attempt >= policy.max_attempts => {
                tracing::warn!(task_id = %task.id, attempt, error = %e, "giving up on save");
                return SaveOutcome::Failed {
                    attempts: attempt,
                    error: e.to_string(),
                };
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    task_id = %task.id,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "save failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Fire-and-forget variant: runs [`dispatch_save`] on the current runtime.
pub fn spawn_save(
    store: Arc<dyn TaskStore>,
    task: Task,
    policy: RetryPolicy,
) -> tokio::task::JoinHandle<SaveOutcome> {
    tokio::spawn(async move { dispatch_save(store.as_ref(), &task, &policy).await })
}
