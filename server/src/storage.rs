// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use common::{RecordError, Task};
use tracing::{debug, info};

use crate::store::KeyValueStore;

pub const TASKS_KEY: &str = "tasks";
pub const REMINDERS_ENABLED_KEY: &str = "reminders_enabled";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("key-value store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Owns the canonical task collection and the reminders setting.
///
/// Every mutation reads the whole collection, changes it in memory and
/// writes the whole collection back. Nothing serializes two overlapping
/// mutations: the last write wins, so callers must await one before
/// starting the next.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads every stored task. A store that was never written reads as empty.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, StorageError> {
        match self.store.get_string(TASKS_KEY).await? {
            Some(raw) => Ok(common::decode_tasks(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrites the stored collection with `tasks`.
    pub async fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let raw = common::encode_tasks(tasks)?;
        self.store.set_string(TASKS_KEY, &raw).await?;
        debug!("Saved {} tasks.", tasks.len());
        Ok(())
    }

    pub async fn get_reminders_enabled(&self) -> Result<bool, StorageError> {
        Ok(self
            .store
            .get_bool(REMINDERS_ENABLED_KEY)
            .await?
            .unwrap_or(true))
    }

    pub async fn set_reminders_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.store.set_bool(REMINDERS_ENABLED_KEY, enabled).await?;
        info!("Reminders enabled set to {}.", enabled);
        Ok(())
    }

    pub async fn find_task(&self, id: &str) -> Result<Option<Task>, StorageError> {
        let tasks = self.get_tasks().await?;
        Ok(common::find_by_id(&tasks, id).cloned())
    }

    pub async fn tasks_due_on(&self, date: NaiveDate) -> Result<Vec<Task>, StorageError> {
        let tasks = self.get_tasks().await?;
        Ok(common::tasks_due_on(&tasks, date))
    }

    pub async fn add_task(&self, task: Task) -> Result<(), StorageError> {
        debug!("Adding task {}", task.id);
        let mut tasks = self.get_tasks().await?;
        tasks.push(task);
        self.save_tasks(&tasks).await
    }

    /// Replaces the first stored task with the same id.
    /// Returns `false` without writing when no task has that id.
    pub async fn update_task(&self, task: Task) -> Result<bool, StorageError> {
        debug!("Updating task {}", task.id);
        let mut tasks = self.get_tasks().await?;
        if !common::update_by_id(&mut tasks, task) {
            return Ok(false);
        }
        self.save_tasks(&tasks).await?;
        Ok(true)
    }

    /// Flips completion on the first task with `id` and returns it.
    pub async fn toggle_completion(&self, id: &str) -> Result<Option<Task>, StorageError> {
        debug!("Toggling completion of task {}", id);
        let mut tasks = self.get_tasks().await?;
        let toggled = match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.is_completed = !task.is_completed;
                task.clone()
            }
            None => return Ok(None),
        };
        self.save_tasks(&tasks).await?;
        Ok(Some(toggled))
    }

    /// Removes every task with `id`, returning how many were removed.
    pub async fn delete_task(&self, id: &str) -> Result<usize, StorageError> {
        debug!("Deleting task {}", id);
        let mut tasks = self.get_tasks().await?;
        let removed = common::delete_by_id(&mut tasks, id);
        if removed > 0 {
            self.save_tasks(&tasks).await?;
        }
        Ok(removed)
    }

    /// Tasks to notify about at `now`; empty while reminders are disabled.
    pub async fn pending_reminders(&self, now: NaiveDateTime) -> Result<Vec<Task>, StorageError> {
        if !self.get_reminders_enabled().await? {
            debug!("Reminders are disabled, skipping check.");
            return Ok(Vec::new());
        }
        let tasks = self.get_tasks().await?;
        Ok(common::due_for_notification(&tasks, now))
    }

    /// Forgets all tasks and settings.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.store.remove(TASKS_KEY).await?;
        self.store.remove(REMINDERS_ENABLED_KEY).await?;
        info!("All stored data cleared.");
        Ok(())
    }
}
