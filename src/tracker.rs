use crate::errors::{AppError, SyncError};
use crate::models::{
    AppStatus, DeleteOutcome, Habit, HabitDraft, HabitOutcome, SyncConfig, ToggleOutcome,
    TrackerView, normalize_category, sample_habits,
};
use crate::stats::build_progress;
use crate::storage;
use crate::store::HabitStore;
use crate::sync::HabitRemote;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
struct LoadState {
    status: AppStatus,
    error: Option<String>,
}

/// Habit list, endpoint configuration and a remote, kept in step.
///
/// Local state is always changed first. Locks are only held around the local
/// mutation, never across a remote call, so requests in flight do not block
/// each other and their responses may land in any order.
pub struct HabitTracker<R> {
    remote: R,
    settings_path: PathBuf,
    store: RwLock<HabitStore>,
    config: RwLock<SyncConfig>,
    load_state: Mutex<LoadState>,
    load_generation: AtomicU64,
}

impl<R: HabitRemote> HabitTracker<R> {
    pub fn new(remote: R, config: SyncConfig, settings_path: PathBuf) -> Self {
        Self {
            remote,
            settings_path,
            store: RwLock::new(HabitStore::default()),
            config: RwLock::new(config),
            load_state: Mutex::new(LoadState {
                status: AppStatus::Loading,
                error: None,
            }),
            load_generation: AtomicU64::new(0),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub async fn config(&self) -> SyncConfig {
        self.config.read().await.clone()
    }

    pub async fn snapshot(&self) -> Arc<Vec<Habit>> {
        self.store.read().await.snapshot()
    }

    pub async fn habit(&self, id: &str) -> Option<Habit> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn view(&self) -> TrackerView {
        let store = self.store.read().await;
        let config = self.config.read().await;
        let load_state = self.load_state.lock().await;
        let habits = store.snapshot();
        TrackerView {
            status: load_state.status,
            error: load_state.error.clone(),
            configured: config.is_configured(),
            progress: build_progress(&habits),
            habits,
        }
    }

    /// Fills the list: sample data when unconfigured, otherwise the remote list.
    /// A failed fetch keeps the current list and leaves the tracker in `error`.
    /// Results of a load that was superseded by a newer load or a config change
    /// are dropped.
    pub async fn load(&self) -> Result<(), SyncError> {
        let (generation, config) = {
            let config = self.config.read().await;
            let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, config.clone())
        };

        if !config.is_configured() {
            if self
                .apply_load(generation, Some(sample_habits()), AppStatus::Ready, None)
                .await
            {
                info!("no endpoint configured, showing sample habits");
            }
            return Ok(());
        }

        self.apply_load(generation, None, AppStatus::Loading, None)
            .await;
        match self.remote.fetch_all(config.endpoint_url()).await {
            Ok(habits) => {
                let count = habits.len();
                if self
                    .apply_load(generation, Some(habits), AppStatus::Ready, None)
                    .await
                {
                    info!(count, "loaded habits from endpoint");
                } else {
                    info!(endpoint = config.endpoint_url(), "dropping superseded load");
                }
                Ok(())
            }
            Err(err) => {
                error!("loading habits failed: {err}");
                let message = err.to_string();
                if !self
                    .apply_load(generation, None, AppStatus::Error, Some(message))
                    .await
                {
                    info!(endpoint = config.endpoint_url(), "ignoring failure of superseded load");
                }
                Err(err)
            }
        }
    }

    /// Flips the habit locally, then confirms remotely; a rejected update is
    /// reverted. Returns `None` for an unknown id without contacting the remote.
    pub async fn toggle(&self, id: &str) -> Option<ToggleOutcome> {
        let completed = self.store.write().await.toggle(id)?;
        let config = self.config().await;
        if !config.is_configured() {
            return Some(ToggleOutcome {
                id: id.to_string(),
                completed,
                synced: None,
            });
        }

        let synced = self
            .remote
            .set_completion(config.endpoint_url(), id, completed)
            .await;
        let completed = if synced {
            completed
        } else {
            warn!(id, "reverting toggle after failed remote update");
            self.store.write().await.set_completed(id, !completed);
            !completed
        };

        Some(ToggleOutcome {
            id: id.to_string(),
            completed,
            synced: Some(synced),
        })
    }

    pub async fn create(&self, draft: &HabitDraft) -> Result<HabitOutcome, AppError> {
        let name = draft.trimmed_name();
        if name.is_empty() {
            return Err(AppError::bad_request("habit name must not be empty"));
        }

        let habit = {
            let mut store = self.store.write().await;
            let id = store.fresh_id(Utc::now().timestamp_millis());
            let habit = Habit::new(id, name, draft.category.as_deref());
            store.upsert(habit.clone());
            habit
        };

        let config = self.config().await;
        let synced = if config.is_configured() {
            let ok = self.remote.create(config.endpoint_url(), &habit).await;
            if !ok {
                warn!(id = %habit.id, "remote create failed, keeping local habit");
            }
            Some(ok)
        } else {
            None
        };

        Ok(HabitOutcome { habit, synced })
    }

    pub async fn edit(&self, id: &str, draft: &HabitDraft) -> Result<HabitOutcome, AppError> {
        let name = draft.trimmed_name();
        if name.is_empty() {
            return Err(AppError::bad_request("habit name must not be empty"));
        }

        let habit = {
            let mut store = self.store.write().await;
            let Some(existing) = store.get(id) else {
                return Err(AppError::not_found(format!("habit {id} not found")));
            };
            let habit = Habit {
                name: name.to_string(),
                category: normalize_category(draft.category.as_deref()),
                ..existing.clone()
            };
            store.upsert(habit.clone());
            habit
        };

        let config = self.config().await;
        let synced = if config.is_configured() {
            let ok = self
                .remote
                .update(
                    config.endpoint_url(),
                    &habit.id,
                    &habit.name,
                    habit.category_label(),
                )
                .await;
            if !ok {
                warn!(id, "remote edit failed, keeping local changes");
            }
            Some(ok)
        } else {
            None
        };

        Ok(HabitOutcome { habit, synced })
    }

    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        let removed = self.store.write().await.remove(id);
        let config = self.config().await;
        let synced = if config.is_configured() {
            let ok = self.remote.delete(config.endpoint_url(), id).await;
            if !ok {
                warn!(id, "remote delete failed, habit stays removed locally");
            }
            Some(ok)
        } else {
            None
        };

        DeleteOutcome { removed, synced }
    }

    /// Persists a new endpoint, switches to it and reloads.
    pub async fn save_config(&self, endpoint_url: &str) -> Result<TrackerView, AppError> {
        let config = SyncConfig::from_endpoint(endpoint_url);
        storage::save_config(&self.settings_path, &config).await?;
        {
            let mut current = self.config.write().await;
            *current = config;
            self.load_generation.fetch_add(1, Ordering::SeqCst);
        }

        // A failed load is already recorded in the view.
        let _ = self.load().await;
        Ok(self.view().await)
    }

    /// Applies the outcome of load `generation` unless a newer one has started.
    async fn apply_load(
        &self,
        generation: u64,
        habits: Option<Vec<Habit>>,
        status: AppStatus,
        error: Option<String>,
    ) -> bool {
        let mut store = self.store.write().await;
        let mut state = self.load_state.lock().await;
        if self.load_generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        if let Some(habits) = habits {
            store.replace_all(habits);
        }
        state.status = status;
        state.error = error;
        true
    }
}
