use crate::grid::{ToggleOutcome, toggle_date};
use crate::models::{Habit, HabitDocument};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::{path::Path, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex, broadcast};
use tracing::{error, warn};

const SNAPSHOT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("habit {0} not found")]
    NotFound(String),
    #[error("failed to write data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode data file: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout: user id -> habit id -> document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default)]
    pub users: BTreeMap<String, BTreeMap<String, HabitDocument>>,
}

impl StoreData {
    /// A user's habits in creation order.
    pub fn habits_for(&self, uid: &str) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self
            .users
            .get(uid)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| Habit::new(id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        habits.sort_by(|a, b| {
            a.doc
                .created_at
                .cmp(&b.doc.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        habits
    }
}

/// Fields to merge into a stored habit; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub goal: Option<u32>,
    pub icon: Option<String>,
}

impl HabitPatch {
    fn apply(self, doc: &mut HabitDocument) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(goal) = self.goal {
            doc.goal = Some(goal);
        }
        if let Some(icon) = self.icon {
            doc.icon = Some(icon);
        }
    }
}

#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn list(&self, uid: &str) -> Result<Vec<Habit>, StoreError>;

    async fn add(&self, uid: &str, doc: HabitDocument) -> Result<Habit, StoreError>;

    /// Merges `patch` into the stored document.
    async fn update(&self, uid: &str, id: &str, patch: HabitPatch) -> Result<Habit, StoreError>;

    /// Flips one completion date under the store lock, so concurrent toggles
    /// on the same habit never drop each other's marks. A locked date is
    /// returned unchanged and nothing is written.
    async fn toggle(
        &self,
        uid: &str,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(Habit, ToggleOutcome), StoreError>;

    async fn delete(&self, uid: &str, id: &str) -> Result<(), StoreError>;

    /// Live view of one user's habits. The first item is the current list.
    async fn subscribe(&self, uid: &str) -> HabitSubscription;
}

#[derive(Debug, Clone)]
struct Snapshot {
    uid: String,
    habits: Arc<Vec<Habit>>,
}

/// Receives the full habit list each time it changes. Dropping it
/// unsubscribes.
pub struct HabitSubscription {
    uid: String,
    initial: Option<Vec<Habit>>,
    rx: broadcast::Receiver<Snapshot>,
}

impl HabitSubscription {
    /// Next complete list, or `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Vec<Habit>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) if snapshot.uid == self.uid => {
                    return Some(snapshot.habits.as_ref().clone());
                }
                Ok(_) => continue,
                // Every message is a full list, so skipping ahead loses nothing.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(uid = %self.uid, skipped, "habit subscription lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Habit store backed by a single JSON file, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
    events: broadcast::Sender<Snapshot>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf, data: StoreData) -> Self {
        let (events, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        Self {
            path,
            data: Mutex::new(data),
            events,
        }
    }

    pub async fn open(path: PathBuf) -> Self {
        let data = load_data(&path).await;
        Self::new(path, data)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists, then pushes the user's new list to subscribers. The
    /// in-memory change stands even if the write fails.
    async fn commit(&self, data: &StoreData, uid: &str) -> Result<(), StoreError> {
        let written = persist_data(&self.path, data).await;
        if let Err(err) = &written {
            error!(path = %self.path.display(), "failed to persist habits: {err}");
        }
        // No receivers is fine.
        let _ = self.events.send(Snapshot {
            uid: uid.to_string(),
            habits: Arc::new(data.habits_for(uid)),
        });
        written
    }
}

#[async_trait]
impl HabitStore for JsonFileStore {
    async fn list(&self, uid: &str) -> Result<Vec<Habit>, StoreError> {
        Ok(self.data.lock().await.habits_for(uid))
    }

    async fn add(&self, uid: &str, doc: HabitDocument) -> Result<Habit, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut data = self.data.lock().await;
        data.users
            .entry(uid.to_string())
            .or_default()
            .insert(id.clone(), doc.clone());
        self.commit(&data, uid).await?;
        Ok(Habit::new(id, doc))
    }

    async fn update(&self, uid: &str, id: &str, patch: HabitPatch) -> Result<Habit, StoreError> {
        let mut data = self.data.lock().await;
        let doc = data
            .users
            .get_mut(uid)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(doc);
        let updated = Habit::new(id, doc.clone());
        self.commit(&data, uid).await?;
        Ok(updated)
    }

    async fn toggle(
        &self,
        uid: &str,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(Habit, ToggleOutcome), StoreError> {
        let mut data = self.data.lock().await;
        let doc = data
            .users
            .get_mut(uid)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let outcome = toggle_date(&mut doc.completed_dates, date, today);
        let habit = Habit::new(id, doc.clone());
        if outcome != ToggleOutcome::Locked {
            self.commit(&data, uid).await?;
        }
        Ok((habit, outcome))
    }

    async fn delete(&self, uid: &str, id: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let removed = data.users.get_mut(uid).and_then(|docs| docs.remove(id));
        if removed.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.commit(&data, uid).await
    }

    async fn subscribe(&self, uid: &str) -> HabitSubscription {
        // Subscribe under the lock so no change lands between the initial
        // list and the first broadcast.
        let data = self.data.lock().await;
        let rx = self.events.subscribe();
        HabitSubscription {
            uid: uid.to_string(),
            initial: Some(data.habits_for(uid)),
            rx,
        }
    }
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}
