use std::sync::{Arc, Mutex, Weak};

use curve_core::model::{AchievementId, ModuleDefinition, ModuleId, ProgressRecord};
use storage::codec::{decode_progress, encode_progress};
use storage::repository::{KeyValueStore, Keyspace};

use crate::persist::{Durability, load, lock};

/// What changed in a mutation. Only effective changes produce events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    ModuleCompleted(ModuleId),
    ExperienceAdded {
        amount: u64,
        total: u64,
        level_before: u32,
        level_after: u32,
    },
    AchievementUnlocked(AchievementId),
    CurrentModuleChanged(Option<ModuleId>),
}

impl ProgressEvent {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        matches!(
            self,
            ProgressEvent::ExperienceAdded {
                level_before,
                level_after,
                ..
            } if level_after > level_before
        )
    }
}

/// Callback notified after every effective mutation, with the new record.
pub type ProgressListener = Arc<dyn Fn(&ProgressEvent, &ProgressRecord) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, ProgressListener)>,
}

/// Handle returned by [`ProgressStore::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping the subscription removes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {}

    /// Keeps the listener registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.listeners = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Single source of truth for a learner's progress.
///
/// Every effective mutation updates memory, writes the record through to
/// storage and then notifies subscribers before returning. Storage failures
/// are logged and never surface to callers.
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    state: Mutex<ProgressRecord>,
    listeners: Arc<Mutex<Listeners>>,
    write_gate: tokio::sync::Mutex<()>,
    durability: Durability,
}

impl ProgressStore {
    /// Load the persisted record, falling back to an empty one when it is
    /// missing or unreadable. If the read fails or the value comes from a
    /// newer schema, the session stays in memory and never overwrites it.
    pub async fn initialize(kv: Arc<dyn KeyValueStore>, keyspace: &Keyspace) -> Self {
        let key = keyspace.progress();
        let (record, durability) = load(kv.as_ref(), &key, decode_progress).await;

        Self {
            kv,
            key,
            state: Mutex::new(record),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            write_gate: tokio::sync::Mutex::new(()),
            durability,
        }
    }

    /// Current record.
    #[must_use]
    pub fn snapshot(&self) -> ProgressRecord {
        lock(&self.state).clone()
    }

    #[must_use]
    pub fn experience(&self) -> u64 {
        lock(&self.state).experience()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        lock(&self.state).level()
    }

    #[must_use]
    pub fn is_completed(&self, id: &ModuleId) -> bool {
        lock(&self.state).is_completed(id)
    }

    /// Lock check of `module` against the current record.
    #[must_use]
    pub fn is_module_locked(&self, module: &ModuleDefinition) -> bool {
        curve_core::is_module_locked(module, &lock(&self.state))
    }

    /// Whether the last load or write reached durable storage.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.durability.is_durable()
    }

    /// Storage key the record lives under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Marks a module completed. Returns `false` when it already was, in which
    /// case nothing is written or notified.
    pub async fn mark_module_complete(&self, id: &ModuleId) -> bool {
        self.apply(|record| {
            record
                .complete_module(id.clone())
                .then(|| ProgressEvent::ModuleCompleted(id.clone()))
        })
        .await
        .is_some()
    }

    /// Adds experience; the level follows. Zero is a no-op.
    pub async fn add_experience(&self, amount: u64) {
        self.apply(|record| {
            if amount == 0 {
                return None;
            }
            let level_before = record.level();
            let total = record.add_experience(amount);
            Some(ProgressEvent::ExperienceAdded {
                amount,
                total,
                level_before,
                level_after: record.level(),
            })
        })
        .await;
    }

    /// Records an achievement. Grants no experience by itself.
    pub async fn unlock_achievement(&self, id: &AchievementId) -> bool {
        self.apply(|record| {
            record
                .unlock_achievement(id.clone())
                .then(|| ProgressEvent::AchievementUnlocked(id.clone()))
        })
        .await
        .is_some()
    }

    pub async fn set_current_module(&self, id: Option<ModuleId>) {
        self.apply(|record| {
            record
                .set_current_module(id.clone())
                .then(|| ProgressEvent::CurrentModuleChanged(id))
        })
        .await;
    }

    /// Registers `listener` for every subsequent effective mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressEvent, &ProgressRecord) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    async fn apply<F>(&self, change: F) -> Option<ProgressEvent>
    where
        F: FnOnce(&mut ProgressRecord) -> Option<ProgressEvent>,
    {
        let _gate = self.write_gate.lock().await;

        let (event, snapshot) = {
            let mut state = lock(&self.state);
            let event = change(&mut state)?;
            (event, state.clone())
        };

        self.persist(&snapshot).await;
        if event.leveled_up() {
            tracing::info!(level = snapshot.level(), "level up");
        }
        self.notify(&event, &snapshot);
        Some(event)
    }

    fn notify(&self, event: &ProgressEvent, record: &ProgressRecord) {
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<ProgressListener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event, record);
        }
    }

    async fn persist(&self, record: &ProgressRecord) {
        match encode_progress(record) {
            Ok(raw) => self.durability.write(self.kv.as_ref(), &self.key, &raw).await,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "could not encode progress");
                self.durability.mark_degraded();
            }
        }
    }
}
