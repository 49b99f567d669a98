//! Reading Store
//!
//! Sole owner of the reading collection:
//! - Hydrates from a [`KeyValueStore`] on open (falling back to empty)
//! - Keeps readings newest-first by prepending on add
//! - Writes the full snapshot back under one key after every mutation
//! - Notifies subscribed listeners after every effective mutation
//!
//! A failed write never rolls back the in-memory change. The store records
//! the failure in [`PersistStatus`] and tells listeners the change is not
//! durable.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::kv::KeyValueStore;
use crate::storage::seed::seed_readings;
use crate::storage::types::{MealContext, Reading, ReadingId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Default storage key for the reading collection
pub const DEFAULT_STORAGE_KEY: &str = "glucose-readings";

/// Identifier returned by [`ReadingStore::subscribe`]
pub type SubscriptionId = String;

/// What changed in the store
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// A reading was prepended
    Added(ReadingId),
    /// A reading was removed
    Deleted(ReadingId),
    /// The empty store was filled with this many example readings
    Seeded(usize),
}

/// Notification delivered to listeners after a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub kind: ChangeKind,
    /// Whether the snapshot write succeeded
    pub durable: bool,
}

/// Receives store change notifications (the UI is one such listener)
pub trait StoreListener {
    fn on_change(&self, event: &StoreEvent, readings: &[Reading]);
}

impl<F> StoreListener for F
where
    F: Fn(&StoreEvent, &[Reading]),
{
    fn on_change(&self, event: &StoreEvent, readings: &[Reading]) {
        self(event, readings)
    }
}

/// Outcome of the most recent snapshot write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PersistStatus {
    /// Nothing has been written during this session
    #[default]
    Clean,
    /// Last write succeeded
    Saved,
    /// Last write failed; in-memory changes may be lost on exit
    Unsaved(String),
}

impl PersistStatus {
    pub fn is_durable(&self) -> bool {
        !matches!(self, PersistStatus::Unsaved(_))
    }
}

/// The glucose reading store
pub struct ReadingStore<S: KeyValueStore> {
    /// Key-value backend
    backend: S,
    /// Key holding the serialized collection
    key: String,
    /// Readings, newest first
    readings: Vec<Reading>,
    /// Change listeners
    listeners: Vec<(SubscriptionId, Box<dyn StoreListener>)>,
    /// Source of "now" for new readings and seed data
    clock: Box<dyn Fn() -> DateTime<Utc>>,
    /// Result of the last write
    persist_status: PersistStatus,
    /// Why the stored snapshot could not be used on open, until overwritten
    load_error: Option<String>,
}

impl<S: KeyValueStore> ReadingStore<S> {
    /// Open a store and hydrate it from `backend` under [`DEFAULT_STORAGE_KEY`]
    pub fn open(backend: S) -> Self {
        Self::open_with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Open a store and hydrate it from `backend` under `key`
    pub fn open_with_key(backend: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            readings: Vec::new(),
            listeners: Vec::new(),
            clock: Box::new(Utc::now),
            persist_status: PersistStatus::default(),
            load_error: None,
        };
        match store.read_snapshot() {
            Ok(readings) => store.readings = readings,
            Err(e) => {
                tracing::warn!(key = %store.key, error = %e, "Stored readings unusable, starting empty");
                store.load_error = Some(e);
            }
        }

        tracing::info!(
            key = %store.key,
            readings = store.readings.len(),
            "Reading store opened"
        );
        store
    }

    /// Builder: replace the clock used to timestamp new readings
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Read the persisted collection.
    ///
    /// Absent, empty, unreadable or unparsable data all yield an empty
    /// collection. This does not change the in-memory state.
    pub fn load(&self) -> Vec<Reading> {
        self.read_snapshot().unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "Stored readings unusable, starting empty");
            Vec::new()
        })
    }

    /// Parse the stored snapshot, telling absent data apart from bad data
    fn read_snapshot(&self) -> Result<Vec<Reading>, String> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => return Err(format!("read failed: {}", e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut readings = serde_json::from_str::<Vec<Reading>>(&raw)
            .map_err(|e| format!("corrupt snapshot: {}", e))?;

        // First occurrence of an id wins
        let mut seen = HashSet::new();
        let before = readings.len();
        readings.retain(|r| seen.insert(r.id().clone()));
        if readings.len() < before {
            tracing::warn!(
                key = %self.key,
                dropped = before - readings.len(),
                "Dropped readings with duplicate ids"
            );
        }
        Ok(readings)
    }

    /// Fill an empty store with example readings, once.
    ///
    /// A non-empty store is returned unchanged, and so is a store whose
    /// stored data could not be read: seeding would overwrite it.
    pub fn seed_if_empty(&mut self) -> &[Reading] {
        if !self.readings.is_empty() {
            return &self.readings;
        }

        if let Some(error) = &self.load_error {
            tracing::warn!(key = %self.key, error = %error, "Not seeding over unreadable stored readings");
            return &self.readings;
        }

        self.readings = seed_readings((self.clock)());
        let durable = self.persist();
        tracing::info!(readings = self.readings.len(), durable, "Seeded example readings");

        self.notify(StoreEvent {
            kind: ChangeKind::Seeded(self.readings.len()),
            durable,
        });
        &self.readings
    }

    /// Record a new reading taken now.
    ///
    /// The value is not range-checked; it only has to be finite so the
    /// snapshot stays valid JSON.
    pub fn add(
        &mut self,
        value: f64,
        meal_context: MealContext,
        note: Option<String>,
    ) -> StorageResult<&[Reading]> {
        if !value.is_finite() {
            return Err(StorageError::NonFiniteValue(value));
        }

        let reading = Reading::new(
            ReadingId::generate(),
            value,
            (self.clock)(),
            meal_context,
            note,
        );
        let id = reading.id().clone();
        self.readings.insert(0, reading);

        let durable = self.persist();
        tracing::info!(id = %id, value, meal = %meal_context, durable, "Reading added");

        self.notify(StoreEvent {
            kind: ChangeKind::Added(id),
            durable,
        });
        Ok(&self.readings)
    }

    /// Remove the reading with `id`. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &ReadingId) -> &[Reading] {
        let Some(pos) = self.readings.iter().position(|r| r.id() == id) else {
            tracing::debug!(id = %id, "Delete ignored, no such reading");
            return &self.readings;
        };

        self.readings.remove(pos);

        let durable = self.persist();
        tracing::info!(id = %id, durable, "Reading deleted");

        self.notify(StoreEvent {
            kind: ChangeKind::Deleted(id.clone()),
            durable,
        });
        &self.readings
    }

    /// All readings, newest first
    pub fn list(&self) -> &[Reading] {
        &self.readings
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn get(&self, id: &ReadingId) -> Option<&Reading> {
        self.readings.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn persist_status(&self) -> &PersistStatus {
        &self.persist_status
    }

    /// Why the stored data was ignored on open, if it was.
    ///
    /// Cleared once a snapshot is written over it.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Register a listener, called after every effective mutation
    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> SubscriptionId {
        let id = Uuid::new_v4().to_string();
        self.listeners.push((id.clone(), Box::new(listener)));
        tracing::debug!(subscription = %id, "Listener subscribed");
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub_id, _)| sub_id != id);
        before != self.listeners.len()
    }

    /// Write the whole collection under the store key
    fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.readings)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(&self.key, &json));

        match result {
            Ok(()) => {
                self.persist_status = PersistStatus::Saved;
                self.load_error = None;
                true
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to persist readings; changes may not be saved");
                self.persist_status = PersistStatus::Unsaved(e.to_string());
                false
            }
        }
    }

    fn notify(&self, event: StoreEvent) {
        for (_, listener) in &self.listeners {
            listener.on_change(&event, &self.readings);
        }
    }
}
