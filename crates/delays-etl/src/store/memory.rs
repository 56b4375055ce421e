//! In-memory stores for tests and local dry runs

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DelayStore, LoadOutcome, StatusStore};
use crate::error::{LoadError, StatusError};
use crate::models::{DelayRecord, StatusEntry};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Failures {
    all: Option<String>,
    records: HashSet<String>,
}

impl Failures {
    fn check(&self, record_id: &str) -> Option<String> {
        if let Some(message) = &self.all {
            return Some(message.clone());
        }
        self.records
            .contains(record_id)
            .then(|| format!("injected failure for record '{}'", record_id))
    }
}

/// Delay store keeping rows in a map; clones share state
#[derive(Clone, Default)]
pub struct MemoryDelayStore {
    rows: Arc<Mutex<BTreeMap<String, DelayRecord>>>,
    failures: Arc<Mutex<Failures>>,
}

impl MemoryDelayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert fail until [`Self::recover`] is called
    pub fn fail_all(&self, message: impl Into<String>) {
        lock(&self.failures).all = Some(message.into());
    }

    /// Make inserts of one specific record fail
    pub fn fail_record(&self, record_id: impl Into<String>) {
        lock(&self.failures).records.insert(record_id.into());
    }

    pub fn recover(&self) {
        *lock(&self.failures) = Failures::default();
    }

    pub fn get(&self, record_id: &str) -> Option<DelayRecord> {
        lock(&self.rows).get(record_id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DelayStore for MemoryDelayStore {
    async fn insert_if_absent(&self, record: &DelayRecord) -> Result<LoadOutcome, LoadError> {
        if let Some(message) = lock(&self.failures).check(&record.record_id) {
            return Err(LoadError::Unavailable(message));
        }

        let mut rows = lock(&self.rows);
        if rows.contains_key(&record.record_id) {
            return Ok(LoadOutcome::AlreadyPresent);
        }
        rows.insert(record.record_id.clone(), record.clone());
        Ok(LoadOutcome::Inserted)
    }
}

/// Status store keeping the latest entry per record plus a write log
#[derive(Clone, Default)]
pub struct MemoryStatusStore {
    entries: Arc<Mutex<BTreeMap<String, StatusEntry>>>,
    writes: Arc<Mutex<Vec<StatusEntry>>>,
    failures: Arc<Mutex<Failures>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self, message: impl Into<String>) {
        lock(&self.failures).all = Some(message.into());
    }

    pub fn fail_record(&self, record_id: impl Into<String>) {
        lock(&self.failures).records.insert(record_id.into());
    }

    pub fn recover(&self) {
        *lock(&self.failures) = Failures::default();
    }

    pub fn get(&self, record_id: &str) -> Option<StatusEntry> {
        lock(&self.entries).get(record_id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every successful put, in order
    pub fn writes(&self) -> Vec<StatusEntry> {
        lock(&self.writes).clone()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn put_status(&self, entry: &StatusEntry) -> Result<(), StatusError> {
        if let Some(message) = lock(&self.failures).check(&entry.record_id) {
            return Err(StatusError::Unavailable(message));
        }

        lock(&self.entries).insert(entry.record_id.clone(), entry.clone());
        lock(&self.writes).push(entry.clone());
        Ok(())
    }
}
