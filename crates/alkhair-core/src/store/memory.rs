//! In-memory store, used for offline sessions and tests

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{LocalStore, SnapshotPublisher, Snapshots};
use crate::error::LocalStoreError;
use crate::models::Syncable;

/// Process-local store backed by a `HashMap`
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    state: Arc<Mutex<MemoryState<T>>>,
    snapshots: SnapshotPublisher<T>,
}

#[derive(Debug)]
struct MemoryState<T> {
    records: HashMap<String, T>,
    failing_writes: usize,
}

impl<T: Syncable> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Syncable> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Store pre-seeded with `records` (later duplicates win)
    #[must_use]
    pub fn with_records(records: Vec<T>) -> Self {
        let records: HashMap<String, T> = records
            .into_iter()
            .map(|record| (record.id().to_string(), record))
            .collect();
        let snapshots = SnapshotPublisher::new(records.values().cloned().collect());
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                records,
                failing_writes: 0,
            })),
            snapshots,
        }
    }

    /// Make the next `count` mutating calls fail with an IO error
    pub fn fail_next_writes(&self, count: usize) {
        self.lock().failing_writes = count;
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_injected_failure(state: &mut MemoryState<T>) -> Result<(), LocalStoreError> {
        if state.failing_writes == 0 {
            return Ok(());
        }
        state.failing_writes -= 1;
        Err(LocalStoreError::Io(io::Error::other(format!(
            "injected write failure on {}",
            T::COLLECTION
        ))))
    }
}

impl<T: Syncable> LocalStore<T> for MemoryStore<T> {
    fn observe_local(&self) -> Snapshots<T> {
        self.snapshots.subscribe()
    }

    async fn insert_local_batch(&self, items: Vec<T>) -> Result<(), LocalStoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut state = self.lock();
        Self::take_injected_failure(&mut state)?;
        for item in items {
            state.records.insert(item.id().to_string(), item);
        }
        self.snapshots
            .publish(state.records.values().cloned().collect());
        Ok(())
    }

    async fn delete_locally(&self, id: &str) -> Result<(), LocalStoreError> {
        let mut state = self.lock();
        Self::take_injected_failure(&mut state)?;
        if state.records.remove(id).is_some() {
            self.snapshots
                .publish(state.records.values().cloned().collect());
        }
        Ok(())
    }
}
