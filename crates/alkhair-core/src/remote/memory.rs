//! In-process remote backend, used for offline demos and tests

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{dedupe_by_id, RemoteBackend, RemoteSource};
use crate::error::RemoteError;
use crate::models::Syncable;

/// Shared table storage keyed by collection name.
///
/// Rows are kept in their serialized (remote) form so the local control
/// fields never leak through, just like a real backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

#[derive(Debug, Default)]
struct BackendState {
    tables: HashMap<&'static str, Vec<Value>>,
    failures: HashMap<&'static str, usize>,
    fetches: HashMap<&'static str, usize>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a record by id
    pub fn put<T: Syncable>(&self, record: &T) -> Result<(), RemoteError> {
        let value = serde_json::to_value(record)?;
        let mut state = self.lock();
        let table = state.tables.entry(T::COLLECTION).or_default();
        match table
            .iter()
            .position(|row| row.get("id").and_then(Value::as_str) == Some(record.id()))
        {
            Some(index) => table[index] = value,
            None => table.push(value),
        }
        Ok(())
    }

    /// Fail the next `count` fetches of `T`'s collection
    pub fn fail_next<T: Syncable>(&self, count: usize) {
        self.lock().failures.insert(T::COLLECTION, count);
    }

    /// Number of fetches served (or failed) for `T`'s collection
    pub fn fetch_count<T: Syncable>(&self) -> usize {
        self.lock()
            .fetches
            .get(T::COLLECTION)
            .copied()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteBackend for MemoryBackend {
    type Source<T: Syncable> = MemoryRemote<T>;

    fn source<T: Syncable>(&self) -> MemoryRemote<T> {
        MemoryRemote {
            backend: self.clone(),
            _record: PhantomData,
        }
    }
}

/// [`RemoteSource`] backed by a [`MemoryBackend`]
#[derive(Debug)]
pub struct MemoryRemote<T> {
    backend: MemoryBackend,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for MemoryRemote<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Syncable> RemoteSource<T> for MemoryRemote<T> {
    async fn fetch_remote_updated(&self, after: i64) -> Result<Vec<T>, RemoteError> {
        let rows = {
            let mut state = self.backend.lock();
            *state.fetches.entry(T::COLLECTION).or_default() += 1;

            if let Some(remaining) = state.failures.get_mut(T::COLLECTION) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RemoteError::Injected(format!(
                        "{} backend unavailable",
                        T::COLLECTION
                    )));
                }
            }
            state
                .tables
                .get(T::COLLECTION)
                .cloned()
                .unwrap_or_default()
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record: T = serde_json::from_value(row)?;
            if record.updated_at() > after {
                records.push(record);
            }
        }
        records.sort_by_key(|record| record.updated_at());
        Ok(dedupe_by_id(records))
    }
}
