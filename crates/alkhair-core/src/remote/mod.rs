//! Remote data sources
//!
//! A remote source answers one question per collection: which records changed
//! after a given cursor.

mod memory;
mod postgrest;

use std::collections::HashMap;
use std::future::Future;

use crate::error::RemoteError;
use crate::models::Syncable;

pub use memory::{MemoryBackend, MemoryRemote};
pub use postgrest::{PostgrestBackend, PostgrestSource};

/// Network source for one entity collection
pub trait RemoteSource<T: Syncable>: Send + Sync + 'static {
    /// Records whose `updated_at` is strictly greater than `after`.
    ///
    /// A single call never yields the same id twice. On failure nothing is
    /// returned; there are no partial results.
    fn fetch_remote_updated(
        &self,
        after: i64,
    ) -> impl Future<Output = Result<Vec<T>, RemoteError>> + Send;
}

/// Factory for the per-collection sources of one backend
pub trait RemoteBackend: Clone + Send + Sync + 'static {
    type Source<T: Syncable>: RemoteSource<T>;

    fn source<T: Syncable>(&self) -> Self::Source<T>;

    /// Whether fetches can reach a server at all
    fn is_configured(&self) -> bool {
        true
    }
}

/// Collapse repeated ids, keeping the last occurrence in its original slot
pub(crate) fn dedupe_by_id<T: Syncable>(records: Vec<T>) -> Vec<T> {
    let mut last_index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        last_index.insert(record.id().to_string(), index);
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(index, record)| last_index.get(record.id()) == Some(index))
        .map(|(_, record)| record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Salary;

    fn salary(id: &str, updated_at: i64) -> Salary {
        let mut salary = Salary::new("t1", "2024-06", 1);
        salary.id = id.to_string();
        salary.updated_at = updated_at;
        salary
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let records = vec![salary("a", 1), salary("b", 2), salary("a", 3)];
        let deduped = dedupe_by_id(records);

        let pairs: Vec<(String, i64)> = deduped
            .into_iter()
            .map(|record| (record.id, record.updated_at))
            .collect();
        assert_eq!(pairs, vec![("b".to_string(), 2), ("a".to_string(), 3)]);
    }
}
