//! Shared shape of every record that takes part in incremental sync

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// A record that can be pulled from the remote backend and cached locally.
///
/// `updated_at` doubles as the incremental pull cursor. `is_synced` is a local
/// control flag and is never serialized towards the remote or into the stored
/// payload; stores keep it in a dedicated column instead.
pub trait Syncable: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Remote table / local collection name
    const COLLECTION: &'static str;

    /// Primary key, unique within the collection
    fn id(&self) -> &str;

    /// Last write timestamp (Unix ms)
    fn updated_at(&self) -> i64;

    /// Whether the record is confirmed on the remote side
    fn is_synced(&self) -> bool;

    fn set_synced(&mut self, synced: bool);

    /// Stamp a local write
    fn touch(&mut self, updated_at: i64);
}

/// Generate a fresh, time-sortable record id for locally created records.
#[must_use]
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Implements [`Syncable`] for a struct with `id`, `updated_at` and
/// `is_synced` fields.
macro_rules! impl_syncable {
    ($ty:ty, $collection:literal) => {
        impl $crate::models::Syncable for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn updated_at(&self) -> i64 {
                self.updated_at
            }

            fn is_synced(&self) -> bool {
                self.is_synced
            }

            fn set_synced(&mut self, synced: bool) {
                self.is_synced = synced;
            }

            fn touch(&mut self, updated_at: i64) {
                self.updated_at = updated_at;
            }
        }
    };
}

pub(crate) use impl_syncable;
