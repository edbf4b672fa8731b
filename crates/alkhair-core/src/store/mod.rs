//! Local record stores
//!
//! A store holds one collection of [`Syncable`] records keyed by id and
//! publishes a full snapshot of that collection after every change.

mod libsql_store;
mod memory;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::LocalStoreError;
use crate::models::Syncable;

pub use libsql_store::LibSqlStore;
pub use memory::MemoryStore;

/// Complete, point-in-time view of a collection
pub type Snapshot<T> = Arc<Vec<T>>;

/// Local persistence contract for one entity collection.
///
/// Every mutating call publishes a fresh snapshot before it resolves, so a
/// caller that awaited a write and then reads [`LocalStore::observe_local`]
/// sees its own write. Implementations serialize their own writes.
pub trait LocalStore<T: Syncable>: Clone + Send + Sync + 'static {
    /// Subscribe to the collection. Each call returns an independent
    /// subscriber starting at the current snapshot.
    fn observe_local(&self) -> Snapshots<T>;

    /// Upsert a batch by id, replacing whole records.
    fn insert_local_batch(
        &self,
        items: Vec<T>,
    ) -> impl Future<Output = Result<(), LocalStoreError>> + Send;

    /// Upsert a single record by id.
    fn insert_local(&self, item: T) -> impl Future<Output = Result<(), LocalStoreError>> + Send {
        self.insert_local_batch(vec![item])
    }

    /// Remove a record. Absent ids are not an error and publish nothing.
    fn delete_locally(&self, id: &str)
        -> impl Future<Output = Result<(), LocalStoreError>> + Send;
}

/// Subscriber handle returned by [`LocalStore::observe_local`]
#[derive(Debug, Clone)]
pub struct Snapshots<T> {
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> Snapshots<T> {
    /// Latest snapshot, read synchronously
    pub fn current(&self) -> Snapshot<T> {
        Arc::clone(&self.rx.borrow())
    }

    /// Whether a snapshot newer than the last one seen is waiting
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next change and return the snapshot it produced.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// Stream yielding the current snapshot followed by every later one
    pub fn into_stream(self) -> WatchStream<Snapshot<T>> {
        WatchStream::new(self.rx)
    }
}

/// Sending half shared by all clones of a store
#[derive(Debug)]
pub(crate) struct SnapshotPublisher<T> {
    tx: Arc<watch::Sender<Snapshot<T>>>,
}

impl<T> Clone for SnapshotPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Syncable> SnapshotPublisher<T> {
    pub(crate) fn new(mut initial: Vec<T>) -> Self {
        order_snapshot(&mut initial);
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn subscribe(&self) -> Snapshots<T> {
        Snapshots {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn publish(&self, mut records: Vec<T>) {
        order_snapshot(&mut records);
        self.tx.send_replace(Arc::new(records));
    }
}

/// Newest first, ties broken by id so snapshots compare deterministically
pub(crate) fn order_snapshot<T: Syncable>(records: &mut [T]) {
    records.sort_by(|a, b| {
        b.updated_at()
            .cmp(&a.updated_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}
