//! In-process document store.
//!
//! Holds collections in memory and fans snapshots out to subscribers
//! synchronously: an initial snapshot on subscribe, then a fresh snapshot
//! after every write. Used when no hosted database is configured, and by
//! tests.
//!
//! Mutations and their fan-out are serialized by a delivery lock held from
//! snapshot capture until every listener has returned, so listeners see
//! snapshots in commit order. A listener must not write to the store it is
//! subscribed to.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use adiwiyata_core::clock::{Clock, SystemClock};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::document::{Document, NewDocument, Snapshot};
use crate::error::StoreError;
use crate::store::{BoxFuture, DocumentStore, SnapshotListener, Subscription};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    listeners: HashMap<u64, (String, SnapshotListener)>,
    next_listener: u64,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> Snapshot {
        Snapshot {
            collection: collection.to_string(),
            documents: self.collections.get(collection).cloned().unwrap_or_default(),
        }
    }

    fn listeners_for(&self, collection: &str) -> Vec<SnapshotListener> {
        self.listeners
            .values()
            .filter(|(c, _)| c == collection)
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }
}

pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    delivery: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Server timestamps are taken from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            delivery: Mutex::new(()),
            clock,
        }
    }

    /// Current contents of a collection.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        lock(&self.inner).snapshot(collection).documents
    }

    /// Number of live subscriptions across all collections.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    /// Remove a document and notify subscribers. Returns whether it existed.
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let _delivery = self.deliver_lock();
        let (removed, snapshot, listeners) = {
            let mut inner = lock(&self.inner);
            let removed = inner
                .collections
                .get_mut(collection)
                .map(|docs| {
                    let before = docs.len();
                    docs.retain(|d| d.id != id);
                    docs.len() != before
                })
                .unwrap_or(false);
            (removed, inner.snapshot(collection), inner.listeners_for(collection))
        };

        if removed {
            for listener in listeners {
                listener(snapshot.clone());
            }
        }
        removed
    }
}

impl MemoryStore {
    fn deliver_lock(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `document` and fan the new snapshot out.
    fn commit(&self, collection: &str, document: Document) {
        let _delivery = self.deliver_lock();
        let (snapshot, listeners) = {
            let mut inner = lock(&self.inner);
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(document);
            (inner.snapshot(collection), inner.listeners_for(collection))
        };

        for listener in listeners {
            listener(snapshot.clone());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        let _delivery = self.deliver_lock();
        let (id, snapshot) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner
                .listeners
                .insert(id, (collection.to_string(), Arc::clone(&listener)));
            (id, inner.snapshot(collection))
        };

        debug!(collection, listener = id, "subscribed");
        listener(snapshot);

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner).listeners.remove(&id);
                debug!(listener = id, "subscription released");
            }
        }))
    }

    fn write<'a>(
        &'a self,
        collection: &'a str,
        document: NewDocument,
    ) -> BoxFuture<'a, Result<String, StoreError>> {
        Box::pin(async move {
            let id = Uuid::new_v4().simple().to_string();
            let now = self.clock.now().to_string();

            let mut fields = document.fields;
            for name in document.server_timestamps {
                fields.insert(name, Value::String(now.clone()));
            }

            self.commit(collection, Document {
                id: id.clone(),
                fields,
            });
            Ok(id)
        })
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
