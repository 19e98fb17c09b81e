use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::document::{NewDocument, Snapshot};
use crate::error::StoreError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback fired with every snapshot of a subscribed collection.
///
/// Called from store tasks; must not block.
pub type SnapshotListener = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// The document database as the site sees it.
///
/// Methods return boxed futures for dyn compatibility.
pub trait DocumentStore: Send + Sync {
    /// Open a standing subscription. The listener receives a snapshot of the
    /// current contents and then one snapshot per change, until the returned
    /// handle is released or dropped.
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError>;

    /// Append one document. Resolves to the store-assigned id.
    fn write<'a>(
        &'a self,
        collection: &'a str,
        document: NewDocument,
    ) -> BoxFuture<'a, Result<String, StoreError>>;
}

/// Live handle on a subscription. Releasing it, explicitly or by drop, stops
/// further listener calls from the store side.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
