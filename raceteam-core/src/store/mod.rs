//! Document stores.
//!
//! Team data lives in three independent JSON documents. The remote store
//! is the durable, shared copy; the fallback cache keeps the last snapshot
//! this machine has seen so the app keeps working when the remote is down.

mod cache;
mod dir;
mod memory;

pub use cache::{FileCache, MemoryCache};
pub use dir::DirStore;
pub use memory::MemoryStore;

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A whole document as stored remotely.
pub type Document = serde_json::Value;

/// Callback invoked with the new document whenever it changes remotely.
pub type OnChange = Box<dyn Fn(Document) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKey {
    Roster,
    Rsvp,
    Practice,
}

impl DocKey {
    pub const ALL: [DocKey; 3] = [DocKey::Roster, DocKey::Rsvp, DocKey::Practice];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocKey::Roster => "roster",
            DocKey::Rsvp => "rsvp",
            DocKey::Practice => "practice",
        }
    }

    pub(crate) fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle returned by [`RemoteStore::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    key: DocKey,
}

impl Subscription {
    pub fn key(&self) -> DocKey {
        self.key
    }
}

/// The shared, durable document store.
///
/// There is no partial update: `set` always replaces the whole document.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch a document. `Ok(None)` means it has never been written.
    fn get(&self, key: DocKey) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    fn set(&self, key: DocKey, doc: Document) -> impl Future<Output = StoreResult<()>> + Send;

    /// Register for change notifications on one document.
    fn subscribe(&self, key: DocKey, on_change: OnChange) -> Subscription;

    fn unsubscribe(&self, subscription: &Subscription);
}

/// Last-known-good snapshot of each document on this machine.
///
/// Best effort: failures are logged, never returned.
pub trait FallbackCache: Send + Sync + 'static {
    fn get(&self, key: DocKey) -> Option<Document>;

    fn set(&self, key: DocKey, doc: &Document);
}

type Listener = Arc<dyn Fn(Document) + Send + Sync>;

/// In-process subscriber registry shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(Subscription, Listener)>>,
}

impl Subscribers {
    pub(crate) fn add(&self, key: DocKey, on_change: OnChange) -> Subscription {
        let subscription = Subscription {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            key,
        };
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((subscription.clone(), Arc::from(on_change)));
        }
        subscription
    }

    pub(crate) fn remove(&self, subscription: &Subscription) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(s, _)| s.id != subscription.id);
        }
    }

    /// Call every listener for `key`. Listeners run outside the lock so
    /// they may subscribe or unsubscribe themselves.
    pub(crate) fn notify(&self, key: DocKey, doc: &Document) {
        let matching: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .filter(|(s, _)| s.key == key)
                .map(|(_, l)| Arc::clone(l))
                .collect(),
            Err(_) => return,
        };
        for listener in matching {
            listener(doc.clone());
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// A stored `null` is treated the same as a missing document.
pub(crate) fn non_null(doc: Document) -> Option<Document> {
    if doc.is_null() { None } else { Some(doc) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_doc_key_names() {
        let names: Vec<_> = DocKey::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["roster", "rsvp", "practice"]);
        assert_eq!(DocKey::Rsvp.file_name(), "rsvp.json");
    }

    #[test]
    fn test_subscribers_notify_only_matching_key() {
        let subscribers = Subscribers::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = subscribers.add(
            DocKey::Rsvp,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        subscribers.notify(DocKey::Rsvp, &serde_json::json!({}));
        subscribers.notify(DocKey::Roster, &serde_json::json!([]));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        subscribers.remove(&sub);
        subscribers.notify(DocKey::Rsvp, &serde_json::json!({}));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(subscribers.count(), 0);
    }
}
