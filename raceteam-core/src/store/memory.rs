//! In-process remote store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    DocKey, Document, OnChange, RemoteStore, StoreError, StoreResult, Subscribers, Subscription,
    non_null,
};

/// Remote store held entirely in memory.
///
/// Every successful `set` notifies subscribers, including the writer
/// itself, just like a hosted realtime database echoes local writes.
/// Reads and writes can be switched to fail to exercise degraded paths.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<DocKey, Document>>,
    subscribers: Subscribers,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_documents(docs: impl IntoIterator<Item = (DocKey, Document)>) -> Self {
        let store = MemoryStore::new();
        if let Ok(mut stored) = store.docs.lock() {
            stored.extend(docs);
        }
        store
    }

    /// Current stored copy of a document.
    pub fn document(&self, key: DocKey) -> Option<Document> {
        self.docs.lock().ok().and_then(|d| d.get(&key).cloned())
    }

    /// Write as another client would: store and notify, ignoring any
    /// injected write failure.
    pub fn publish(&self, key: DocKey, doc: Document) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(key, doc.clone());
        }
        self.subscribers.notify(key, &doc);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.count()
    }
}

impl RemoteStore for MemoryStore {
    async fn get(&self, key: DocKey) -> StoreResult<Option<Document>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of '{key}' refused")));
        }
        Ok(self.document(key).and_then(non_null))
    }

    async fn set(&self, key: DocKey, doc: Document) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of '{key}' refused")));
        }
        self.publish(key, doc);
        Ok(())
    }

    fn subscribe(&self, key: DocKey, on_change: OnChange) -> Subscription {
        self.subscribers.add(key, on_change)
    }

    fn unsubscribe(&self, subscription: &Subscription) {
        self.subscribers.remove(subscription);
    }
}
