//! Remote store backed by a shared directory.
//!
//! Each document is `<dir>/<key>.json`. Point several machines at a synced
//! folder and they share one team. Change notifications only reach
//! subscribers in this process.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{
    DocKey, Document, OnChange, RemoteStore, StoreResult, Subscribers, Subscription, non_null,
};

pub struct DirStore {
    dir: PathBuf,
    subscribers: Subscribers,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStore {
            dir: dir.into(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: DocKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl RemoteStore for DirStore {
    async fn get(&self, key: DocKey) -> StoreResult<Option<Document>> {
        let path = self.path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        let doc: Document = serde_json::from_str(&content)?;
        Ok(non_null(doc))
    }

    async fn set(&self, key: DocKey, doc: Document) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path(key);
        let temp = self.dir.join(key.file_name() + ".tmp");

        let content = serde_json::to_string_pretty(&doc)?;
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &path).await?;
        debug!("Wrote {key} to {}", path.display());

        self.subscribers.notify(key, &doc);
        Ok(())
    }

    fn subscribe(&self, key: DocKey, on_change: OnChange) -> Subscription {
        self.subscribers.add(key, on_change)
    }

    fn unsubscribe(&self, subscription: &Subscription) {
        self.subscribers.remove(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_and_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());

        assert_eq!(store.get(DocKey::Roster).await.unwrap(), None);

        std::fs::write(dir.path().join("roster.json"), "  \n").unwrap();
        assert_eq!(store.get(DocKey::Roster).await.unwrap(), None);

        std::fs::write(dir.path().join("roster.json"), "null").unwrap();
        assert_eq!(store.get(DocKey::Roster).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_writes_file_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path().join("team"));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        store.subscribe(
            DocKey::Rsvp,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let doc = json!({"e1": {"Alex": "maybe"}});
        store.set(DocKey::Rsvp, doc.clone()).await.unwrap();

        assert_eq!(store.get(DocKey::Rsvp).await.unwrap(), Some(doc));
        assert!(dir.path().join("team/rsvp.json").exists());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("practice.json"), "{oops").unwrap();

        let store = DirStore::new(dir.path());
        assert!(matches!(
            store.get(DocKey::Practice).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
