//! Local fallback caches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::{DocKey, Document, FallbackCache, non_null};

/// Fallback cache that only lives as long as the process.
#[derive(Default)]
pub struct MemoryCache {
    docs: Mutex<HashMap<DocKey, Document>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    pub fn with_documents(docs: impl IntoIterator<Item = (DocKey, Document)>) -> Self {
        let cache = MemoryCache::new();
        if let Ok(mut stored) = cache.docs.lock() {
            stored.extend(docs);
        }
        cache
    }
}

impl FallbackCache for MemoryCache {
    fn get(&self, key: DocKey) -> Option<Document> {
        self.docs
            .lock()
            .ok()
            .and_then(|d| d.get(&key).cloned())
            .and_then(non_null)
    }

    fn set(&self, key: DocKey, doc: &Document) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(key, doc.clone());
        }
    }
}

/// Fallback cache persisted as one JSON file per document.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: DocKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn write(&self, key: DocKey, doc: &Document) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let temp = self.dir.join(key.file_name() + ".tmp");

        let content = serde_json::to_string_pretty(doc)?;
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

impl FallbackCache for FileCache {
    fn get(&self, key: DocKey) -> Option<Document> {
        let path = self.path(key);
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read cached {key} from {}: {e}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(doc) => non_null(doc),
            Err(e) => {
                warn!("Ignoring corrupt cached {key} at {}: {e}", path.display());
                None
            }
        }
    }

    fn set(&self, key: DocKey, doc: &Document) {
        if let Err(e) = self.write(key, doc) {
            warn!("Could not cache {key} in {}: {e}", self.dir.display());
        }
    }
}
