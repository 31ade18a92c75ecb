//! Disk-backed document store: one pretty-printed JSON file per
//! document, named `<id>.json`, mirrored in memory for reads.
//!
//! Existing files are loaded once when the store opens; unreadable or
//! malformed files are skipped with a warning so a single corrupt
//! document cannot block startup.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use super::{Document, DocumentMeta, DocumentStore, StoreError};

pub struct JsonDocumentStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Document>>,
}

impl JsonDocumentStore {
    /// Open (and create, if needed) a store rooted at `dir`, loading any
    /// documents already persisted there.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut cache = HashMap::new();
        let mut read_dir = tokio::fs::read_dir(&dir).await?;
        while let Some(dent) = read_dir.next_entry().await? {
            let path = dent.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable document file");
                    continue;
                }
            };
            match serde_json::from_str::<Document>(&raw) {
                Ok(doc) => {
                    cache.insert(doc.id.clone(), doc);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping malformed document file");
                }
            }
        }

        info!(count = cache.len(), dir = %dir.display(), "loaded persisted documents");
        Ok(Self {
            dir,
            cache: RwLock::new(cache),
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.cache.read().get(id).cloned())
    }

    async fn save(&self, document: Document) -> Result<Document, StoreError> {
        let payload = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(self.path_for(&document.id), payload).await?;
        self.cache
            .write()
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<DocumentMeta>, StoreError> {
        let cache = self.cache.read();
        let mut metas: Vec<DocumentMeta> = cache
            .values()
            .filter(|doc| owner_id.is_none() || doc.owner_id.as_deref() == owner_id)
            .map(Document::meta)
            .collect();
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.cache.write().remove(id).is_some();
        if removed {
            match tokio::fs::remove_file(self.path_for(id)).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Subject};

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let doc = Document::new(
            "bio.txt",
            "Cells divide by mitosis.",
            Subject::Biology,
            Level::Beginner,
            None,
        );
        let id = doc.id.clone();

        {
            let store = JsonDocumentStore::open(dir.path()).await.unwrap();
            store.save(doc).await.unwrap();
        }

        let reopened = JsonDocumentStore::open(dir.path()).await.unwrap();
        let loaded = reopened.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.content, "Cells divide by mitosis.");

        assert!(reopened.delete(&id).await.unwrap());
        assert!(!dir.path().join(format!("{id}.json")).exists());
    }

    #[tokio::test]
    async fn malformed_files_are_skipped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("junk.json"), "not a document")
            .await
            .unwrap();

        let store = JsonDocumentStore::open(dir.path()).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }
}
