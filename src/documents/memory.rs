//! In-memory document store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{Document, DocumentMeta, DocumentStore, StoreError};

/// Map-backed store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn save(&self, document: Document) -> Result<Document, StoreError> {
        self.documents
            .write()
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<DocumentMeta>, StoreError> {
        let documents = self.documents.read();
        let mut metas: Vec<DocumentMeta> = documents
            .values()
            .filter(|doc| owner_id.is_none() || doc.owner_id.as_deref() == owner_id)
            .map(Document::meta)
            .collect();
        // Map order is arbitrary; present newest first.
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.documents.write().remove(id).is_some())
    }
}
