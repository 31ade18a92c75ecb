//! Uploaded documents: the record type, the store seam, and the upload
//! pipeline.
//!
//! The core only ever *reads* a document's content/subject/level to
//! derive passages on demand; creation and deletion happen at the edges
//! through a [`DocumentStore`]. Two implementations ship:
//!
//! * [`MemoryDocumentStore`] - lock-protected map, for tests and
//!   ephemeral deployments.
//! * [`JsonDocumentStore`] - one JSON file per document under a
//!   directory, loaded at startup.

mod disk;
mod memory;

pub use disk::JsonDocumentStore;
pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::extraction::{self, ExtractionError};
use crate::models::{Level, Subject};

// ── Document ───────────────────────────────────────────────────────────

/// A user-supplied text source from which passages may be derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub content: String,
    pub subject: Subject,
    pub level: Level,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Document {
    /// Create a document with a fresh v4 id and the current timestamp.
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        subject: Subject,
        level: Level,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            content: content.into(),
            subject,
            level,
            created_at: Utc::now(),
            owner_id,
        }
    }

    /// Metadata view of this document, without the content payload.
    #[must_use]
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            filename: self.filename.clone(),
            subject: self.subject,
            level: self.level,
            created_at: self.created_at,
            owner_id: self.owner_id.clone(),
        }
    }
}

/// Document metadata as returned by listings. Listings never carry the
/// content field; callers fetch a single document when they need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub filename: String,
    pub subject: Subject,
    pub level: Level,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors raised by document stores and the upload pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persisting or reading a document failed at the IO layer.
    #[error("document storage IO failure: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document could not be (de)serialized.
    #[error("document serialization failure: {0}")]
    Serde(#[from] serde_json::Error),

    /// The uploaded bytes produced no usable text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

// ── Store seam ─────────────────────────────────────────────────────────

/// Storage collaborator for uploaded documents.
///
/// Absence is represented as `Ok(None)`, never as an error: callers
/// treat an unresolvable document id as non-fatal and fall back to
/// static knowledge.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by id.
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Persist a document.
    async fn save(&self, document: Document) -> Result<Document, StoreError>;

    /// List metadata for stored documents, optionally filtered by owner.
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<DocumentMeta>, StoreError>;

    /// Delete by id; returns whether a document was actually removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

// ── Upload pipeline ────────────────────────────────────────────────────

/// Extract text from uploaded bytes and persist the resulting document.
///
/// Extraction failures (unsupported format, undecodable bytes, blank
/// content) surface as typed errors; nothing placeholder-shaped is ever
/// stored. The full extracted content is kept - uploads are not
/// truncated to their first chunk.
pub async fn upload_document(
    store: &dyn DocumentStore,
    raw: &[u8],
    filename: &str,
    subject: Subject,
    level: Level,
    owner_id: Option<String>,
) -> Result<DocumentMeta, StoreError> {
    let content = extraction::extract_text(raw, filename)?;
    let document = Document::new(filename, content, subject, level, owner_id);
    info!(
        id = %document.id,
        filename,
        chars = document.content.len(),
        "storing uploaded document"
    );
    let saved = store.save(document).await?;
    Ok(saved.meta())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_extracts_and_stores_full_content() {
        let store = MemoryDocumentStore::new();
        let body = "Paragraph one.\n\nParagraph two.";
        let meta = upload_document(
            &store,
            body.as_bytes(),
            "lecture.md",
            Subject::History,
            Level::Advanced,
            Some("u-1".into()),
        )
        .await
        .unwrap();

        let stored = store.get(&meta.id).await.unwrap().unwrap();
        assert_eq!(stored.content, body);
        assert_eq!(stored.subject, Subject::History);
        assert_eq!(stored.owner_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn upload_rejects_unsupported_formats() {
        let store = MemoryDocumentStore::new();
        let err = upload_document(
            &store,
            b"%PDF-1.7",
            "slides.pdf",
            Subject::Math,
            Level::Beginner,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Extraction(ExtractionError::UnsupportedFormat { .. })
        ));
        assert!(store.list(None).await.unwrap().is_empty());
    }
}
