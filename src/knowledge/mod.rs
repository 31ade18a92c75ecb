//! Static domain knowledge: the passage type and the process-wide index.
//!
//! A [`KnowledgeBase`] is populated exactly once, before serving traffic,
//! from JSON entry files on disk; thereafter it is read-only and shared
//! behind an `Arc`, so lookups need no locking. Document-derived passages
//! are *not* stored here - they are recomputed per retrieval call by
//! [`crate::chunking::derive_passages`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

// ── Passage ────────────────────────────────────────────────────────────

/// A retrievable unit of domain text tagged with subject, level, and an
/// optional source label.
///
/// Immutable once created; the constructor trims its text, and callers
/// are expected never to construct a blank passage ([`KnowledgeBase`]
/// and passage derivation both skip blank text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub subject: String,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Passage {
    pub fn new(
        text: impl Into<String>,
        subject: impl Into<String>,
        level: impl Into<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            text: text.into().trim().to_string(),
            subject: subject.into(),
            level: level.into(),
            source,
        }
    }
}

// ── Entry files ────────────────────────────────────────────────────────

/// On-disk shape of one knowledge file: `{ "entries": [...] }`.
#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    entries: Vec<KnowledgeEntry>,
}

/// One persisted knowledge entry. `subject`/`level` default like the
/// original corpus files; `source` falls back to the file name.
#[derive(Debug, Deserialize)]
struct KnowledgeEntry {
    #[serde(default)]
    text: String,
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    source: Option<String>,
}

fn default_subject() -> String {
    "general".to_string()
}

fn default_level() -> String {
    "beginner".to_string()
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading the static knowledge set.
///
/// Only directory-level IO is fatal; malformed files and entries are
/// skipped with a warning so one bad file cannot take down startup.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// The knowledge directory could not be read.
    #[error("failed to read knowledge directory {path}: {source}")]
    DirRead {
        /// Directory that failed.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

// ── KnowledgeBase ──────────────────────────────────────────────────────

/// The static, read-only passage population.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    passages: Vec<Passage>,
}

impl KnowledgeBase {
    /// An empty knowledge base (used when no knowledge directory is
    /// configured; retrieval then simply finds nothing).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a knowledge base from already-materialized passages.
    /// Blank-text passages are dropped to uphold the passage invariant.
    #[must_use]
    pub fn from_passages(passages: Vec<Passage>) -> Self {
        Self {
            passages: passages
                .into_iter()
                .filter(|p| !p.text.trim().is_empty())
                .collect(),
        }
    }

    /// Load every `*.json` entry file under `dir`.
    ///
    /// A missing directory yields an empty base with a warning, matching
    /// the original service's behavior; unreadable or malformed files and
    /// blank entries are skipped with a warning, never fatal.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            warn!(path = %dir.display(), "knowledge directory not found; starting empty");
            return Ok(Self::empty());
        }

        let mut read_dir =
            tokio::fs::read_dir(dir)
                .await
                .map_err(|source| KnowledgeError::DirRead {
                    path: dir.display().to_string(),
                    source,
                })?;

        let mut passages = Vec::new();
        while let Some(dent) = read_dir
            .next_entry()
            .await
            .map_err(|source| KnowledgeError::DirRead {
                path: dir.display().to_string(),
                source,
            })?
        {
            let path = dent.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("knowledge.json")
                .to_string();

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable knowledge file");
                    continue;
                }
            };
            let parsed: KnowledgeFile = match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping malformed knowledge file");
                    continue;
                }
            };

            for entry in parsed.entries {
                if entry.text.trim().is_empty() {
                    warn!(path = %path.display(), "skipping knowledge entry with blank text");
                    continue;
                }
                passages.push(Passage::new(
                    entry.text,
                    entry.subject,
                    entry.level,
                    entry.source.or_else(|| Some(file_name.clone())),
                ));
            }
        }

        info!(count = passages.len(), "loaded static knowledge passages");
        Ok(Self { passages })
    }

    /// All static passages, in load order.
    #[must_use]
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_passages_drops_blank_text() {
        let base = KnowledgeBase::from_passages(vec![
            Passage::new("derivatives measure change", "math", "beginner", None),
            Passage::new("   ", "math", "beginner", None),
        ]);
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn passage_constructor_trims_text() {
        let p = Passage::new("  mitosis has phases  ", "biology", "beginner", None);
        assert_eq!(p.text, "mitosis has phases");
    }

    #[tokio::test]
    async fn load_skips_malformed_files_and_entries() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("good.json"),
            serde_json::json!({
                "entries": [
                    {"text": "Newton's second law relates force and acceleration.",
                     "subject": "physics", "level": "beginner"},
                    {"text": "   "},
                ]
            })
            .to_string(),
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("broken.json"), "{not json")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored")
            .await
            .unwrap();

        let base = KnowledgeBase::load(dir.path()).await.unwrap();
        assert_eq!(base.len(), 1);
        let passage = &base.passages()[0];
        assert_eq!(passage.subject, "physics");
        assert_eq!(passage.source.as_deref(), Some("good.json"));
    }

    #[tokio::test]
    async fn load_missing_dir_is_empty_not_fatal() {
        let base = KnowledgeBase::load("/definitely/not/a/real/dir")
            .await
            .unwrap();
        assert!(base.is_empty());
    }
}
