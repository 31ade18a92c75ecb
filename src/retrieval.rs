//! Passage retrieval: scoring and ranking candidates against a query.
//!
//! The scorer is an exact-match token-overlap heuristic, kept simple on
//! purpose so ranking is reproducible and testable: the score of a
//! passage is the size of the intersection between the lowercased
//! whitespace-tokenized query and passage text. No length
//! normalization, no embeddings.

use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::chunking::derive_passages;
use crate::documents::DocumentStore;
use crate::knowledge::{KnowledgeBase, Passage};
use crate::models::{Level, Subject};

// ── Tokenization ───────────────────────────────────────────────────────

/// Lowercased whitespace token set of `text`.
#[must_use]
pub fn token_set(text: &str) -> FxHashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Number of tokens shared between two texts.
#[must_use]
pub fn token_overlap(a: &str, b: &str) -> usize {
    let set_a = token_set(a);
    let set_b = token_set(b);
    set_a.intersection(&set_b).count()
}

// ── Search filter ──────────────────────────────────────────────────────

/// Optional retrieval constraints. Unset dimensions are ignored.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub subject: Option<Subject>,
    pub level: Option<Level>,
    /// Scope retrieval to one uploaded document's passages.
    pub document_id: Option<String>,
}

impl SearchFilter {
    fn matches(&self, passage: &Passage) -> bool {
        let subject_ok = self
            .subject
            .is_none_or(|s| passage.subject.eq_ignore_ascii_case(s.as_str()));
        let level_ok = self
            .level
            .is_none_or(|l| passage.level.eq_ignore_ascii_case(l.as_str()));
        subject_ok && level_ok
    }
}

// ── Retriever ──────────────────────────────────────────────────────────

/// Scores and ranks passages from the static knowledge base or from a
/// referenced document's on-demand passages.
pub struct Retriever {
    knowledge: Arc<KnowledgeBase>,
    documents: Arc<dyn DocumentStore>,
}

impl Retriever {
    pub fn new(knowledge: Arc<KnowledgeBase>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            knowledge,
            documents,
        }
    }

    /// Top-`k` passages for `query`, best match first.
    ///
    /// When `filter.document_id` resolves, the candidate pool is that
    /// document's paragraph passages; otherwise (including when the id
    /// is unresolvable, which is non-fatal) the static pool. Ties and
    /// zero scores keep original pool order, and zero-score passages
    /// are still returned: the caller decides whether they are usable.
    pub async fn search(&self, query: &str, filter: &SearchFilter, k: usize) -> Vec<Passage> {
        let pool: Vec<Passage> = match &filter.document_id {
            Some(id) => match self.documents.get(id).await {
                Ok(Some(document)) => {
                    let passages = derive_passages(&document);
                    debug!(
                        document = %document.filename,
                        passages = passages.len(),
                        "searching within document"
                    );
                    passages
                }
                Ok(None) => {
                    warn!(document_id = %id, "document not found; falling back to static knowledge");
                    self.knowledge.passages().to_vec()
                }
                Err(err) => {
                    warn!(document_id = %id, %err, "document lookup failed; falling back to static knowledge");
                    self.knowledge.passages().to_vec()
                }
            },
            None => self.knowledge.passages().to_vec(),
        };

        let query_tokens = token_set(query);
        let mut scored: Vec<(usize, Passage)> = pool
            .into_iter()
            .filter(|p| filter.matches(p))
            .map(|p| {
                let passage_tokens = token_set(&p.text);
                let score = query_tokens.intersection(&passage_tokens).count();
                (score, p)
            })
            .collect();

        // Stable sort: ties keep first-seen pool order.
        scored.sort_by_key(|(score, _)| Reverse(*score));
        scored.truncate(k);
        scored.into_iter().map(|(_, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{Document, DocumentStore as _, MemoryDocumentStore};

    fn passage(text: &str, subject: &str) -> Passage {
        Passage::new(text, subject, "beginner", None)
    }

    fn retriever(passages: Vec<Passage>) -> (Retriever, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let retriever = Retriever::new(
            Arc::new(KnowledgeBase::from_passages(passages)),
            store.clone(),
        );
        (retriever, store)
    }

    #[tokio::test]
    async fn subject_filter_excludes_other_subjects() {
        let (retriever, _) = retriever(vec![
            passage("derivative of x squared is 2x", "math"),
            passage("cell mitosis phases", "biology"),
        ]);
        let filter = SearchFilter {
            subject: Some(Subject::Math),
            ..Default::default()
        };
        let results = retriever.search("derivative x", &filter, 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].subject, "math");
    }

    #[tokio::test]
    async fn ranking_is_descending_with_stable_ties() {
        let (retriever, _) = retriever(vec![
            passage("unrelated topic entirely", "general"),
            passage("forces and motion", "general"),
            passage("forces motion and energy together", "general"),
        ]);
        let results = retriever
            .search("forces motion energy", &SearchFilter::default(), 3)
            .await;
        assert_eq!(results[0].text, "forces motion and energy together");
        assert_eq!(results[1].text, "forces and motion");
        // Zero-score passage still returned, last.
        assert_eq!(results[2].text, "unrelated topic entirely");
    }

    #[tokio::test]
    async fn k_bounds_the_result_size() {
        let (retriever, _) = retriever(vec![
            passage("alpha beta", "general"),
            passage("beta gamma", "general"),
            passage("gamma delta", "general"),
        ]);
        for k in 0..5 {
            let results = retriever.search("beta", &SearchFilter::default(), k).await;
            assert!(results.len() <= k);
        }
    }

    #[tokio::test]
    async fn document_scope_uses_document_passages() {
        let (retriever, store) = retriever(vec![passage("static fact", "general")]);
        let doc = Document::new(
            "essay.txt",
            "The French Revolution began in 1789.\n\nThe Terror followed.",
            Subject::History,
            Level::Intermediate,
            None,
        );
        let id = doc.id.clone();
        store.save(doc).await.unwrap();

        let filter = SearchFilter {
            document_id: Some(id),
            ..Default::default()
        };
        let results = retriever.search("revolution 1789", &filter, 3).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("1789"));
        assert!(
            results[0]
                .source
                .as_deref()
                .unwrap()
                .starts_with("essay.txt")
        );
    }

    #[tokio::test]
    async fn unresolvable_document_falls_back_to_static_pool() {
        let (retriever, _) = retriever(vec![passage("static fact about forces", "general")]);
        let filter = SearchFilter {
            document_id: Some("no-such-id".into()),
            ..Default::default()
        };
        let results = retriever.search("forces", &filter, 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "static fact about forces");
    }

    #[test]
    fn token_overlap_is_case_insensitive_set_intersection() {
        assert_eq!(token_overlap("The Force force", "force THE"), 2);
        assert_eq!(token_overlap("", "anything"), 0);
    }
}
