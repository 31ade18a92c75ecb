//! Knowledge-augmented generation: retrieve first, then generate once
//! with the retrieved passages as context.

use tracing::{debug, warn};

use super::StrategyError;
use crate::backend::{GenerationBackend, GenerationRequest, ReasoningStyle, SamplingParams};
use crate::models::{AskRequest, TutorReply};
use crate::retrieval::{Retriever, SearchFilter};

/// Passages retrieved per question.
pub const RETRIEVAL_K: usize = 3;

/// Context substituted when retrieval finds nothing. Empty retrieval is
/// not an error; the tutor just answers without specifics.
pub const FALLBACK_KNOWLEDGE: &str =
    "No specific knowledge found. Provide a general Socratic response.";

/// Answer with retrieved knowledge attached to a single backend call.
pub async fn answer_with_knowledge(
    backend: &dyn GenerationBackend,
    retriever: &Retriever,
    request: &AskRequest,
) -> Result<TutorReply, StrategyError> {
    let filter = SearchFilter {
        subject: Some(request.subject),
        level: Some(request.level),
        document_id: request.document_id.clone(),
    };
    let retrieved = retriever
        .search(&request.question, &filter, RETRIEVAL_K)
        .await;

    let knowledge = if retrieved.is_empty() {
        warn!("no relevant knowledge retrieved; using generic context");
        FALLBACK_KNOWLEDGE.to_string()
    } else {
        let sources: Vec<&str> = retrieved
            .iter()
            .filter_map(|p| p.source.as_deref())
            .collect();
        debug!(passages = retrieved.len(), ?sources, "retrieved knowledge");
        retrieved
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let prompt = GenerationRequest::new(&request.question, request.subject, request.level)
        .with_knowledge(knowledge)
        .with_style(ReasoningStyle::Stepwise);
    Ok(backend.invoke(&prompt, SamplingParams::default()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_context_names_the_condition() {
        assert!(FALLBACK_KNOWLEDGE.contains("No specific knowledge found"));
        assert_eq!(RETRIEVAL_K, 3);
    }
}
