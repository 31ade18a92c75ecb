//! The top-level entry point and its fallback ladder.
//!
//! `ROUTE -> ATTEMPT(strategy) -> {SUCCESS | FALLBACK -> ATTEMPT(base)
//! -> {SUCCESS | TERMINAL_DEFAULT}}`
//!
//! The single guarantee the whole pipeline exists to provide lives
//! here: [`Orchestrator::answer`] always returns a structurally valid
//! three-field reply. Strategy failures degrade through the ladder
//! instead of surfacing; the terminal default is pure string formatting
//! and cannot fail.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::backend::GenerationBackend;
use crate::documents::DocumentStore;
use crate::knowledge::KnowledgeBase;
use crate::models::{AskRequest, Level, Subject, TutorReply};
use crate::retrieval::Retriever;
use crate::strategies::{self, Strategy, TutorMode};

/// Top-level tutoring service: routes, attempts, degrades.
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    retriever: Retriever,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        knowledge: Arc<KnowledgeBase>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            backend,
            retriever: Retriever::new(knowledge, documents),
        }
    }

    /// Answer a learner question. Total: never errors, never panics.
    ///
    /// The routed strategy is attempted first. Any failure (retrieval,
    /// backend, malformed candidate) falls back to the base direct
    /// strategy, and if that also fails, to the fixed default reply.
    #[instrument(skip(self, request), fields(subject = %request.subject, mode = ?mode))]
    pub async fn answer(&self, request: &AskRequest, mode: TutorMode) -> TutorReply {
        let strategy = strategies::route(mode, request.subject);

        match strategies::execute(strategy, self.backend.as_ref(), &self.retriever, request).await
        {
            Ok(reply) => {
                info!(?strategy, "strategy succeeded");
                return reply;
            }
            Err(err) => {
                warn!(?strategy, %err, "strategy failed; falling back");
            }
        }

        // The base strategy is unconditional: direct, single call, no
        // ensemble, specialist, or retrieval. Re-attempting it when it
        // was the routed strategy would just repeat the failed call.
        if strategy != Strategy::Direct {
            match strategies::execute(
                Strategy::Direct,
                self.backend.as_ref(),
                &self.retriever,
                request,
            )
            .await
            {
                Ok(reply) => {
                    info!("base strategy succeeded after fallback");
                    return reply;
                }
                Err(err) => {
                    error!(%err, "base strategy failed; returning default reply");
                }
            }
        } else {
            error!("base strategy already failed; returning default reply");
        }

        default_reply(request.subject, request.level)
    }
}

/// The terminal default: a generic clarifying question, a subject- and
/// level-flavored hint, and generic encouragement.
#[must_use]
pub fn default_reply(subject: Subject, level: Level) -> TutorReply {
    TutorReply::new(
        "What specific aspect of this topic would you like to explore further?",
        format!(
            "This is a great {subject} question at the {level} level. Let's break it down step by step."
        ),
        "I appreciate your curiosity! Let's work through this together.",
    )
}
