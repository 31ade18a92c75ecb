//! Shared fixtures: scriptable generation backends and pipeline
//! assembly helpers.
//!
//! Not every test binary uses every fixture.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tutorsmith::backend::{
    BackendError, GenerationBackend, GenerationRequest, ReasoningStyle, SamplingParams,
};
use tutorsmith::documents::MemoryDocumentStore;
use tutorsmith::knowledge::{KnowledgeBase, Passage};
use tutorsmith::models::TutorReply;
use tutorsmith::orchestrator::Orchestrator;

/// A reply that passes well-formedness checks everywhere.
pub fn good_reply(tag: &str) -> TutorReply {
    TutorReply::new(
        format!("What do you think {tag} implies here?"),
        format!("Consider the concept behind {tag}."),
        "You're on the right track, keep going!",
    )
}

/// Backend that fails every invocation.
pub struct FailingBackend;

#[async_trait]
impl GenerationBackend for FailingBackend {
    async fn invoke(
        &self,
        _request: &GenerationRequest,
        _params: SamplingParams,
    ) -> Result<TutorReply, BackendError> {
        Err(BackendError::Http {
            status: 500,
            message: "backend is down".into(),
        })
    }
}

/// Call record captured by [`RecordingBackend`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub style: ReasoningStyle,
    pub knowledge: Option<String>,
    pub temperature: f32,
}

/// Backend that answers successfully (unless told to fail a style) and
/// records every invocation.
pub struct RecordingBackend {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub invocations: AtomicUsize,
    /// Invocations with this reasoning style fail.
    pub fail_style: Option<ReasoningStyle>,
    /// Invocations at this exact temperature fail.
    pub fail_temperature: Option<f32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            invocations: AtomicUsize::new(0),
            fail_style: None,
            fail_temperature: None,
        }
    }

    pub fn failing_for(style: ReasoningStyle) -> Self {
        Self {
            fail_style: Some(style),
            ..Self::new()
        }
    }

    pub fn failing_at_temperature(temperature: f32) -> Self {
        Self {
            fail_temperature: Some(temperature),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    async fn invoke(
        &self,
        request: &GenerationRequest,
        params: SamplingParams,
    ) -> Result<TutorReply, BackendError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            style: request.style,
            knowledge: request.knowledge.clone(),
            temperature: params.temperature,
        });
        if self.fail_style == Some(request.style)
            || self.fail_temperature == Some(params.temperature)
        {
            return Err(BackendError::MalformedOutput {
                reason: "scripted failure".into(),
            });
        }
        Ok(good_reply(&format!("t{}", params.temperature)))
    }
}

/// Orchestrator over the given backend, a small static knowledge base,
/// and an empty in-memory document store.
pub fn orchestrator_with(backend: Arc<dyn GenerationBackend>) -> Orchestrator {
    let knowledge = KnowledgeBase::from_passages(vec![
        Passage::new(
            "The derivative of x squared is 2x.",
            "math",
            "beginner",
            Some("calculus.json".into()),
        ),
        Passage::new(
            "Forces cause changes in motion.",
            "physics",
            "beginner",
            Some("mechanics.json".into()),
        ),
    ]);
    Orchestrator::new(
        backend,
        Arc::new(knowledge),
        Arc::new(MemoryDocumentStore::new()),
    )
}
