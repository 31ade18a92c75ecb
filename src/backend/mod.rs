//! The generation backend seam.
//!
//! A [`GenerationBackend`] turns one structured request into one
//! [`TutorReply`]. It is the only suspending operation in the pipeline
//! and the sole source of latency and failure; timeouts and bounded
//! retries are the backend's own business and invisible to callers.
//!
//! Sampling parameters ride along with every call as an immutable value.
//! There is deliberately no mutable temperature knob on the backend
//! itself: concurrent queries share one backend instance, and a shared
//! mutated-and-restored field would race.

mod openai;

pub use openai::OpenAiBackend;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Level, Subject, TutorReply};

// ── Sampling ───────────────────────────────────────────────────────────

/// Immutable per-invocation sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Sampling temperature for this single call.
    pub temperature: f32,
}

impl SamplingParams {
    #[must_use]
    pub fn with_temperature(temperature: f32) -> Self {
        Self { temperature }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        // Deterministic by default, matching the original LM setup.
        Self { temperature: 0.0 }
    }
}

// ── Request shape ──────────────────────────────────────────────────────

/// How the backend should be asked to reason before answering.
///
/// These correspond to the specialist styles: a step-by-step solver for
/// math, stepwise concept reasoning for the sciences, and direct
/// prediction for humanities and general questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningStyle {
    /// Answer directly, no scaffolding.
    DirectPrediction,
    /// Reason through the concept step by step first.
    Stepwise,
    /// Work the problem like a short program, step by step.
    StepSolver,
}

/// One structured generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub question: String,
    pub subject: Subject,
    pub level: Level,
    /// Retrieved knowledge context, when the knowledge-augmented
    /// strategy is driving the call.
    pub knowledge: Option<String>,
    pub style: ReasoningStyle,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>, subject: Subject, level: Level) -> Self {
        Self {
            question: question.into(),
            subject,
            level,
            knowledge: None,
            style: ReasoningStyle::DirectPrediction,
        }
    }

    #[must_use]
    pub fn with_knowledge(mut self, knowledge: impl Into<String>) -> Self {
        self.knowledge = Some(knowledge.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ReasoningStyle) -> Self {
        self.style = style;
        self
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors a backend invocation can surface after its internal retry
/// budget is spent.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call did not complete within the configured timeout.
    #[error("generation call timed out after {timeout_secs}s")]
    Timeout {
        /// The configured per-request timeout, in seconds.
        timeout_secs: u64,
    },

    /// Transport-level failure reaching the model service.
    #[error("generation transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model service answered with a non-success status.
    #[error("generation service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logs.
        message: String,
    },

    /// The model answered, but not with a well-formed three-field reply.
    #[error("malformed generation output: {reason}")]
    MalformedOutput {
        /// What was wrong with the payload.
        reason: String,
    },
}

// ── Trait ──────────────────────────────────────────────────────────────

/// Collaborator that produces one candidate reply per invocation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce one [`TutorReply`] for the request under the given
    /// sampling parameters. Implementations own their timeout and retry
    /// policy; an `Err` means the budget is exhausted.
    async fn invoke(
        &self,
        request: &GenerationRequest,
        params: SamplingParams,
    ) -> Result<TutorReply, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sampling_is_deterministic() {
        assert_eq!(SamplingParams::default().temperature, 0.0);
    }

    #[test]
    fn request_builders_attach_context_and_style() {
        let req = GenerationRequest::new("why is the sky blue?", Subject::Physics, Level::Beginner)
            .with_knowledge("Rayleigh scattering favors short wavelengths.")
            .with_style(ReasoningStyle::Stepwise);
        assert!(req.knowledge.is_some());
        assert_eq!(req.style, ReasoningStyle::Stepwise);
    }
}
