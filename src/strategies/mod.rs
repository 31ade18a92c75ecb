//! Generation strategies and the routing table that selects them.
//!
//! Strategy choice is a closed enumeration resolved by one lookup,
//! never string comparison at call sites: adding a subject means
//! touching the table here and nothing in generation logic.
//!
//! * [`Strategy::Direct`] - one backend call, no scaffolding; also the
//!   unconditional fallback base.
//! * [`Strategy::Specialist`] - subject-keyed reasoning style.
//! * [`Strategy::Ensemble`] - sampled candidates, deterministic pick.
//! * [`Strategy::Rag`] - retrieval-augmented, explicitly selected by
//!   mode and never by the subject table.

pub mod ensemble;
pub mod rag;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{
    BackendError, GenerationBackend, GenerationRequest, ReasoningStyle, SamplingParams,
};
use crate::models::{AskRequest, Subject, TutorReply};
use crate::retrieval::Retriever;

/// Candidates sampled by the ensemble strategy.
pub const DEFAULT_ENSEMBLE_SIZE: usize = 3;

// ── Specialists ────────────────────────────────────────────────────────

/// Subject-category specialists, each with a distinct reasoning style.
///
/// Stateless values: resolving one is a table lookup, so there is no
/// per-subject instance to construct or cache and nothing to race on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistKind {
    /// Step-by-step problem solver.
    Math,
    /// Stepwise concept reasoning.
    Science,
    /// Direct prediction.
    Humanities,
}

impl SpecialistKind {
    /// The specialist table: math gets the step solver, the natural
    /// sciences get stepwise reasoning, everything else (history,
    /// general, future subjects) the humanities specialist.
    #[must_use]
    pub fn for_subject(subject: Subject) -> Self {
        match subject {
            Subject::Math => SpecialistKind::Math,
            Subject::Physics | Subject::Biology | Subject::Chemistry => SpecialistKind::Science,
            Subject::History | Subject::General => SpecialistKind::Humanities,
        }
    }

    #[must_use]
    pub fn reasoning_style(self) -> ReasoningStyle {
        match self {
            SpecialistKind::Math => ReasoningStyle::StepSolver,
            SpecialistKind::Science => ReasoningStyle::Stepwise,
            SpecialistKind::Humanities => ReasoningStyle::DirectPrediction,
        }
    }
}

// ── Modes and routing ──────────────────────────────────────────────────

/// Caller-facing generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TutorMode {
    #[default]
    Direct,
    Ensemble,
    Specialist,
    RagAugmented,
    /// Combined policy: specialist for STEM subjects, ensemble for the
    /// rest.
    Advanced,
}

/// A resolved generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Ensemble,
    Specialist(SpecialistKind),
    Rag,
}

/// Resolve a mode and subject to a concrete strategy.
#[must_use]
pub fn route(mode: TutorMode, subject: Subject) -> Strategy {
    match mode {
        TutorMode::Direct => Strategy::Direct,
        TutorMode::Ensemble => Strategy::Ensemble,
        TutorMode::Specialist => Strategy::Specialist(SpecialistKind::for_subject(subject)),
        TutorMode::RagAugmented => Strategy::Rag,
        TutorMode::Advanced => {
            if subject.is_stem() {
                Strategy::Specialist(SpecialistKind::for_subject(subject))
            } else {
                Strategy::Ensemble
            }
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Why a strategy attempt failed. Always caught by the orchestrator and
/// converted into the next fallback step; never caller-facing.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The backend exhausted its budget.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Every ensemble sample failed; there is nothing to select from.
    #[error("ensemble produced no candidates")]
    EmptyEnsemble,

    /// The backend returned a reply with blank fields.
    #[error("strategy produced a malformed reply")]
    MalformedReply,
}

// ── Execution ──────────────────────────────────────────────────────────

/// Run one resolved strategy to completion.
pub async fn execute(
    strategy: Strategy,
    backend: &dyn GenerationBackend,
    retriever: &Retriever,
    request: &AskRequest,
) -> Result<TutorReply, StrategyError> {
    let reply = match strategy {
        Strategy::Direct => {
            let prompt = GenerationRequest::new(&request.question, request.subject, request.level);
            backend.invoke(&prompt, SamplingParams::default()).await?
        }
        Strategy::Specialist(kind) => {
            let prompt = GenerationRequest::new(&request.question, request.subject, request.level)
                .with_style(kind.reasoning_style());
            backend.invoke(&prompt, SamplingParams::default()).await?
        }
        Strategy::Ensemble => {
            let prompt = GenerationRequest::new(&request.question, request.subject, request.level);
            ensemble::generate_ensemble(backend, &prompt, DEFAULT_ENSEMBLE_SIZE).await?
        }
        Strategy::Rag => rag::answer_with_knowledge(backend, retriever, request).await?,
    };

    if !reply.is_well_formed() {
        return Err(StrategyError::MalformedReply);
    }
    Ok(reply)
}
