//! Socratic tutoring core: knowledge retrieval and multi-strategy
//! answer generation with graceful degradation.
//!
//! ```text
//! AskRequest ──► Orchestrator ──► strategies::route ──► Strategy
//!                    │                                     │
//!                    │             ┌── Direct ─────────────┤ one backend call
//!                    │             ├── Specialist ─────────┤ subject-keyed style
//!                    │             ├── Ensemble ───────────┤ sampled candidates + pick
//!                    │             └── Rag ── Retriever ───┘ knowledge context
//!                    │                           │
//!                    │          KnowledgeBase ───┴─── derive_passages(Document)
//!                    │
//!                    └── on failure: base direct strategy ──► default reply
//! ```
//!
//! The caller-facing contract is total: [`Orchestrator::answer`] always
//! yields a well-formed three-field [`TutorReply`], however many
//! strategies or backend calls fail along the way.
//!
//! The generation backend, document store, and text extraction are
//! seams ([`backend::GenerationBackend`], [`documents::DocumentStore`],
//! [`extraction`]); an OpenAI chat-completions backend and in-memory /
//! JSON-directory stores ship in-crate.

pub mod backend;
pub mod chunking;
pub mod config;
pub mod documents;
pub mod extraction;
pub mod knowledge;
pub mod models;
pub mod orchestrator;
pub mod retrieval;
pub mod strategies;
pub mod telemetry;

pub use backend::{GenerationBackend, GenerationRequest, OpenAiBackend, SamplingParams};
pub use chunking::{ChunkOptions, chunk_text, derive_passages};
pub use config::Settings;
pub use documents::{Document, DocumentStore, JsonDocumentStore, MemoryDocumentStore};
pub use knowledge::{KnowledgeBase, Passage};
pub use models::{AskRequest, Level, Subject, TutorReply};
pub use orchestrator::Orchestrator;
pub use retrieval::{Retriever, SearchFilter};
pub use strategies::{SpecialistKind, Strategy, TutorMode};
