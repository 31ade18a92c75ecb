//! Core value types shared across the tutoring pipeline.
//!
//! Everything here is a plain serde-friendly data type: the closed
//! [`Subject`] and [`Level`] vocabularies, the [`AskRequest`] a caller
//! submits, and the [`TutorReply`] every strategy ultimately produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ── Subject ────────────────────────────────────────────────────────────

/// Academic subject vocabulary.
///
/// Closed set: request validation happens before the core, so any
/// `Subject` reaching the pipeline is one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    Physics,
    Biology,
    History,
    Chemistry,
    General,
}

impl Subject {
    /// All known subjects, in declaration order.
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::Physics,
        Subject::Biology,
        Subject::History,
        Subject::Chemistry,
        Subject::General,
    ];

    /// Lowercase wire form of the subject.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Physics => "physics",
            Subject::Biology => "biology",
            Subject::History => "history",
            Subject::Chemistry => "chemistry",
            Subject::General => "general",
        }
    }

    /// True for the STEM subjects that favor specialist reasoning.
    #[must_use]
    pub fn is_stem(&self) -> bool {
        matches!(
            self,
            Subject::Math | Subject::Physics | Subject::Chemistry | Subject::Biology
        )
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Subject::Math),
            "physics" => Ok(Subject::Physics),
            "biology" => Ok(Subject::Biology),
            "history" => Ok(Subject::History),
            "chemistry" => Ok(Subject::Chemistry),
            "general" => Ok(Subject::General),
            other => Err(ParseEnumError {
                what: "subject",
                value: other.to_string(),
            }),
        }
    }
}

// ── Level ──────────────────────────────────────────────────────────────

/// Learner difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Lowercase wire form of the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(ParseEnumError {
                what: "level",
                value: other.to_string(),
            }),
        }
    }
}

/// A string did not name a known enum variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized {what}: '{value}'")]
pub struct ParseEnumError {
    /// Which vocabulary was being parsed ("subject" or "level").
    pub what: &'static str,
    /// The offending input.
    pub value: String,
}

// ── AskRequest ─────────────────────────────────────────────────────────

/// A learner question entering the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The student's question, verbatim.
    pub question: String,
    pub subject: Subject,
    pub level: Level,
    /// Scope retrieval to one uploaded document when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>, subject: Subject, level: Level) -> Self {
        Self {
            question: question.into(),
            subject,
            level,
            document_id: None,
        }
    }

    /// Scope this request to a specific uploaded document.
    #[must_use]
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

// ── TutorReply ─────────────────────────────────────────────────────────

/// One generated tutoring answer: the three guided fields every caller
/// receives instead of a direct answer.
///
/// A well-formed reply has all three fields non-blank; backends that
/// return anything less are treated as having failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorReply {
    /// A question that guides the student's own thinking.
    pub clarifying_question: String,
    /// A hint pointing at the relevant concept without revealing answers.
    pub concept_hint: String,
    /// Encouraging feedback for the student.
    pub feedback: String,
}

impl TutorReply {
    pub fn new(
        clarifying_question: impl Into<String>,
        concept_hint: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            clarifying_question: clarifying_question.into(),
            concept_hint: concept_hint.into(),
            feedback: feedback.into(),
        }
    }

    /// True when all three fields carry non-whitespace content.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.clarifying_question.trim().is_empty()
            && !self.concept_hint.trim().is_empty()
            && !self.feedback.trim().is_empty()
    }
}
