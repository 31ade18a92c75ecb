//! Text segmentation for the two phases that need it.
//!
//! Two deliberately distinct disciplines live here:
//!
//! * [`chunk_text`] - ingestion-time *size-limiting* chunking: fixed-size
//!   overlapping windows aligned to sentence boundaries, for storage and
//!   size limits.
//! * [`derive_passages`] - retrieval-time *paragraph derivation*: splits a
//!   document into paragraph-level [`Passage`]s, the unit the retriever
//!   scores.
//!
//! They are not unified into one chunker: the first optimizes for bounded,
//! roughly-uniform sizes, the second for semantically coherent retrieval
//! units.
//!
//! All window arithmetic operates on *characters*, not bytes, so
//! multi-byte text can never be split mid-scalar.

use regex::Regex;
use std::sync::LazyLock;

use crate::documents::Document;
use crate::knowledge::Passage;

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// How far past the proposed cut the sentence-boundary search may look.
const BOUNDARY_SLACK: usize = 100;
/// How far past the proposed cut the plain-space fallback may look.
const SPACE_SLACK: usize = 50;

// ── Size-limiting chunking ─────────────────────────────────────────────

/// Tuning knobs for [`chunk_text`].
#[derive(Debug, Clone, Copy)]
pub struct ChunkOptions {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of overlap carried into the next chunk.
    pub overlap: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Split `text` into overlapping chunks aligned to sentence boundaries.
///
/// Whitespace runs are collapsed to single spaces first. Every chunk
/// except possibly the last is at most `chunk_size + 100` characters
/// long (the boundary-search slack). Returns an empty vector for
/// blank input.
///
/// Cut placement, per chunk:
/// 1. Propose `end = start + chunk_size`.
/// 2. Prefer the earliest sentence end (`". "`, `"? "`, `"! "`) inside
///    `[max(start, end - chunk_size/5), end + 100)`, consuming the
///    punctuation and the following space.
/// 3. Failing that, break after the last plain space before `end + 50`.
/// 4. Failing that, hard-cut at the proposed `end`.
///
/// The cursor then advances by `end - overlap`, clamped so it always
/// moves forward even on pathological inputs.
#[must_use]
pub fn chunk_text(text: &str, opts: ChunkOptions) -> Vec<String> {
    let normalized = WHITESPACE_RUNS.replace_all(text, " ");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= opts.chunk_size {
        return vec![normalized.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let proposed = start + opts.chunk_size;
        if proposed >= chars.len() {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        let search_start = start.max(proposed.saturating_sub(opts.chunk_size / 5));
        let end = match find_sentence_end(&chars, search_start, proposed + BOUNDARY_SLACK) {
            Some(boundary) => boundary + 2,
            None => match rfind_space(&chars, search_start, proposed + SPACE_SLACK) {
                Some(space) => space + 1,
                None => proposed,
            },
        };

        chunks.push(chars[start..end].iter().collect());

        let next = end.saturating_sub(opts.overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

/// Earliest index in `[from, to)` where a sentence-ending punctuation
/// mark is followed by a space, with the full two-character match inside
/// the window.
fn find_sentence_end(chars: &[char], from: usize, to: usize) -> Option<usize> {
    let to = to.min(chars.len());
    if to < 2 || from + 2 > to {
        return None;
    }
    (from..=to - 2).find(|&i| matches!(chars[i], '.' | '?' | '!') && chars[i + 1] == ' ')
}

/// Last space in `[from, to)`, if any.
fn rfind_space(chars: &[char], from: usize, to: usize) -> Option<usize> {
    let to = to.min(chars.len());
    (from..to).rev().find(|&i| chars[i] == ' ')
}

// ── Paragraph derivation ───────────────────────────────────────────────

/// Derive retrieval passages from a document's content.
///
/// The content is split on blank-line boundaries; blank paragraphs are
/// dropped but still counted, so the 1-based paragraph index in each
/// passage's source label reflects the document's own layout.
#[must_use]
pub fn derive_passages(document: &Document) -> Vec<Passage> {
    document
        .content
        .split("\n\n")
        .enumerate()
        .filter(|(_, paragraph)| !paragraph.trim().is_empty())
        .map(|(i, paragraph)| {
            Passage::new(
                paragraph.trim(),
                document.subject.as_str(),
                document.level.as_str(),
                Some(format!("{} (paragraph {})", document.filename, i + 1)),
            )
        })
        .collect()
}
