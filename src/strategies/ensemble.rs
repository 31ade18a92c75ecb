//! Sampled-ensemble generation: several candidates, one deterministic
//! pick.
//!
//! Each sample is an independent backend call carrying its own immutable
//! [`SamplingParams`]; samples run concurrently and a failed sample is
//! logged and skipped rather than aborting the ensemble. Selection is a
//! pure function over the candidate texts, favoring longer and more
//! query-specific clarifying questions and more detailed hints as a
//! cheap proxy for pedagogical quality (no second model call to judge).

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::StrategyError;
use crate::backend::{GenerationBackend, GenerationRequest, SamplingParams};
use crate::models::TutorReply;
use crate::retrieval::token_overlap;

/// Temperatures for the first samples, in generation order.
pub const TEMPERATURE_LADDER: [f32; 3] = [0.0, 0.3, 0.7];
/// Temperature used when more samples are requested than the ladder has.
pub const PAD_TEMPERATURE: f32 = 0.5;

const QUESTION_WEIGHT: f64 = 0.4;
const HINT_WEIGHT: f64 = 0.4;
const FEEDBACK_WEIGHT: f64 = 0.2;

/// Word-count targets at which each field's score saturates.
const QUESTION_TARGET_WORDS: f64 = 20.0;
const HINT_TARGET_WORDS: f64 = 30.0;
const FEEDBACK_TARGET_WORDS: f64 = 25.0;

/// Sampling parameters for an ensemble of `n`: the ladder truncated or
/// padded to length.
#[must_use]
pub fn sampling_ladder(n: usize) -> Vec<SamplingParams> {
    (0..n)
        .map(|i| {
            SamplingParams::with_temperature(
                TEMPERATURE_LADDER.get(i).copied().unwrap_or(PAD_TEMPERATURE),
            )
        })
        .collect()
}

/// Generate `n` candidates and return the best one.
///
/// Zero collected candidates is an outright failure, never a selection
/// over nothing; a single candidate is returned unscored.
pub async fn generate_ensemble(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
    n: usize,
) -> Result<TutorReply, StrategyError> {
    let ladder = sampling_ladder(n);
    let samples = join_all(
        ladder
            .iter()
            .map(|&params| backend.invoke(request, params)),
    )
    .await;

    // Candidates keep ladder order regardless of completion order, so
    // the earliest-generation tie-break below stays deterministic.
    let mut candidates = Vec::new();
    for (params, outcome) in ladder.iter().zip(samples) {
        match outcome {
            Ok(reply) if reply.is_well_formed() => candidates.push(reply),
            Ok(_) => {
                warn!(
                    temperature = params.temperature,
                    "sample returned a reply with blank fields; skipping"
                );
            }
            Err(err) => {
                warn!(
                    temperature = params.temperature,
                    %err,
                    "ensemble sample failed; skipping"
                );
            }
        }
    }

    if candidates.is_empty() {
        return Err(StrategyError::EmptyEnsemble);
    }
    let best = if candidates.len() == 1 {
        0
    } else {
        let best = select_best(&candidates, &request.question);
        debug!(
            candidates = candidates.len(),
            selected = best,
            "ensemble selection complete"
        );
        best
    };
    Ok(candidates.swap_remove(best))
}

/// Index of the best candidate; ties resolve to the earliest.
///
/// Pure and deterministic for fixed inputs.
#[must_use]
pub fn select_best(candidates: &[TutorReply], original_question: &str) -> usize {
    debug_assert!(!candidates.is_empty(), "selection over an empty set");

    let mut best = 0usize;
    let mut best_score = f64::MIN;
    for (i, candidate) in candidates.iter().enumerate() {
        let score = score_candidate(candidate, original_question);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

/// Weighted quality score of one candidate.
#[must_use]
pub fn score_candidate(candidate: &TutorReply, original_question: &str) -> f64 {
    let question_words = word_count(&candidate.clarifying_question) as f64;
    let specificity = token_overlap(&candidate.clarifying_question, original_question) as f64
        / word_count(original_question).max(1) as f64;
    let question_score =
        (0.7 * (question_words / QUESTION_TARGET_WORDS) + 0.3 * specificity).min(1.0);

    let hint_score = (word_count(&candidate.concept_hint) as f64 / HINT_TARGET_WORDS).min(1.0);
    let feedback_score = (word_count(&candidate.feedback) as f64 / FEEDBACK_TARGET_WORDS).min(1.0);

    QUESTION_WEIGHT * question_score + HINT_WEIGHT * hint_score + FEEDBACK_WEIGHT * feedback_score
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_question_words(n: usize) -> TutorReply {
        TutorReply::new(
            vec!["word"; n].join(" "),
            "a hint of fixed length here",
            "good effort so far",
        )
    }

    #[test]
    fn ladder_truncates_and_pads() {
        let two = sampling_ladder(2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].temperature, 0.3);

        let five = sampling_ladder(5);
        assert_eq!(five[2].temperature, 0.7);
        assert_eq!(five[3].temperature, PAD_TEMPERATURE);
        assert_eq!(five[4].temperature, PAD_TEMPERATURE);
    }

    #[test]
    fn longer_clarifying_question_dominates() {
        // Word counts 5, 20, 12 with other fields equal: the 20-word
        // question saturates its score and wins.
        let candidates = vec![
            candidate_with_question_words(5),
            candidate_with_question_words(20),
            candidate_with_question_words(12),
        ];
        assert_eq!(select_best(&candidates, "what is a derivative"), 1);
    }

    #[test]
    fn selection_is_deterministic() {
        let candidates = vec![
            candidate_with_question_words(8),
            candidate_with_question_words(15),
        ];
        let first = select_best(&candidates, "why do cells divide");
        for _ in 0..10 {
            assert_eq!(select_best(&candidates, "why do cells divide"), first);
        }
    }

    #[test]
    fn ties_resolve_to_earliest_candidate() {
        let candidates = vec![
            candidate_with_question_words(10),
            candidate_with_question_words(10),
        ];
        assert_eq!(select_best(&candidates, "anything"), 0);
    }

    #[test]
    fn query_specific_question_beats_equal_length_generic_one() {
        let generic = TutorReply::new(
            "what do you already believe about this topic in general terms",
            "hint",
            "feedback",
        );
        let specific = TutorReply::new(
            "what happens to the derivative when x squared grows without bound",
            "hint",
            "feedback",
        );
        let picked = select_best(
            &[generic, specific],
            "how does the derivative of x squared behave",
        );
        assert_eq!(picked, 1);
    }
}
