use crate::corpus::CorpusSnapshot;
use crate::scoring::SimilarityScorer;
use crate::text::NormalizedText;
use crate::types::ScoredCandidate;

/// Candidates returned per incoming message unless the caller asks for
/// more.
pub const DEFAULT_TOP_N: usize = 3;

/// Score every corpus entry against the incoming message and return the
/// top `top_n` in descending score order.
///
/// The sort is stable and uses no secondary key: entries with identical
/// scores keep their corpus order, which downstream policies rely on for
/// determinism. One scorer invocation per entry, O(corpus) per message.
pub fn rank<S: SimilarityScorer>(
    scorer: &S,
    incoming: &NormalizedText,
    corpus: &CorpusSnapshot,
    top_n: usize,
) -> Vec<ScoredCandidate> {
    // 1. Scoring phase
    let mut candidates: Vec<ScoredCandidate> = corpus
        .entries()
        .iter()
        .map(|entry| {
            let breakdown = scorer.score(incoming, &entry.normalized);
            let score = scorer.score_value(&breakdown);
            ScoredCandidate {
                instruction: entry.example.instruction.clone(),
                response: entry.example.response.clone(),
                score,
                breakdown,
            }
        })
        .collect();

    // 2. Ordering phase: descending score, ties keep corpus order
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // 3. Truncation phase
    candidates.truncate(top_n);
    candidates
}
