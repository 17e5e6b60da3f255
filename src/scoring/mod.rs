pub mod fuzzy;
pub mod slang;

use std::collections::BTreeSet;

use crate::text::NormalizedText;
pub use fuzzy::fuzzy_ratio;
pub use slang::SlangLexicon;

/// Component terms of one incoming-message / stored-instruction pairing,
/// kept separate so callers can explain a score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub fuzzy_ratio: f32,
    pub keyword_jaccard: f32,
    pub substring_bonus: f32,
    pub slang_bonus: f32,
}

pub trait SimilarityScorer {
    fn score(&self, incoming: &NormalizedText, instruction: &NormalizedText) -> ScoreBreakdown;

    fn score_value(&self, details: &ScoreBreakdown) -> f32;
}

/// Fixed term weights. These are configuration constants chosen at
/// construction, never adjusted at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub fuzzy: f32,
    pub keyword: f32,
    pub substring_bonus: f32,
    pub slang_bonus: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fuzzy: 0.4,
            keyword: 0.5,
            substring_bonus: 0.3,
            slang_bonus: 0.2,
        }
    }
}

/// Weighted linear combination of fuzzy ratio, keyword Jaccard, and a
/// substring-containment bonus, with an optional slang-category bonus when
/// a lexicon is attached.
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: ScoreWeights,
    slang: Option<SlangLexicon>,
}

impl WeightedScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            slang: None,
        }
    }

    pub fn with_slang(mut self, lexicon: SlangLexicon) -> Self {
        self.slang = Some(lexicon);
        self
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }
}

impl SimilarityScorer for WeightedScorer {
    fn score(&self, incoming: &NormalizedText, instruction: &NormalizedText) -> ScoreBreakdown {
        let fuzzy = fuzzy_ratio(&incoming.normalized, &instruction.normalized);
        let jaccard = keyword_jaccard(&incoming.keywords, &instruction.keywords);

        // Containment in either direction earns the bonus. An empty string
        // is a substring of everything, so blank input is excluded.
        let contained = !incoming.normalized.is_empty()
            && !instruction.normalized.is_empty()
            && (incoming.normalized.contains(instruction.normalized.as_str())
                || instruction.normalized.contains(incoming.normalized.as_str()));
        let substring_bonus = if contained {
            self.weights.substring_bonus
        } else {
            0.0
        };

        let slang_bonus = match &self.slang {
            Some(lexicon)
                if lexicon.share_category(&incoming.normalized, &instruction.normalized) =>
            {
                self.weights.slang_bonus
            }
            _ => 0.0,
        };

        ScoreBreakdown {
            fuzzy_ratio: fuzzy,
            keyword_jaccard: jaccard,
            substring_bonus,
            slang_bonus,
        }
    }

    fn score_value(&self, details: &ScoreBreakdown) -> f32 {
        self.weights.fuzzy * details.fuzzy_ratio
            + self.weights.keyword * details.keyword_jaccard
            + details.substring_bonus
            + details.slang_bonus
    }
}

/// Jaccard index of two keyword sets. Defined as 0.0 when either set is
/// empty, never a division fault.
pub fn keyword_jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}
