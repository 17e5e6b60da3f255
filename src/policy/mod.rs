pub mod tables;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::ScoredCandidate;
pub use tables::ReplyTables;

/// Default acceptance threshold: the top candidate's response is returned
/// verbatim only when its score strictly exceeds this.
pub const ACCEPTANCE_THRESHOLD: f32 = 0.3;

/// Threshold above which the blending policy stops blending and passes
/// the top response through verbatim.
pub const BLEND_PASSTHROUGH_THRESHOLD: f32 = 0.6;

/// Fragments sampled when synthesizing a blended reply.
const BLEND_MAX_FRAGMENTS: usize = 2;

/// Turns ranked candidates into final reply text. Implementations own the
/// threshold decision and the fallback draw; media short-circuiting,
/// empty-message handling, and group prefixing happen in the engine
/// before and after this.
pub trait ResponsePolicy {
    fn pick<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredCandidate],
        tables: &ReplyTables,
        rng: &mut R,
    ) -> String;
}

/// Best-match passthrough: top candidate's stored response above the
/// threshold, otherwise a uniform draw from the default pool.
#[derive(Debug, Clone, Copy)]
pub struct PassthroughPolicy {
    threshold: f32,
}

impl PassthroughPolicy {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for PassthroughPolicy {
    fn default() -> Self {
        Self::new(ACCEPTANCE_THRESHOLD)
    }
}

impl ResponsePolicy for PassthroughPolicy {
    fn pick<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredCandidate],
        tables: &ReplyTables,
        rng: &mut R,
    ) -> String {
        match ranked.first() {
            Some(top) if top.score > self.threshold => top.response.clone(),
            _ => tables.default_reply(rng),
        }
    }
}

/// Recombining variant: passthrough above `passthrough`, a synthesized
/// mix of the top two responses between `gate` and `passthrough`, default
/// pool below `gate`. Produces replies that are not exact corpus strings.
#[derive(Debug, Clone, Copy)]
pub struct BlendingPolicy {
    passthrough: f32,
    gate: f32,
}

impl BlendingPolicy {
    pub fn new(passthrough: f32, gate: f32) -> Self {
        Self { passthrough, gate }
    }

    fn blend<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredCandidate],
        tables: &ReplyTables,
        rng: &mut R,
    ) -> Option<String> {
        let fragments: Vec<&str> = ranked
            .iter()
            .take(2)
            .flat_map(|candidate| {
                candidate
                    .response
                    .split(|c: char| tables.emoji_delimiters.contains(&c))
            })
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect();
        if fragments.is_empty() {
            return None;
        }

        let sampled: Vec<&str> = fragments
            .choose_multiple(rng, BLEND_MAX_FRAGMENTS.min(fragments.len()))
            .copied()
            .collect();
        let mut reply = sampled.join(" ");
        if let Some(emoji) = tables.blend_emojis.choose(rng) {
            reply.push(' ');
            reply.push_str(emoji);
        }
        Some(reply)
    }
}

impl Default for BlendingPolicy {
    fn default() -> Self {
        Self::new(BLEND_PASSTHROUGH_THRESHOLD, ACCEPTANCE_THRESHOLD)
    }
}

impl ResponsePolicy for BlendingPolicy {
    fn pick<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredCandidate],
        tables: &ReplyTables,
        rng: &mut R,
    ) -> String {
        let top_score = match ranked.first() {
            Some(top) if top.score > self.gate => top.score,
            _ => return tables.default_reply(rng),
        };

        if top_score > self.passthrough {
            return ranked[0].response.clone();
        }

        self.blend(ranked, tables, rng)
            .unwrap_or_else(|| tables.default_reply(rng))
    }
}
