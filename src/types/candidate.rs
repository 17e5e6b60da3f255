use serde::Serialize;

use crate::scoring::ScoreBreakdown;

/// One corpus entry scored against an incoming message. Derived per call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub instruction: String,
    pub response: String,
    pub score: f32,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}
