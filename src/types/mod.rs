pub mod api;
pub mod candidate;

pub use api::{
    AdminOutcome, EngineStats, EvaluateRequest, EvaluateResponse, ImportSummary, ReplyPayload,
    WebhookEvent, WebhookOutcome,
};
pub use candidate::ScoredCandidate;
