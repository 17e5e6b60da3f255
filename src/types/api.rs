use serde::{Deserialize, Serialize};

/// Payload of the test/evaluate operation. The hosting HTTP layer
/// deserializes the request body straight into this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub message: String,
    /// `None` exactly when the sender is excepted; an engine-produced
    /// reply is never the empty string.
    pub reply_text: Option<String>,
    pub excepted: bool,
}

/// One inbound message delivered by the webhook ingest path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub message_id: String,
    pub text: String,
    pub sender_id: String,
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub is_group_thread: bool,
    #[serde(default)]
    pub media_type: Option<String>,
}

/// Decision for one webhook event. Suppression outcomes are distinct
/// statuses so delivery code never confuses "withheld" with "empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookOutcome {
    AlreadyProcessed,
    Excepted,
    Reply(ReplyPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub recipient_id: String,
    pub reply_text: String,
    pub reply_to_message_id: String,
}

/// Result of an administrative mutation. Duplicates and unknown entries
/// decline with a reason rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdminOutcome {
    Applied,
    Declined { reason: String },
}

impl AdminOutcome {
    pub fn declined(reason: impl Into<String>) -> Self {
        AdminOutcome::Declined {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, AdminOutcome::Applied)
    }
}

/// Bulk-import accounting: accepted lines, exact-duplicate instructions,
/// unparseable lines, and the corpus size after the reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub errors: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub training_examples: usize,
    pub exceptions: usize,
    pub corpus_fingerprint: String,
}
