use std::sync::{Arc, RwLock};

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::corpus::{self, CorpusSnapshot, ExceptionSet};
use crate::policy::{PassthroughPolicy, ReplyTables, ResponsePolicy};
use crate::ranking::{self, DEFAULT_TOP_N};
use crate::scoring::WeightedScorer;
use crate::store::{ReplyStore, StoreError};
use crate::text::{self, NormalizedText};
use crate::types::{
    AdminOutcome, EngineStats, EvaluateRequest, EvaluateResponse, ImportSummary, ReplyPayload,
    WebhookEvent, WebhookOutcome,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Engine-level knobs that are not scoring weights or canned content.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub top_n: usize,
    pub tables: ReplyTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            tables: ReplyTables::default(),
        }
    }
}

/// The reply selection engine: scoring pipeline plus the gating around it.
///
/// Holds immutable corpus and exception-list snapshots behind `RwLock`,
/// swapped wholesale after every administrative mutation. Scoring calls
/// clone the `Arc` and finish against whichever snapshot they started
/// with; a failed reload keeps the last good snapshot.
pub struct ReplyEngine<S, P> {
    store: S,
    scorer: WeightedScorer,
    policy: P,
    tables: ReplyTables,
    top_n: usize,
    corpus: RwLock<Arc<CorpusSnapshot>>,
    exceptions: RwLock<Arc<ExceptionSet>>,
}

impl<S: ReplyStore> ReplyEngine<S, PassthroughPolicy> {
    /// Engine with the default policy (best-match passthrough above 0.3)
    /// and default weights and tables.
    pub fn with_defaults(store: S) -> Result<Self, EngineError> {
        Self::new(
            store,
            WeightedScorer::default(),
            PassthroughPolicy::default(),
            EngineConfig::default(),
        )
    }
}

impl<S, P> ReplyEngine<S, P>
where
    S: ReplyStore,
    P: ResponsePolicy,
{
    pub fn new(
        store: S,
        scorer: WeightedScorer,
        policy: P,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let corpus = Arc::new(CorpusSnapshot::from_examples(store.load_all_examples()?));
        let exceptions = Arc::new(ExceptionSet::from_usernames(store.load_all_exceptions()?));
        info!(
            examples = corpus.len(),
            exceptions = exceptions.len(),
            fingerprint = corpus.fingerprint(),
            "loaded engine snapshots"
        );

        Ok(Self {
            store,
            scorer,
            policy,
            tables: config.tables,
            top_n: config.top_n,
            corpus: RwLock::new(corpus),
            exceptions: RwLock::new(exceptions),
        })
    }

    pub fn corpus_snapshot(&self) -> Arc<CorpusSnapshot> {
        Arc::clone(&read_lock(&self.corpus))
    }

    pub fn exception_snapshot(&self) -> Arc<ExceptionSet> {
        Arc::clone(&read_lock(&self.exceptions))
    }

    /// Exception gate: is this sender on the opt-out list?
    pub fn is_excepted(&self, username: &str) -> bool {
        self.exception_snapshot().contains(username)
    }

    /// The test/evaluate operation. Suppression for excepted senders is a
    /// distinct signal (`reply_text: None`), never an empty string.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        request: &EvaluateRequest,
        rng: &mut R,
    ) -> EvaluateResponse {
        if let Some(username) = request.username.as_deref() {
            if self.is_excepted(username) {
                return EvaluateResponse {
                    message: request.message.clone(),
                    reply_text: None,
                    excepted: true,
                };
            }
        }

        let reply = self.compose_reply(
            &request.message,
            request.media_type.as_deref(),
            request.is_group,
            request.username.as_deref(),
            rng,
        );
        EvaluateResponse {
            message: request.message.clone(),
            reply_text: Some(reply),
            excepted: false,
        }
    }

    /// The ingest webhook operation: idempotency gate, then exception
    /// gate, then reply composition. The message id is marked processed
    /// once a decision (reply or suppression) is final, so a retried
    /// delivery never produces a second reply.
    ///
    /// Store failures on this path fail open: the gates degrade rather
    /// than dropping the message, and a failed marker write means a
    /// retry could be answered again.
    pub fn handle_webhook<R: Rng + ?Sized>(
        &self,
        event: &WebhookEvent,
        rng: &mut R,
    ) -> WebhookOutcome {
        let processed = self
            .store
            .has_processed(&event.message_id)
            .unwrap_or_else(|e| {
                warn!(message_id = %event.message_id, error = %e, "idempotency check failed, treating as unprocessed");
                false
            });
        if processed {
            return WebhookOutcome::AlreadyProcessed;
        }

        let sender = event.sender_username.as_deref().unwrap_or("");
        if self.is_excepted(sender) {
            self.finalize(&event.message_id);
            return WebhookOutcome::Excepted;
        }

        let reply = self.compose_reply(
            &event.text,
            event.media_type.as_deref(),
            event.is_group_thread,
            event.sender_username.as_deref(),
            rng,
        );
        self.finalize(&event.message_id);

        WebhookOutcome::Reply(ReplyPayload {
            recipient_id: event.sender_id.clone(),
            reply_text: reply,
            reply_to_message_id: event.message_id.clone(),
        })
    }

    fn finalize(&self, message_id: &str) {
        if let Err(e) = self.store.mark_processed(message_id) {
            warn!(message_id = %message_id, error = %e, "failed to mark message processed");
        }
    }

    /// Decide the reply text for a non-gated message: media short-circuit,
    /// empty-message canned reply, otherwise rank and let the policy pick.
    /// The group-mention prefix applies last, whichever branch produced
    /// the text.
    fn compose_reply<R: Rng + ?Sized>(
        &self,
        message: &str,
        media_type: Option<&str>,
        is_group: bool,
        username: Option<&str>,
        rng: &mut R,
    ) -> String {
        let reply = if let Some(media) = media_type {
            self.tables.media_reply(media, rng)
        } else {
            let incoming = NormalizedText::new(message);
            if incoming.is_blank() {
                self.tables.empty_message_reply.clone()
            } else {
                let corpus = self.corpus_snapshot();
                let ranked = ranking::rank(&self.scorer, &incoming, &corpus, self.top_n);
                self.policy.pick(&ranked, &self.tables, rng)
            }
        };

        // The mention keeps the sender's casing; only membership checks
        // lowercase.
        match username.map(text::strip_handle) {
            Some(name) if is_group && !name.is_empty() => format!("@{name} {reply}"),
            _ => reply,
        }
    }

    /// Add one training example. Declines blank fields and exact
    /// duplicate instructions; a successful insert reloads the corpus
    /// snapshot before returning.
    pub fn add_example(
        &self,
        instruction: &str,
        response: &str,
    ) -> Result<AdminOutcome, EngineError> {
        let instruction = instruction.trim();
        let response = response.trim();
        if instruction.is_empty() || response.is_empty() {
            return Ok(AdminOutcome::declined("instruction and response are required"));
        }

        if !self.store.insert_example_if_absent(instruction, response)? {
            return Ok(AdminOutcome::declined(
                "an example with this instruction already exists",
            ));
        }
        self.reload_corpus()?;
        Ok(AdminOutcome::Applied)
    }

    /// Bulk import of newline-delimited JSON examples. Malformed lines
    /// are counted and skipped; duplicates decline silently into the
    /// summary; the corpus snapshot reloads once at the end.
    pub fn bulk_import(&self, content: &str) -> Result<ImportSummary, EngineError> {
        let parsed = corpus::parse_jsonl(content);

        let mut summary = ImportSummary {
            errors: parsed.malformed,
            ..ImportSummary::default()
        };
        for example in &parsed.examples {
            if self
                .store
                .insert_example_if_absent(&example.instruction, &example.response)?
            {
                summary.added += 1;
            } else {
                summary.duplicates += 1;
            }
        }

        self.reload_corpus()?;
        summary.total = self.corpus_snapshot().len();
        info!(
            added = summary.added,
            duplicates = summary.duplicates,
            errors = summary.errors,
            total = summary.total,
            "bulk import finished"
        );
        Ok(summary)
    }

    pub fn add_exception(&self, username: &str) -> Result<AdminOutcome, EngineError> {
        let normalized = text::normalize_username(username);
        if normalized.is_empty() {
            return Ok(AdminOutcome::declined("username is required"));
        }

        if !self.store.upsert_exception(&normalized)? {
            return Ok(AdminOutcome::declined("user already in exception list"));
        }
        self.reload_exceptions()?;
        Ok(AdminOutcome::Applied)
    }

    pub fn remove_exception(&self, username: &str) -> Result<AdminOutcome, EngineError> {
        let normalized = text::normalize_username(username);
        if normalized.is_empty() {
            return Ok(AdminOutcome::declined("username is required"));
        }

        if !self.store.delete_exception(&normalized)? {
            return Ok(AdminOutcome::declined("user not in exception list"));
        }
        self.reload_exceptions()?;
        Ok(AdminOutcome::Applied)
    }

    pub fn exceptions(&self) -> Vec<String> {
        self.exception_snapshot()
            .iter()
            .map(str::to_string)
            .collect()
    }

    pub fn stats(&self) -> EngineStats {
        let corpus = self.corpus_snapshot();
        EngineStats {
            training_examples: corpus.len(),
            exceptions: self.exception_snapshot().len(),
            corpus_fingerprint: corpus.fingerprint().to_string(),
        }
    }

    /// Rebuild both snapshots from the store.
    pub fn reload(&self) -> Result<(), EngineError> {
        self.reload_corpus()?;
        self.reload_exceptions()
    }

    fn reload_corpus(&self) -> Result<(), EngineError> {
        match self.store.load_all_examples() {
            Ok(examples) => {
                let snapshot = Arc::new(CorpusSnapshot::from_examples(examples));
                info!(
                    examples = snapshot.len(),
                    fingerprint = snapshot.fingerprint(),
                    "corpus snapshot reloaded"
                );
                *write_lock(&self.corpus) = snapshot;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "corpus reload failed, keeping last good snapshot");
                Err(e.into())
            }
        }
    }

    fn reload_exceptions(&self) -> Result<(), EngineError> {
        match self.store.load_all_exceptions() {
            Ok(usernames) => {
                let snapshot = Arc::new(ExceptionSet::from_usernames(usernames));
                info!(exceptions = snapshot.len(), "exception snapshot reloaded");
                *write_lock(&self.exceptions) = snapshot;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "exception reload failed, keeping last good snapshot");
                Err(e.into())
            }
        }
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
