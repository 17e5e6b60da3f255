//! Similarity-matched auto-reply engine for chat messages.
//!
//! `reply-core` answers an incoming message with a stored response chosen
//! by approximate textual similarity against a corpus of
//! `(instruction, response)` examples: fuzzy character matching, keyword
//! overlap, threshold-gated selection, canned fallbacks. Replies are gated
//! by a per-user exception list and by message-id idempotency, so a listed
//! sender is never answered and a redelivered message is never answered
//! twice.
//!
//! The crate is transport-agnostic: an HTTP layer or polling connector
//! binds to the payload types in [`types::api`] and drives an
//! [`engine::ReplyEngine`].

pub mod corpus;
pub mod engine;
pub mod policy;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod text;
pub mod types;
