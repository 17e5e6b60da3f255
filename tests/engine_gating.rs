use rand::rngs::StdRng;
use rand::SeedableRng;
use reply_core::engine::ReplyEngine;
use reply_core::policy::PassthroughPolicy;
use reply_core::store::MemoryStore;
use reply_core::types::{EvaluateRequest, WebhookEvent, WebhookOutcome};

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn engine() -> ReplyEngine<MemoryStore, PassthroughPolicy> {
    ReplyEngine::with_defaults(MemoryStore::new()).expect("engine construction")
}

fn event(message_id: &str, text: &str, username: &str) -> WebhookEvent {
    WebhookEvent {
        message_id: message_id.to_string(),
        text: text.to_string(),
        sender_id: "sender-1".to_string(),
        sender_username: Some(username.to_string()),
        is_group_thread: false,
        media_type: None,
    }
}

#[test]
fn exact_match_returns_the_stored_response() {
    let engine = engine();
    assert!(engine.add_example("hello there", "hi back").unwrap().is_applied());

    let request = EvaluateRequest {
        message: "hello there".to_string(),
        ..EvaluateRequest::default()
    };
    let response = engine.evaluate(&request, &mut rng());
    assert!(!response.excepted);
    assert_eq!(response.reply_text.as_deref(), Some("hi back"));
}

#[test]
fn empty_corpus_falls_back_to_the_default_pool() {
    let engine = engine();
    let request = EvaluateRequest {
        message: "anything".to_string(),
        ..EvaluateRequest::default()
    };
    let response = engine.evaluate(&request, &mut rng());
    let reply = response.reply_text.expect("not excepted");
    let tables = reply_core::policy::ReplyTables::default();
    assert!(tables.default_pool.contains(&reply));
}

#[test]
fn empty_message_without_media_gets_the_canned_reply() {
    let engine = engine();
    let tables = reply_core::policy::ReplyTables::default();
    for message in ["", "   ", "\t\n"] {
        let request = EvaluateRequest {
            message: message.to_string(),
            ..EvaluateRequest::default()
        };
        let response = engine.evaluate(&request, &mut rng());
        assert_eq!(response.reply_text.as_deref(), Some(tables.empty_message_reply.as_str()));
    }
}

#[test]
fn media_type_bypasses_ranking() {
    let engine = engine();
    let tables = reply_core::policy::ReplyTables::default();
    let request = EvaluateRequest {
        message: "this text is ignored".to_string(),
        media_type: Some("image".to_string()),
        ..EvaluateRequest::default()
    };
    let reply = engine.evaluate(&request, &mut rng()).reply_text.unwrap();
    assert!(tables.media_replies["image"].contains(&reply));
}

#[test]
fn group_messages_get_the_mention_prefix() {
    let engine = engine();
    engine.add_example("hello there", "hi back").unwrap();

    let request = EvaluateRequest {
        message: "hello there".to_string(),
        username: Some("@Bob".to_string()),
        is_group: true,
        ..EvaluateRequest::default()
    };
    let reply = engine.evaluate(&request, &mut rng()).reply_text.unwrap();
    assert_eq!(reply, "@Bob hi back");
}

#[test]
fn exception_list_collides_case_and_at_prefix() {
    let engine = engine();
    assert!(engine.add_exception("@Foo").unwrap().is_applied());

    for name in ["foo", "Foo", "@foo", " @FOO "] {
        assert!(engine.is_excepted(name), "{name:?} should be excepted");
    }
    assert!(!engine.is_excepted("bar"));

    // idempotent normalization: the variants are the same entry
    assert!(!engine.add_exception("foo").unwrap().is_applied());
    assert_eq!(engine.exceptions(), vec!["foo".to_string()]);
}

#[test]
fn excepted_sender_is_suppressed_not_emptied() {
    let engine = engine();
    engine.add_example("hello there", "hi back").unwrap();
    engine.add_exception("quiet_user").unwrap();

    let request = EvaluateRequest {
        message: "hello there".to_string(),
        username: Some("@Quiet_User".to_string()),
        ..EvaluateRequest::default()
    };
    let response = engine.evaluate(&request, &mut rng());
    assert!(response.excepted);
    assert_eq!(response.reply_text, None);
}

#[test]
fn removing_an_exception_restores_replies() {
    let engine = engine();
    engine.add_exception("bob").unwrap();
    assert!(engine.is_excepted("bob"));

    assert!(engine.remove_exception("@Bob").unwrap().is_applied());
    assert!(!engine.is_excepted("bob"));

    // removing again declines with a reason, not an error
    assert!(!engine.remove_exception("bob").unwrap().is_applied());
}

#[test]
fn webhook_answers_a_message_id_at_most_once() {
    let engine = engine();
    engine.add_example("hello there", "hi back").unwrap();

    let ev = event("msg-1", "hello there", "alice");
    let first = engine.handle_webhook(&ev, &mut rng());
    match first {
        WebhookOutcome::Reply(payload) => {
            assert_eq!(payload.reply_text, "hi back");
            assert_eq!(payload.recipient_id, "sender-1");
            assert_eq!(payload.reply_to_message_id, "msg-1");
        }
        other => panic!("expected a reply, got {other:?}"),
    }

    let second = engine.handle_webhook(&ev, &mut rng());
    assert_eq!(second, WebhookOutcome::AlreadyProcessed);
}

#[test]
fn webhook_suppression_still_consumes_the_message_id() {
    let engine = engine();
    engine.add_exception("alice").unwrap();

    let ev = event("msg-2", "hello there", "@Alice");
    assert_eq!(engine.handle_webhook(&ev, &mut rng()), WebhookOutcome::Excepted);
    // a retried delivery is already processed, not re-suppressed
    assert_eq!(
        engine.handle_webhook(&ev, &mut rng()),
        WebhookOutcome::AlreadyProcessed
    );
}

#[test]
fn duplicate_instruction_declines_with_a_reason() {
    let engine = engine();
    assert!(engine.add_example("hello there", "hi back").unwrap().is_applied());

    let outcome = engine.add_example("hello there", "different reply").unwrap();
    assert!(!outcome.is_applied());

    // the first stored response still wins
    let request = EvaluateRequest {
        message: "hello there".to_string(),
        ..EvaluateRequest::default()
    };
    let reply = engine.evaluate(&request, &mut rng()).reply_text.unwrap();
    assert_eq!(reply, "hi back");
}

#[test]
fn blank_admin_input_declines() {
    let engine = engine();
    assert!(!engine.add_example("  ", "reply").unwrap().is_applied());
    assert!(!engine.add_example("instruction", "").unwrap().is_applied());
    assert!(!engine.add_exception("  @  ").unwrap().is_applied());
}

#[test]
fn stats_track_snapshot_contents_and_fingerprint() {
    let engine = engine();
    let before = engine.stats();
    assert_eq!(before.training_examples, 0);

    engine.add_example("hello there", "hi back").unwrap();
    engine.add_exception("bob").unwrap();

    let after = engine.stats();
    assert_eq!(after.training_examples, 1);
    assert_eq!(after.exceptions, 1);
    assert_ne!(before.corpus_fingerprint, after.corpus_fingerprint);
    assert!(after.corpus_fingerprint.starts_with("sha256:"));
}
