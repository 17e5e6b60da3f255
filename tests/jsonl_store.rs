use std::fs::OpenOptions;
use std::io::Write;

use reply_core::store::{JsonlStore, ReplyStore, StoreBackend, StoreConfig};
use tempfile::tempdir;

#[test]
fn examples_persist_across_reopen() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("store");

    {
        let store = JsonlStore::open(&root).unwrap();
        assert!(store.insert_example_if_absent("hello there", "hi back").unwrap());
        assert!(store.insert_example_if_absent("bye now", "later").unwrap());
        // exact duplicate declines
        assert!(!store.insert_example_if_absent("hello there", "other").unwrap());
    }

    let reopened = JsonlStore::open(&root).unwrap();
    let examples = reopened.load_all_examples().unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].instruction, "hello there");
    assert_eq!(examples[0].response, "hi back");
    // dedup index reloads too
    assert!(!reopened.insert_example_if_absent("bye now", "x").unwrap());
}

#[test]
fn exceptions_are_normalized_and_rewritten_atomically() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("store");

    let store = JsonlStore::open(&root).unwrap();
    assert!(store.upsert_exception("@Foo").unwrap());
    assert!(!store.upsert_exception("foo").unwrap());
    assert_eq!(store.load_all_exceptions().unwrap(), vec!["foo".to_string()]);

    assert!(store.delete_exception("@FOO").unwrap());
    assert!(!store.delete_exception("foo").unwrap());
    assert!(store.load_all_exceptions().unwrap().is_empty());

    // no temp file left behind
    assert!(!root.join("exceptions.json.tmp").exists());
}

#[test]
fn processed_markers_are_write_once_and_durable() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("store");

    {
        let store = JsonlStore::open(&root).unwrap();
        assert!(!store.has_processed("msg-1").unwrap());
        store.mark_processed("msg-1").unwrap();
        store.mark_processed("msg-1").unwrap();
        assert!(store.has_processed("msg-1").unwrap());
    }

    let reopened = JsonlStore::open(&root).unwrap();
    assert!(reopened.has_processed("msg-1").unwrap());
    assert!(!reopened.has_processed("msg-2").unwrap());
}

#[test]
fn malformed_store_lines_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("store");

    {
        let store = JsonlStore::open(&root).unwrap();
        store.insert_example_if_absent("hello there", "hi back").unwrap();
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(root.join("examples.jsonl"))
        .unwrap();
    writeln!(file, "this line is not json").unwrap();

    let store = JsonlStore::open(&root).unwrap();
    let examples = store.load_all_examples().unwrap();
    assert_eq!(examples.len(), 1);
}

#[test]
fn backend_is_selected_by_configuration() {
    let dir = tempdir().unwrap();

    let file_backend = StoreConfig::Jsonl {
        root: dir.path().join("configured"),
    }
    .open()
    .unwrap();
    assert!(matches!(file_backend, StoreBackend::Jsonl(_)));
    assert!(file_backend.insert_example_if_absent("hello there", "hi back").unwrap());
    assert_eq!(file_backend.load_all_examples().unwrap().len(), 1);

    let memory_backend = StoreConfig::Memory.open().unwrap();
    assert!(matches!(memory_backend, StoreBackend::Memory(_)));
    assert!(memory_backend.insert_example_if_absent("hello there", "hi back").unwrap());
}

#[test]
fn missing_files_read_as_an_empty_store() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::open(dir.path().join("fresh")).unwrap();
    assert!(store.load_all_examples().unwrap().is_empty());
    assert!(store.load_all_exceptions().unwrap().is_empty());
    assert!(!store.has_processed("anything").unwrap());
}
