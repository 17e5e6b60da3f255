pub mod jsonl;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

use crate::corpus::TrainingExample;
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The persistence operations the engine needs. Implementations are
/// consistent within a single process; the engine never cares which
/// backend is active.
pub trait ReplyStore {
    fn load_all_examples(&self) -> Result<Vec<TrainingExample>, StoreError>;

    /// Insert unless an example with the exact same `instruction` string
    /// already exists (case-sensitive). Returns whether it was inserted.
    fn insert_example_if_absent(&self, instruction: &str, response: &str)
        -> Result<bool, StoreError>;

    fn load_all_exceptions(&self) -> Result<Vec<String>, StoreError>;

    /// Add a username to the exception list. Returns false when the
    /// normalized name is already present.
    fn upsert_exception(&self, username: &str) -> Result<bool, StoreError>;

    /// Remove a username from the exception list. Returns false when the
    /// normalized name was not present.
    fn delete_exception(&self, username: &str) -> Result<bool, StoreError>;

    fn has_processed(&self, message_id: &str) -> Result<bool, StoreError>;

    /// Record that a message id has been answered or deliberately
    /// suppressed. Write-once; marking an already-marked id is a no-op.
    fn mark_processed(&self, message_id: &str) -> Result<(), StoreError>;
}

/// Backend selection, decided once at startup from configuration. No
/// runtime probing: a misconfigured backend fails at `open`, not mid-flight.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Durable local structured files under the given directory.
    Jsonl { root: PathBuf },
    /// Volatile in-process store.
    Memory,
}

impl StoreConfig {
    pub fn open(&self) -> Result<StoreBackend, StoreError> {
        match self {
            StoreConfig::Jsonl { root } => Ok(StoreBackend::Jsonl(JsonlStore::open(root)?)),
            StoreConfig::Memory => Ok(StoreBackend::Memory(MemoryStore::new())),
        }
    }
}

/// A configuration-selected store, dispatching to the chosen backend.
#[derive(Debug)]
pub enum StoreBackend {
    Jsonl(JsonlStore),
    Memory(MemoryStore),
}

impl ReplyStore for StoreBackend {
    fn load_all_examples(&self) -> Result<Vec<TrainingExample>, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.load_all_examples(),
            StoreBackend::Memory(store) => store.load_all_examples(),
        }
    }

    fn insert_example_if_absent(
        &self,
        instruction: &str,
        response: &str,
    ) -> Result<bool, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.insert_example_if_absent(instruction, response),
            StoreBackend::Memory(store) => store.insert_example_if_absent(instruction, response),
        }
    }

    fn load_all_exceptions(&self) -> Result<Vec<String>, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.load_all_exceptions(),
            StoreBackend::Memory(store) => store.load_all_exceptions(),
        }
    }

    fn upsert_exception(&self, username: &str) -> Result<bool, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.upsert_exception(username),
            StoreBackend::Memory(store) => store.upsert_exception(username),
        }
    }

    fn delete_exception(&self, username: &str) -> Result<bool, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.delete_exception(username),
            StoreBackend::Memory(store) => store.delete_exception(username),
        }
    }

    fn has_processed(&self, message_id: &str) -> Result<bool, StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.has_processed(message_id),
            StoreBackend::Memory(store) => store.has_processed(message_id),
        }
    }

    fn mark_processed(&self, message_id: &str) -> Result<(), StoreError> {
        match self {
            StoreBackend::Jsonl(store) => store.mark_processed(message_id),
            StoreBackend::Memory(store) => store.mark_processed(message_id),
        }
    }
}
