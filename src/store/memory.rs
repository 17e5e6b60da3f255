use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{ReplyStore, StoreError};
use crate::corpus::TrainingExample;
use crate::text;

#[derive(Debug, Default)]
struct Inner {
    examples: Vec<TrainingExample>,
    instructions: HashSet<String>,
    exceptions: BTreeMap<String, DateTime<Utc>>,
    processed: BTreeMap<String, DateTime<Utc>>,
}

/// Volatile store for tests and for hosting processes that keep their
/// corpus purely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map contents are still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReplyStore for MemoryStore {
    fn load_all_examples(&self) -> Result<Vec<TrainingExample>, StoreError> {
        Ok(self.lock().examples.clone())
    }

    fn insert_example_if_absent(
        &self,
        instruction: &str,
        response: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if inner.instructions.contains(instruction) {
            return Ok(false);
        }
        inner.instructions.insert(instruction.to_string());
        inner
            .examples
            .push(TrainingExample::new(instruction, response));
        Ok(true)
    }

    fn load_all_exceptions(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().exceptions.keys().cloned().collect())
    }

    fn upsert_exception(&self, username: &str) -> Result<bool, StoreError> {
        let normalized = text::normalize_username(username);
        let mut inner = self.lock();
        if inner.exceptions.contains_key(&normalized) {
            return Ok(false);
        }
        inner.exceptions.insert(normalized, Utc::now());
        Ok(true)
    }

    fn delete_exception(&self, username: &str) -> Result<bool, StoreError> {
        let normalized = text::normalize_username(username);
        Ok(self.lock().exceptions.remove(&normalized).is_some())
    }

    fn has_processed(&self, message_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock().processed.contains_key(message_id))
    }

    fn mark_processed(&self, message_id: &str) -> Result<(), StoreError> {
        self.lock()
            .processed
            .entry(message_id.to_string())
            .or_insert_with(Utc::now);
        Ok(())
    }
}
