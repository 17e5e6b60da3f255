use std::collections::{BTreeMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ReplyStore, StoreError};
use crate::corpus::TrainingExample;
use crate::text;

const EXAMPLES_FILE: &str = "examples.jsonl";
const EXCEPTIONS_FILE: &str = "exceptions.json";
const PROCESSED_FILE: &str = "processed.jsonl";

#[derive(Debug, Serialize, Deserialize)]
struct ExampleRecord {
    instruction: String,
    response: String,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExceptionRecord {
    username: String,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProcessedRecord {
    message_id: String,
    processed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct JsonlState {
    instructions: HashSet<String>,
    exceptions: BTreeMap<String, DateTime<Utc>>,
    processed: HashSet<String>,
}

/// Durable local-file backend. Examples and processed markers are
/// append-only newline-delimited JSON; the exception list is a small JSON
/// document rewritten atomically (temp file + rename) on every change.
#[derive(Debug)]
pub struct JsonlStore {
    root: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlStore {
    /// Open (or initialize) a store rooted at `root`, loading the dedup
    /// indexes into memory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut state = JsonlState::default();

        for record in read_jsonl::<ExampleRecord>(&root.join(EXAMPLES_FILE))? {
            state.instructions.insert(record.instruction);
        }
        for record in read_exceptions(&root.join(EXCEPTIONS_FILE))? {
            state.exceptions.insert(record.username, record.added_at);
        }
        for record in read_jsonl::<ProcessedRecord>(&root.join(PROCESSED_FILE))? {
            state.processed.insert(record.message_id);
        }

        Ok(Self {
            root,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JsonlState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn append_record<T: Serialize>(&self, file: &str, record: &T) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(file))?;
        f.write_all(line.as_bytes())?;
        f.sync_all()?;
        Ok(())
    }

    /// Write the full exception list to a temp path, then rename over the
    /// live file so readers never observe a partial write.
    fn rewrite_exceptions(&self, state: &JsonlState) -> Result<(), StoreError> {
        let records: Vec<ExceptionRecord> = state
            .exceptions
            .iter()
            .map(|(username, added_at)| ExceptionRecord {
                username: username.clone(),
                added_at: *added_at,
            })
            .collect();

        let path = self.root.join(EXCEPTIONS_FILE);
        let temp_path = path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&temp_path)?;
            serde_json::to_writer_pretty(&f, &records)?;
            f.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

impl ReplyStore for JsonlStore {
    fn load_all_examples(&self) -> Result<Vec<TrainingExample>, StoreError> {
        let records = read_jsonl::<ExampleRecord>(&self.root.join(EXAMPLES_FILE))?;
        Ok(records
            .into_iter()
            .map(|r| TrainingExample::new(r.instruction, r.response))
            .collect())
    }

    fn insert_example_if_absent(
        &self,
        instruction: &str,
        response: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if state.instructions.contains(instruction) {
            return Ok(false);
        }
        self.append_record(
            EXAMPLES_FILE,
            &ExampleRecord {
                instruction: instruction.to_string(),
                response: response.to_string(),
                added_at: Utc::now(),
            },
        )?;
        state.instructions.insert(instruction.to_string());
        Ok(true)
    }

    fn load_all_exceptions(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().exceptions.keys().cloned().collect())
    }

    fn upsert_exception(&self, username: &str) -> Result<bool, StoreError> {
        let normalized = text::normalize_username(username);
        let mut state = self.lock();
        if state.exceptions.contains_key(&normalized) {
            return Ok(false);
        }
        state.exceptions.insert(normalized, Utc::now());
        self.rewrite_exceptions(&state)?;
        Ok(true)
    }

    fn delete_exception(&self, username: &str) -> Result<bool, StoreError> {
        let normalized = text::normalize_username(username);
        let mut state = self.lock();
        if state.exceptions.remove(&normalized).is_none() {
            return Ok(false);
        }
        self.rewrite_exceptions(&state)?;
        Ok(true)
    }

    fn has_processed(&self, message_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock().processed.contains(message_id))
    }

    fn mark_processed(&self, message_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.processed.contains(message_id) {
            return Ok(());
        }
        self.append_record(
            PROCESSED_FILE,
            &ProcessedRecord {
                message_id: message_id.to_string(),
                processed_at: Utc::now(),
            },
        )?;
        state.processed.insert(message_id.to_string());
        Ok(())
    }
}

/// Read every well-formed record of a newline-delimited JSON file. A
/// missing file is an empty store; malformed lines are skipped with a
/// warning, never fatal.
fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), line = lineno + 1, error = %e, "skipping malformed store line");
            }
        }
    }
    Ok(records)
}

fn read_exceptions(path: &Path) -> Result<Vec<ExceptionRecord>, StoreError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
