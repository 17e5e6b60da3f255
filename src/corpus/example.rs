use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::text::{self, NormalizedText};

/// The atomic unit of the corpus. Immutable once stored; corpus identity
/// is the exact `instruction` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub instruction: String,
    pub response: String,
}

impl TrainingExample {
    pub fn new(instruction: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            response: response.into(),
        }
    }
}

/// One corpus entry with its normalization precomputed, so ranking never
/// re-tokenizes instructions per incoming message.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub example: TrainingExample,
    pub normalized: NormalizedText,
}

/// An immutable scoring snapshot of the corpus, replaced wholesale on
/// reload. The fingerprint identifies the exact contents in order, so two
/// snapshots compare equal iff their fingerprints do.
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    entries: Vec<CorpusEntry>,
    fingerprint: String,
}

impl CorpusSnapshot {
    pub fn from_examples(examples: Vec<TrainingExample>) -> Self {
        let mut hasher = Sha256::new();
        for example in &examples {
            hasher.update(example.instruction.as_bytes());
            hasher.update([0u8]);
            hasher.update(example.response.as_bytes());
            hasher.update([b'\n']);
        }
        let fingerprint = format!("sha256:{}", hex::encode(hasher.finalize()));

        let entries = examples
            .into_iter()
            .map(|example| {
                let normalized = NormalizedText::new(example.instruction.clone());
                CorpusEntry {
                    example,
                    normalized,
                }
            })
            .collect();

        Self {
            entries,
            fingerprint,
        }
    }

    pub fn empty() -> Self {
        Self::from_examples(Vec::new())
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Normalized usernames whose messages are never answered. Built from the
/// raw persisted list; normalization at both build and lookup time makes
/// membership insensitive to case and a leading `@`.
#[derive(Debug, Clone, Default)]
pub struct ExceptionSet {
    members: std::collections::BTreeSet<String>,
}

impl ExceptionSet {
    pub fn from_usernames<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members = usernames
            .into_iter()
            .map(|u| text::normalize_username(u.as_ref()))
            .filter(|u| !u.is_empty())
            .collect();
        Self { members }
    }

    pub fn contains(&self, username: &str) -> bool {
        let normalized = text::normalize_username(username);
        !normalized.is_empty() && self.members.contains(&normalized)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}
