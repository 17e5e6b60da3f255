use std::collections::BTreeSet;

/// Stop words dropped during keyword extraction. Fixed at build time;
/// changing the list changes keyword Jaccard scores across the corpus.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "have", "has",
    "had", "do", "does", "did", "will", "would",
];

/// Lowercase, trim, and collapse internal whitespace runs to one space.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Tokenize normalized text into a keyword set.
///
/// Tokens are maximal runs of alphanumerics and underscore. Tokens of
/// length <= 2 and entries of [`STOP_WORDS`] are discarded. Empty input
/// yields the empty set.
pub fn extract_keywords(normalized: &str) -> BTreeSet<String> {
    normalized
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| token.chars().count() > 2)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Canonical form of a username for exception-list membership: lowercased,
/// trimmed, one leading `@` stripped. Idempotent, so `"@Foo"`, `"foo"`,
/// and `" @FOO "` all collapse to `"foo"`.
pub fn normalize_username(name: &str) -> String {
    strip_handle(name).to_lowercase()
}

/// Trim and strip one leading `@`, preserving case. Used for the
/// group-mention prefix, where the sender's casing is kept.
pub fn strip_handle(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}

/// A message (or stored instruction) carried together with its normalized
/// form and keyword set, computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub raw: String,
    pub normalized: String,
    pub keywords: BTreeSet<String>,
}

impl NormalizedText {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        let keywords = extract_keywords(&normalized);

        Self {
            raw,
            normalized,
            keywords,
        }
    }

    /// True when the normalized text contains no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }
}
