use std::collections::{BTreeMap, BTreeSet};

/// Informal-register vocabulary grouped into named categories. Detection
/// is plain substring containment against normalized text, so short
/// markers ("yo", "sup") fire inside longer messages.
#[derive(Debug, Clone, Default)]
pub struct SlangLexicon {
    groups: BTreeMap<String, Vec<String>>,
}

impl SlangLexicon {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self { groups }
    }

    /// A small built-in lexicon covering the categories chat traffic
    /// actually hits: greetings, questions, requests, compliments.
    pub fn builtin() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(
            "greetings".to_string(),
            vec!["hey", "hi", "hello", "sup", "wassup", "yo", "namaste"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        groups.insert(
            "questions".to_string(),
            vec!["wyd", "what", "where", "when", "why", "how", "kya"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        groups.insert(
            "requests".to_string(),
            vec!["send", "give", "show", "share", "dm", "slide"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        groups.insert(
            "compliments".to_string(),
            vec!["cute", "gorgeous", "beautiful", "stunning", "babe"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        Self { groups }
    }

    /// Names of every category with at least one marker present in `text`.
    pub fn categories(&self, text: &str) -> BTreeSet<String> {
        let mut detected = BTreeSet::new();
        for (category, words) in &self.groups {
            if words.iter().any(|w| text.contains(w.as_str())) {
                detected.insert(category.clone());
            }
        }
        detected
    }

    /// True when the two texts share at least one detected category.
    pub fn share_category(&self, a: &str, b: &str) -> bool {
        let cats_a = self.categories(a);
        if cats_a.is_empty() {
            return false;
        }
        self.categories(b).intersection(&cats_a).next().is_some()
    }
}
