use reply_core::corpus::{CorpusSnapshot, TrainingExample};
use reply_core::ranking::{rank, DEFAULT_TOP_N};
use reply_core::scoring::WeightedScorer;
use reply_core::text::NormalizedText;

fn snapshot(pairs: &[(&str, &str)]) -> CorpusSnapshot {
    CorpusSnapshot::from_examples(
        pairs
            .iter()
            .map(|(i, r)| TrainingExample::new(*i, *r))
            .collect(),
    )
}

#[test]
fn ranking_is_descending_and_truncated() {
    let corpus = snapshot(&[
        ("good morning", "morning"),
        ("hello there", "hi back"),
        ("what time is it", "no idea"),
        ("hello friend", "hey"),
        ("see you later", "bye"),
    ]);
    let scorer = WeightedScorer::default();
    let incoming = NormalizedText::new("hello there");

    let ranked = rank(&scorer, &incoming, &corpus, DEFAULT_TOP_N);
    assert_eq!(ranked.len(), DEFAULT_TOP_N);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(ranked[0].instruction, "hello there");
    assert_eq!(ranked[0].response, "hi back");
}

#[test]
fn equal_scores_preserve_corpus_order() {
    // Identical instructions score identically against anything; corpus
    // order must decide.
    let corpus = snapshot(&[
        ("same words", "first"),
        ("same words", "second"),
        ("same words", "third"),
    ]);
    let scorer = WeightedScorer::default();
    let incoming = NormalizedText::new("unrelated message");

    let ranked = rank(&scorer, &incoming, &corpus, 3);
    let responses: Vec<&str> = ranked.iter().map(|c| c.response.as_str()).collect();
    assert_eq!(responses, vec!["first", "second", "third"]);
}

#[test]
fn ranking_handles_empty_corpus_and_short_corpus() {
    let scorer = WeightedScorer::default();
    let incoming = NormalizedText::new("anything");

    assert!(rank(&scorer, &incoming, &CorpusSnapshot::empty(), 3).is_empty());

    let one = snapshot(&[("only entry", "only response")]);
    let ranked = rank(&scorer, &incoming, &one, 3);
    assert_eq!(ranked.len(), 1);
}

#[test]
fn empty_incoming_message_still_scores_everything() {
    let corpus = snapshot(&[("hello there", "hi back"), ("bye now", "later")]);
    let scorer = WeightedScorer::default();
    let incoming = NormalizedText::new("");

    let ranked = rank(&scorer, &incoming, &corpus, 3);
    assert_eq!(ranked.len(), 2);
    for candidate in &ranked {
        assert!(candidate.score >= 0.0);
        assert!(candidate.score <= 0.3 + 0.2, "blank input should score low");
    }
}

#[test]
fn breakdown_explains_the_score() {
    let corpus = snapshot(&[("hello there", "hi back")]);
    let scorer = WeightedScorer::default();
    let incoming = NormalizedText::new("hello there");

    let ranked = rank(&scorer, &incoming, &corpus, 1);
    let top = &ranked[0];
    assert_eq!(top.breakdown.fuzzy_ratio, 1.0);
    assert_eq!(top.breakdown.keyword_jaccard, 1.0);
    assert_eq!(top.breakdown.substring_bonus, 0.3);
    assert!((top.score - 1.2).abs() < 1e-6);
}
