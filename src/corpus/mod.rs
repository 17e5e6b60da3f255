pub mod example;
pub mod import;

pub use example::{CorpusEntry, CorpusSnapshot, ExceptionSet, TrainingExample};
pub use import::{parse_jsonl, ParsedImport};
