use serde::Deserialize;

use super::example::TrainingExample;

/// One line of the newline-delimited import format. Extra keys are
/// tolerated and ignored.
#[derive(Debug, Deserialize)]
struct ImportLine {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    response: String,
}

/// Outcome of parsing one raw import payload: the usable examples plus
/// the count of lines that were skipped as malformed. Blank lines are
/// neither.
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub examples: Vec<TrainingExample>,
    pub malformed: usize,
}

/// Parse a newline-delimited JSON corpus payload. A line is malformed when
/// it is not a JSON object or when `instruction` or `response` is empty
/// after trimming; malformed lines are counted and skipped, never fatal.
pub fn parse_jsonl(content: &str) -> ParsedImport {
    let mut parsed = ParsedImport::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ImportLine>(line) {
            Ok(record) => {
                let instruction = record.instruction.trim();
                let response = record.response.trim();
                if instruction.is_empty() || response.is_empty() {
                    parsed.malformed += 1;
                    continue;
                }
                parsed
                    .examples
                    .push(TrainingExample::new(instruction, response));
            }
            Err(_) => parsed.malformed += 1,
        }
    }

    parsed
}
