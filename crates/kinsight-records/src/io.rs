//! Record file reading, JSONL appends and atomic file writes

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One candidate read from an input file: the parsed value or a parse error
pub type RecordLine = Result<Value, String>;

/// 1-based position of a candidate in its input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    /// Line of a JSON Lines file
    Line(usize),
    /// Element of a top-level JSON array
    Item(usize),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Line(n) => write!(f, "line {n}"),
            Origin::Item(n) => write!(f, "item {n}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputRecord {
    pub origin: Origin,
    pub line: RecordLine,
}

/// Append a JSON record to a JSONL file
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Read candidate conversation records from a file.
///
/// Accepts a single JSON array, a single JSON object, or JSON Lines. Lines
/// that fail to parse are kept as errors so a batch can report them per item.
pub fn read_records(path: &Path) -> std::io::Result<Vec<InputRecord>> {
    let content = std::fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let lines = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(n, item)| InputRecord {
                    origin: Origin::Item(n + 1),
                    line: Ok(item),
                })
                .collect(),
            Ok(other) => vec![InputRecord {
                origin: Origin::Line(1),
                line: Ok(other),
            }],
            Err(e) => vec![InputRecord {
                origin: Origin::Line(e.line()),
                line: Err(format!("invalid JSON array: {e}")),
            }],
        };
        return Ok(lines);
    }

    // A pretty-printed single object spans several lines
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&content) {
        return Ok(vec![InputRecord {
            origin: Origin::Line(1),
            line: Ok(value),
        }]);
    }

    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| InputRecord {
            origin: Origin::Line(n + 1),
            line: serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}")),
        })
        .collect())
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}
