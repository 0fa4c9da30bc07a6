//! JSON lines → chunk conversion.
//!
//! Each non-empty input line is one entry:
//!
//! ```json
//! {"tag": "app.access", "time": 1700000000, "record": {"path": "/"}}
//! ```

use anyhow::{Context, Result};
use fluent_chunk::{Chunk, Entry};
use serde::Deserialize;
use std::io::BufRead;

#[derive(Debug, Deserialize)]
struct JsonEntry {
    tag: String,
    time: i64,
    #[serde(default)]
    record: serde_json::Map<String, serde_json::Value>,
}

/// Read JSON lines from `reader` into a chunk.
pub fn jsonl_to_chunk<R: BufRead>(reader: R) -> Result<Chunk> {
    let mut chunk = Chunk::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: JsonEntry = serde_json::from_str(&line)
            .with_context(|| format!("Invalid entry on line {line_number}"))?;
        let record = bson::to_document(&entry.record)
            .with_context(|| format!("Record on line {line_number} cannot be stored as BSON"))?;

        chunk.push(Entry::new(entry.tag, entry.time, record));
    }

    tracing::debug!("Packed {} entries", chunk.len());
    Ok(chunk)
}
