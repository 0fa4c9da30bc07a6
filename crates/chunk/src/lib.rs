//! Chunk codec for buffered log entries.
//!
//! A chunk is the unit the upstream buffer flushes: an ordered batch of
//! `(tag, time, record)` entries. On disk and on the wire a chunk is zero or
//! more BSON documents written back to back:
//!
//! ```text
//! { tag: string, time: int64 (epoch seconds), record: document }
//! { tag: string, time: int64 (epoch seconds), record: document }
//! ...
//! ```
//!
//! BSON documents carry their own little-endian length prefix, so no extra
//! framing is needed. Decoding replaces invalid UTF-8 inside strings with
//! U+FFFD instead of rejecting the whole chunk.
//!
//! # Example
//!
//! ```rust
//! use bson::doc;
//! use fluent_chunk::{Chunk, Entry};
//!
//! let mut chunk = Chunk::new();
//! chunk.push(Entry::new("app.access", 1_700_000_000, doc! { "path": "/" }));
//!
//! let bytes = chunk.encode().unwrap();
//! let decoded = Chunk::decode(&bytes).unwrap();
//! assert_eq!(decoded.entries()[0].tag, "app.access");
//! ```

mod error;

#[cfg(test)]
mod tests;

use bson::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{Error, Result};

/// Smallest valid BSON document: length prefix plus the trailing NUL.
const MIN_DOCUMENT_LEN: usize = 5;

/// A single buffered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Event tag assigned by the upstream pipeline
    pub tag: String,
    /// Event time in epoch seconds
    pub time: i64,
    /// Structured payload
    pub record: Document,
}

impl Entry {
    pub fn new(tag: impl Into<String>, time: i64, record: Document) -> Self {
        Self {
            tag: tag.into(),
            time,
            record,
        }
    }
}

/// An ordered batch of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    entries: Vec<Entry>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry as a BSON document and concatenate them.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for entry in &self.entries {
            let bytes = bson::to_vec(entry).map_err(|source| Error::Encode {
                tag: entry.tag.clone(),
                source,
            })?;
            buf.extend_from_slice(&bytes);
        }
        Ok(buf)
    }

    /// Decode a concatenation of BSON documents into entries, preserving order.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            if remaining.len() < 4 {
                return Err(Error::Truncated {
                    offset,
                    needed: 4,
                    available: remaining.len(),
                });
            }

            let length = i32::from_le_bytes([remaining[0], remaining[1], remaining[2], remaining[3]]);
            let len = usize::try_from(length)
                .ok()
                .filter(|len| *len >= MIN_DOCUMENT_LEN)
                .ok_or(Error::InvalidLength {
                    offset,
                    length: i64::from(length),
                })?;

            if len > remaining.len() {
                return Err(Error::Truncated {
                    offset,
                    needed: len,
                    available: remaining.len(),
                });
            }

            let entry: Entry = bson::from_slice_utf8_lossy(&remaining[..len])
                .map_err(|source| Error::Decode { offset, source })?;
            entries.push(entry);
            offset += len;
        }

        tracing::trace!("Decoded {} entries from {} bytes", entries.len(), bytes.len());
        Ok(Self { entries })
    }

    /// Read and decode a chunk file.
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Encode and write this chunk to a file, replacing any existing content.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.encode()?;
        std::fs::write(path, bytes).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl FromIterator<Entry> for Chunk {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Chunk {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
