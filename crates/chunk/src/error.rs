use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to encode chunk entry for tag '{tag}': {source}")]
    Encode {
        tag: String,
        #[source]
        source: bson::ser::Error,
    },

    #[error("Failed to decode chunk entry at byte offset {offset}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: bson::de::Error,
    },

    #[error("Chunk truncated at byte offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid document length {length} at byte offset {offset}")]
    InvalidLength { offset: usize, length: i64 },

    #[error("IO error on chunk file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
