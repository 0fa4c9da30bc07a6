//! Unit tests for the chunk codec.

use bson::{doc, Bson};
use tempfile::TempDir;

use crate::{Chunk, Entry, Error};

fn sample_chunk() -> Chunk {
    vec![
        Entry::new("app.access", 1_700_000_000, doc! { "path": "/", "status": 200 }),
        Entry::new("app.error", 1_700_000_001, doc! { "message": "boom" }),
        Entry::new("app.access", 1_700_000_002, doc! {}),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_decode_preserves_entry_order() {
    let chunk = sample_chunk();
    let bytes = chunk.encode().unwrap();

    let decoded = Chunk::decode(&bytes).unwrap();

    let tags: Vec<&str> = decoded.entries().iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["app.access", "app.error", "app.access"]);
    assert_eq!(decoded.entries()[1].time, 1_700_000_001);
    assert_eq!(decoded.entries()[0].record.get_i32("status").unwrap(), 200);
}

#[test]
fn test_decode_empty_input() {
    let decoded = Chunk::decode(&[]).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_decode_accepts_int32_time() {
    let raw = doc! { "tag": "t", "time": 42_i32, "record": { "a": 1 } };
    let bytes = bson::to_vec(&raw).unwrap();

    let decoded = Chunk::decode(&bytes).unwrap();
    assert_eq!(decoded.entries()[0].time, 42);
}

#[test]
fn test_decode_replaces_invalid_utf8() {
    let chunk: Chunk = vec![Entry::new("app", 1, doc! { "msg": "ZZ" })]
        .into_iter()
        .collect();
    let mut bytes = chunk.encode().unwrap();

    let pos = bytes.windows(2).position(|w| w == b"ZZ").unwrap();
    bytes[pos] = 0xFF;

    let decoded = Chunk::decode(&bytes).unwrap();
    let msg = decoded.entries()[0].record.get_str("msg").unwrap();
    assert_eq!(msg, "\u{FFFD}Z");
}

#[test]
fn test_decode_truncated_trailing_document() {
    let bytes = sample_chunk().encode().unwrap();
    let cut = &bytes[..bytes.len() - 3];

    match Chunk::decode(cut) {
        Err(Error::Truncated { offset, .. }) => assert!(offset > 0),
        other => panic!("expected truncation error, got {other:?}"),
    }
}

#[test]
fn test_decode_short_length_prefix() {
    let mut bytes = sample_chunk().encode().unwrap();
    bytes.extend_from_slice(&[1, 0]);

    assert!(matches!(
        Chunk::decode(&bytes),
        Err(Error::Truncated { needed: 4, available: 2, .. })
    ));
}

#[test]
fn test_decode_rejects_negative_length() {
    let bytes = (-1_i32).to_le_bytes();

    assert!(matches!(
        Chunk::decode(&bytes),
        Err(Error::InvalidLength { offset: 0, length: -1 })
    ));
}

#[test]
fn test_decode_rejects_document_without_tag() {
    let raw = doc! { "time": 1_i64, "record": {} };
    let bytes = bson::to_vec(&raw).unwrap();

    assert!(matches!(
        Chunk::decode(&bytes),
        Err(Error::Decode { offset: 0, .. })
    ));
}

#[test]
fn test_nested_record_values_survive() {
    let record = doc! {
        "user": { "id": 7_i64, "roles": ["admin", "ops"] },
        "ratio": 0.5,
        "flag": Bson::Null,
    };
    let chunk: Chunk = vec![Entry::new("nested", 5, record.clone())].into_iter().collect();

    let decoded = Chunk::decode(&chunk.encode().unwrap()).unwrap();
    assert_eq!(decoded.entries()[0].record, record);
}

#[test]
fn test_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("buffer.chunk");

    let chunk = sample_chunk();
    chunk.write_to(&path).unwrap();
    let loaded = Chunk::read_from(&path).unwrap();

    assert_eq!(loaded, chunk);
}

#[test]
fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.chunk");

    match Chunk::read_from(&path) {
        Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected IO error, got {other:?}"),
    }
}
