//! Delivery of chunk files from disk.

use anyhow::{Context, Result};
use fluent_chunk::Chunk;
use sns_output::RecordPublisher;
use sns_service::TopicService;
use std::path::{Path, PathBuf};
use tracing::info;

/// Totals across all delivered chunk files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    pub chunks: usize,
    pub published: usize,
    pub dropped: usize,
}

/// Expand `paths` into chunk files: files are kept as given, directories are
/// replaced by their regular files (non-recursive) sorted by name.
pub async fn chunk_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        if metadata.is_dir() {
            files.extend(list_directory(path).await?);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

async fn list_directory(path: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        let metadata = entry
            .metadata()
            .await
            .with_context(|| format!("Failed to get metadata for: {}", entry_path.display()))?;

        if metadata.is_file() {
            results.push(entry_path);
        }
    }

    // Sort for consistent ordering
    results.sort();
    Ok(results)
}

/// Deliver chunk files in order, stopping at the first chunk that fails.
pub async fn deliver_files<S>(
    publisher: &RecordPublisher<S>,
    files: &[PathBuf],
) -> Result<DeliverySummary>
where
    S: TopicService + ?Sized,
{
    let mut summary = DeliverySummary::default();

    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read chunk file: {}", path.display()))?;
        let chunk = Chunk::decode(&bytes)
            .with_context(|| format!("Failed to decode chunk file: {}", path.display()))?;
        let entries = chunk.len();

        let report = publisher
            .deliver(chunk)
            .await
            .with_context(|| format!("Failed to deliver chunk file: {}", path.display()))?;

        info!(
            "Delivered {}: {entries} entries, {} published, {} dropped",
            path.display(),
            report.published,
            report.dropped.len()
        );

        summary.chunks += 1;
        summary.published += report.published;
        summary.dropped += report.dropped.len();
    }

    Ok(summary)
}
