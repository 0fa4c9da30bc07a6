//! Notification subject selection.

use bson::Document;

use crate::record::scalar_text;

pub const DEFAULT_SUBJECT: &str = "Fluent-Notification";

/// SNS rejects subjects longer than this many characters.
pub const MAX_SUBJECT_CHARS: usize = 100;

/// Picks the subject for a record: record field, then configured subject,
/// then [`DEFAULT_SUBJECT`].
#[derive(Debug, Clone)]
pub struct SubjectPolicy {
    key: Option<String>,
    fallback: String,
}

impl SubjectPolicy {
    pub fn new(key: Option<String>, subject: Option<String>) -> Self {
        Self {
            key,
            fallback: subject
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        }
    }

    /// Remove the subject field from `record` and return the subject to use.
    ///
    /// The field is removed even when its value is not usable as a subject,
    /// so it never reaches the payload.
    pub fn take(&self, record: &mut Document) -> String {
        let from_record = self
            .key
            .as_deref()
            .and_then(|key| record.remove(key))
            .and_then(|value| scalar_text(&value))
            .filter(|subject| !subject.is_empty());

        truncate_subject(from_record.unwrap_or_else(|| self.fallback.clone()))
    }
}

fn truncate_subject(mut subject: String) -> String {
    if let Some((index, _)) = subject.char_indices().nth(MAX_SUBJECT_CHARS) {
        tracing::debug!("Truncating subject to {MAX_SUBJECT_CHARS} characters");
        subject.truncate(index);
    }
    subject
}
