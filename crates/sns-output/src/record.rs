//! Record formatting before publish: tag and time key injection.

use bson::{Bson, Document};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::{Config, Error, Result};

/// Matches the `YYYY-MM-DD HH:MM:SS +ZZZZ` rendering of a local timestamp.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone)]
pub struct RecordFormatter {
    time_key: Option<String>,
    time_format: String,
    utc: bool,
    tag_key: Option<String>,
}

impl RecordFormatter {
    pub fn from_config(config: &Config) -> Result<Self> {
        if StrftimeItems::new(&config.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimeFormat(config.time_format.clone()));
        }

        Ok(Self {
            time_key: config.include_time_key.then(|| config.time_key.clone()),
            time_format: config.time_format.clone(),
            utc: config.utc,
            tag_key: config.include_tag_key.then(|| config.tag_key.clone()),
        })
    }

    /// Inject the configured tag and time fields into `record`.
    pub fn format(&self, tag: &str, time: i64, record: &mut Document) {
        if let Some(tag_key) = &self.tag_key {
            record.insert(tag_key.clone(), tag);
        }

        if let Some(time_key) = &self.time_key {
            match self.format_time(time) {
                Some(rendered) => {
                    record.insert(time_key.clone(), rendered);
                }
                None => tracing::warn!("Event time {time} is out of range, not setting '{time_key}'"),
            }
        }
    }

    /// Render epoch seconds with the configured format and zone.
    pub fn format_time(&self, time: i64) -> Option<String> {
        let utc = DateTime::from_timestamp(time, 0)?;
        let rendered = if self.utc {
            utc.format(&self.time_format).to_string()
        } else {
            utc.with_timezone(&Local).format(&self.time_format).to_string()
        };
        Some(rendered)
    }
}

/// Text form of a scalar field value; `None` for null, containers and binary.
pub(crate) fn scalar_text(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(i) => Some(i.to_string()),
        Bson::Int64(i) => Some(i.to_string()),
        Bson::Double(f) => Some(f.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}
