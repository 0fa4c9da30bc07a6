//! Topic resolution.
//!
//! Maps an event `(tag, record)` to the logical topic name it should be
//! published to. The strategy is fixed at configuration time; resolved names
//! have every `.` rewritten to `-` because SNS does not allow periods in
//! topic names.

use bson::Document;
use regex::Regex;

use crate::record::scalar_text;
use crate::{Config, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicStrategy {
    /// Always the same topic
    Static(String),
    /// Topic name read from a record field
    FieldDriven(String),
    /// Topic name derived from the event tag, with an optional prefix removed
    TagDriven { prefix: TagPrefix },
}

impl TopicStrategy {
    /// Select the strategy from configuration. First match wins:
    /// static name, then record field, then tag.
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(name) = &config.topic_name {
            return Ok(TopicStrategy::Static(name.clone()));
        }
        if let Some(key) = &config.topic_map_key {
            return Ok(TopicStrategy::FieldDriven(key.clone()));
        }
        if config.topic_map_tag {
            return Ok(TopicStrategy::TagDriven {
                prefix: TagPrefix::new(config.remove_tag_prefix.as_deref())?,
            });
        }
        Err(Error::NoTopicStrategy)
    }
}

/// Prefix pattern removed from the start of a tag, together with one `.`
/// right after it.
///
/// The pattern is a regular expression anchored at the start of the tag, so
/// `app\d+` strips `app12.` from `app12.orders`. Without a pattern only a
/// leading `.` is removed.
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: Option<String>,
    regex: Regex,
}

impl TagPrefix {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let expr = format!(r"^(?:{})\.?", pattern.unwrap_or_default());
        let regex = Regex::new(&expr).map_err(|source| Error::InvalidTagPrefix {
            pattern: pattern.unwrap_or_default().to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.map(str::to_string),
            regex,
        })
    }

    /// Remove the first match at the start of `tag`. A tag that does not
    /// start with the prefix is returned unchanged.
    pub fn strip<'a>(&self, tag: &'a str) -> std::borrow::Cow<'a, str> {
        self.regex.replace(tag, "")
    }
}

impl PartialEq for TagPrefix {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for TagPrefix {}

#[derive(Debug, Clone)]
pub struct TopicResolver {
    strategy: TopicStrategy,
}

impl TopicResolver {
    pub fn new(strategy: TopicStrategy) -> Self {
        Self { strategy }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        TopicStrategy::from_config(config).map(Self::new)
    }

    pub fn strategy(&self) -> &TopicStrategy {
        &self.strategy
    }

    /// Resolve and normalize the topic name, `None` if the record has no topic.
    pub fn resolve(&self, tag: &str, record: &Document) -> Option<String> {
        let name = match &self.strategy {
            TopicStrategy::Static(name) => Some(name.clone()),
            TopicStrategy::FieldDriven(key) => record.get(key).and_then(scalar_text),
            TopicStrategy::TagDriven { prefix } => Some(prefix.strip(tag).into_owned()),
        };
        name.map(|name| normalize_topic_name(&name))
    }
}

/// Rewrite every `.` to `-`.
pub fn normalize_topic_name(name: &str) -> String {
    name.replace('.', "-")
}
