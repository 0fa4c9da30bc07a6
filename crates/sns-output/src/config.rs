//! Output configuration.

use clap::{ArgAction, Parser};

use crate::record::DEFAULT_TIME_FORMAT;

/// Topic selection, subject selection and record formatting options.
///
/// Exactly one topic selection is used, in priority order:
/// `topic_name`, then `topic_map_key`, then `topic_map_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct Config {
    /// Publish every record to this topic
    #[arg(long)]
    pub topic_name: Option<String>,

    /// Take the topic name from this record field
    #[arg(long)]
    pub topic_map_key: Option<String>,

    /// Derive the topic name from the event tag
    #[arg(long)]
    pub topic_map_tag: bool,

    /// Prefix stripped from the tag (together with one following '.') when
    /// deriving the topic from the tag
    #[arg(long)]
    pub remove_tag_prefix: Option<String>,

    /// Record field used as the notification subject (removed from the payload)
    #[arg(long)]
    pub subject_key: Option<String>,

    /// Subject used when the record carries none
    #[arg(long)]
    pub subject: Option<String>,

    /// Inject the event time into each record
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub include_time_key: bool,

    /// Field name for the injected event time
    #[arg(long, default_value = "time")]
    pub time_key: String,

    /// strftime-style format for the injected event time
    #[arg(long, default_value = DEFAULT_TIME_FORMAT)]
    pub time_format: String,

    /// Render the injected event time in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Inject the event tag into each record
    #[arg(long)]
    pub include_tag_key: bool,

    /// Field name for the injected event tag
    #[arg(long, default_value = "tag")]
    pub tag_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic_name: None,
            topic_map_key: None,
            topic_map_tag: false,
            remove_tag_prefix: None,
            subject_key: None,
            subject: None,
            include_time_key: true,
            time_key: "time".to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            utc: false,
            include_tag_key: false,
            tag_key: "tag".to_string(),
        }
    }
}
