use sns_service::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No topic selection configured: set one of --topic-name, --topic-map-key or --topic-map-tag")]
    NoTopicStrategy,

    #[error("Invalid tag prefix pattern '{pattern}': {source}")]
    InvalidTagPrefix {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Failed to retrieve topics after {attempts} attempts")]
    DiscoveryRetriesExhausted { attempts: u32 },

    #[error("Topic discovery failed: {0}")]
    Discovery(#[source] ServiceError),

    #[error("Chunk error: {0}")]
    Chunk(#[from] fluent_chunk::Error),

    #[error("Payload encoding error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to publish to {topic_arn}: {source}")]
    Publish {
        topic_arn: String,
        #[source]
        source: ServiceError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
