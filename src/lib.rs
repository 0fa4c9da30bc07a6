//! fluent-sns library
//!
//! Delivers buffered log chunks to Amazon SNS topics.
//!
//! # Crates
//!
//! - `fluent_chunk` - BSON chunk codec for `(tag, time, record)` entries
//! - `sns_service` - `TopicService` trait and an in-memory mock
//! - `sns_client` - AWS SDK implementation of `TopicService`
//! - `sns_output` - topic resolution, topic discovery and record publishing
//!
//! # CLI Usage
//!
//! ```bash
//! # Publish buffered chunks, topic taken from the tag
//! fluent-sns deliver --aws-region us-east-1 --topic-map-tag --remove-tag-prefix sns /var/buffer/
//!
//! # Show the discovered topic directory
//! fluent-sns topics --aws-region us-east-1
//!
//! # Build a chunk file from JSON lines
//! fluent-sns pack --input events.jsonl --output events.chunk
//! ```

use clap::Parser;

pub mod deliver;
pub mod pack;

pub use fluent_chunk as chunk;

#[derive(Parser, Clone, Debug, Default)]
pub struct AwsOpts {
    /// AWS access key id (requires --aws-secret-access-key)
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key (requires --aws-access-key-id)
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// AWS region of the SNS topics
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// HTTP proxy URI
    #[arg(long, env = "HTTP_PROXY")]
    pub aws_proxy_uri: Option<String>,

    /// Override the SNS endpoint (e.g. a local emulator)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub aws_endpoint_url: Option<String>,
}

// CLI type → SNS client options
impl From<&AwsOpts> for sns_client::ClientOptions {
    fn from(opts: &AwsOpts) -> Self {
        Self {
            access_key_id: opts.aws_access_key_id.clone(),
            secret_access_key: opts.aws_secret_access_key.clone(),
            region: opts.aws_region.clone(),
            proxy_uri: opts.aws_proxy_uri.clone(),
            endpoint_url: opts.aws_endpoint_url.clone(),
        }
    }
}
