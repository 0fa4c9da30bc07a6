//! Buffered event delivery to SNS.
//!
//! This crate takes chunks of `(tag, time, record)` entries and publishes
//! each record as a notification to an SNS topic:
//! - Topic Resolver: picks the logical topic name for an entry (static name,
//!   record field, or event tag), then rewrites `.` to `-`
//! - Topic Directory: maps logical names to topic ARNs, discovered once at
//!   startup through paginated listing with throttling backoff
//! - Backoff Policy: the fixed retry delay table for throttled discovery
//! - Record Publisher: formats, encodes and publishes each entry
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let output = SnsOutput::configure(&config)?;
//! let publisher = output.start(Arc::new(sns_client)).await?;
//! for chunk in chunks {
//!     publisher.deliver(chunk).await?;
//! }
//! ```
//!
//! The directory is never refreshed after startup: topics created later are
//! invisible until the process restarts.

pub mod backoff;
mod config;
pub mod directory;
mod error;
mod output;
pub mod payload;
pub mod publisher;
mod record;
pub mod resolver;
pub mod subject;

pub use backoff::BackoffPolicy;
pub use config::Config;
pub use directory::TopicDirectory;
pub use error::{Error, Result};
pub use output::SnsOutput;
pub use publisher::{Delivery, DeliveryReport, RecordPublisher};
pub use record::{RecordFormatter, DEFAULT_TIME_FORMAT};
pub use resolver::{normalize_topic_name, TagPrefix, TopicResolver, TopicStrategy};
pub use subject::{SubjectPolicy, DEFAULT_SUBJECT};
