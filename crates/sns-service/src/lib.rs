//! Remote pub/sub service abstraction.
//!
//! This crate defines the `TopicService` trait that the delivery pipeline is
//! written against. `sns-client` implements it on top of the AWS SDK, and
//! [`testing::MockTopicService`] implements it in memory for tests.
//!
//! The trait deals only in plain strings and typed errors so callers never
//! see SDK types. Transport concerns (signing, retries inside the SDK,
//! timeouts) stay behind the implementation.

mod error;
pub mod testing;
mod traits;

pub use error::ServiceError;
pub use traits::{TopicPage, TopicService};
