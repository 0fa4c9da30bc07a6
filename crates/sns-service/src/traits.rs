//! TopicService trait definition.

use crate::ServiceError;

/// One page of a topic listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPage {
    /// Service topic identifiers (ARNs) on this page
    pub topic_arns: Vec<String>,
    /// Continuation token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

/// Operations the delivery pipeline needs from the remote service.
///
/// # Usage Pattern
///
/// Pipeline code is generic over the service:
///
/// ```ignore
/// pub async fn discover<S: TopicService + ?Sized>(service: &S) -> Result<TopicDirectory> {
///     let page = service.list_topics(None).await?;
///     // ...
/// }
/// ```
#[async_trait::async_trait]
pub trait TopicService: Send + Sync {
    /// List one page of topics, continuing from `next_token` when given.
    async fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, ServiceError>;

    /// Publish a single message to the topic identified by `topic_arn`.
    async fn publish(&self, topic_arn: &str, subject: &str, message: &str)
        -> Result<(), ServiceError>;
}
