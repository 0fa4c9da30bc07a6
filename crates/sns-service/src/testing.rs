//! In-memory `TopicService` for tests.
//!
//! `MockTopicService` serves a fixed set of listing pages, fails scripted
//! calls, and records every call it receives so tests can assert on them.
//!
//! ```rust
//! use sns_service::testing::MockTopicService;
//! use sns_service::TopicService;
//!
//! # tokio_test_block_on(async {
//! let service = MockTopicService::with_pages(vec![
//!     vec!["arn:aws:sns:us-east-1:123:alpha"],
//!     vec!["arn:aws:sns:us-east-1:123:beta"],
//! ])
//! .throttle_list_calls([0]);
//!
//! assert!(service.list_topics(None).await.is_err());
//! let page = service.list_topics(None).await.unwrap();
//! assert_eq!(page.next_token.as_deref(), Some("page-1"));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{ServiceError, TopicPage, TopicService};

/// A publish call captured by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic_arn: String,
    pub subject: String,
    pub message: String,
}

#[derive(Default)]
pub struct MockTopicService {
    pages: Vec<Vec<String>>,
    list_failures: Mutex<HashMap<usize, ServiceError>>,
    publish_failures: Mutex<HashMap<String, ServiceError>>,
    list_calls: Mutex<Vec<Option<String>>>,
    published: Mutex<Vec<PublishedMessage>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn page_token(index: usize) -> String {
    format!("page-{index}")
}

impl MockTopicService {
    /// Serve `pages` in order; every page but the last carries a continuation token.
    pub fn with_pages<I, P, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(Into::into).collect())
                .collect(),
            ..Default::default()
        }
    }

    /// Serve all `topic_arns` on a single page.
    pub fn with_topics<I, S>(topic_arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_pages([topic_arns])
    }

    /// Fail the given list calls (0-based, counted across all pages) with throttling.
    pub fn throttle_list_calls(self, calls: impl IntoIterator<Item = usize>) -> Self {
        {
            let mut failures = lock(&self.list_failures);
            for call in calls {
                failures.insert(call, ServiceError::Throttling("Rate exceeded".to_string()));
            }
        }
        self
    }

    /// Fail one list call (0-based) with the given error.
    pub fn fail_list_call(self, call: usize, error: ServiceError) -> Self {
        lock(&self.list_failures).insert(call, error);
        self
    }

    /// Fail every publish to `topic_arn` with the given error.
    pub fn fail_publish_to(self, topic_arn: impl Into<String>, error: ServiceError) -> Self {
        lock(&self.publish_failures).insert(topic_arn.into(), error);
        self
    }

    /// Continuation tokens of every list call received, in order.
    pub fn list_calls(&self) -> Vec<Option<String>> {
        lock(&self.list_calls).clone()
    }

    /// Every successful publish call, in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        lock(&self.published).clone()
    }

    fn page_index(&self, next_token: Option<&str>) -> Result<usize, ServiceError> {
        match next_token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|index| *index > 0 && *index < self.pages.len())
                .ok_or_else(|| ServiceError::Other(format!("Invalid NextToken: {token}"))),
        }
    }
}

#[async_trait::async_trait]
impl TopicService for MockTopicService {
    async fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, ServiceError> {
        let call = {
            let mut calls = lock(&self.list_calls);
            calls.push(next_token.map(str::to_string));
            calls.len() - 1
        };

        if let Some(error) = lock(&self.list_failures).get(&call) {
            tracing::debug!("Mock list call {call} failing with {error}");
            return Err(error.clone());
        }

        let index = self.page_index(next_token)?;
        let topic_arns = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| page_token(index + 1));

        Ok(TopicPage {
            topic_arns,
            next_token,
        })
    }

    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), ServiceError> {
        if let Some(error) = lock(&self.publish_failures).get(topic_arn) {
            return Err(error.clone());
        }

        lock(&self.published).push(PublishedMessage {
            topic_arn: topic_arn.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_chain_through_tokens() {
        let service = MockTopicService::with_pages(vec![vec!["a"], vec!["b"], vec!["c"]]);

        let first = service.list_topics(None).await.unwrap();
        assert_eq!(first.topic_arns, vec!["a"]);
        assert_eq!(first.next_token.as_deref(), Some("page-1"));

        let second = service.list_topics(Some("page-1")).await.unwrap();
        assert_eq!(second.next_token.as_deref(), Some("page-2"));

        let last = service.list_topics(Some("page-2")).await.unwrap();
        assert_eq!(last.topic_arns, vec!["c"]);
        assert_eq!(last.next_token, None);

        assert_eq!(
            service.list_calls(),
            vec![None, Some("page-1".to_string()), Some("page-2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let service = MockTopicService::with_topics(["a"]);
        let err = service.list_topics(Some("bogus")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Other(_)));
    }

    #[tokio::test]
    async fn test_scripted_failures_apply_per_call() {
        let service = MockTopicService::with_topics(["a"])
            .throttle_list_calls([0, 1])
            .fail_list_call(2, ServiceError::Other("boom".to_string()));

        assert!(service.list_topics(None).await.unwrap_err().is_throttling());
        assert!(service.list_topics(None).await.unwrap_err().is_throttling());
        assert!(!service.list_topics(None).await.unwrap_err().is_throttling());
        assert!(service.list_topics(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_records_and_fails_by_topic() {
        let service = MockTopicService::default()
            .fail_publish_to("gone", ServiceError::NotFound("Topic does not exist".to_string()));

        service.publish("ok", "subject", "{}").await.unwrap();
        let err = service.publish("gone", "subject", "{}").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(service.published().len(), 1);
        assert_eq!(service.published()[0].topic_arn, "ok");
    }
}
