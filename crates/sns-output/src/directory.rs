//! Topic directory: logical topic name → topic ARN.
//!
//! Built once at startup by listing every topic page by page. Throttled page
//! requests are retried for the same page after a backoff delay; the attempt
//! counter starts over at 1 whenever a page succeeds. Running out of backoff
//! delays fails discovery as a whole, since a partial directory would make
//! the publisher silently drop records for the topics it missed.

use std::collections::HashMap;

use sns_service::TopicService;
use tracing::{error, info};

use crate::{BackoffPolicy, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicDirectory {
    topics: HashMap<String, String>,
}

impl TopicDirectory {
    /// List every topic from the service and index it by name.
    pub async fn discover<S>(service: &S, backoff: &BackoffPolicy) -> Result<Self>
    where
        S: TopicService + ?Sized,
    {
        let topic_arns = list_all_topics(service, backoff).await?;
        let directory = Self::from_arns(topic_arns);
        info!("Discovered {} SNS topics", directory.len());
        Ok(directory)
    }

    /// Index ARNs by their trailing `:`-delimited segment. Later ARNs win on
    /// duplicate names.
    pub fn from_arns<I, S>(topic_arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics = topic_arns
            .into_iter()
            .map(|arn| {
                let arn = arn.into();
                (topic_name_from_arn(&arn).to_string(), arn)
            })
            .collect();
        Self { topics }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.topics.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// `(name, arn)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.topics
            .iter()
            .map(|(name, arn)| (name.as_str(), arn.as_str()))
    }
}

/// Trailing segment after the last `:`, or the whole ARN if it has none.
pub fn topic_name_from_arn(arn: &str) -> &str {
    arn.rsplit_once(':').map_or(arn, |(_, name)| name)
}

async fn list_all_topics<S>(service: &S, backoff: &BackoffPolicy) -> Result<Vec<String>>
where
    S: TopicService + ?Sized,
{
    let mut topic_arns = Vec::new();
    let mut next_token: Option<String> = None;
    let mut attempt: u32 = 1;

    loop {
        match service.list_topics(next_token.as_deref()).await {
            Ok(page) => {
                topic_arns.extend(page.topic_arns);
                match page.next_token {
                    Some(token) => {
                        next_token = Some(token);
                        attempt = 1;
                    }
                    None => return Ok(topic_arns),
                }
            }
            Err(err) if err.is_throttling() => {
                let Some(delay) = backoff.delay_for(attempt) else {
                    error!("Failed to retrieve topics after {attempt} attempts, giving up");
                    return Err(Error::DiscoveryRetriesExhausted { attempts: attempt });
                };
                error!(
                    "Encountered rate limit from SNS API, retrying in {} seconds",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(Error::Discovery(err)),
        }
    }
}
