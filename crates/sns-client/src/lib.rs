//! Amazon SNS client for the SNS output.
//!
//! Wraps `aws_sdk_sns::Client` and implements [`sns_service::TopicService`]:
//! - `list_topics` maps to `ListTopics` with `NextToken` pagination
//! - `publish` maps to `Publish` with topic ARN, subject and message
//!
//! SDK errors are classified into [`ServiceError`] by their error code, so
//! callers can tell throttling apart from missing topics and other failures.

mod error;

use aws_config::BehaviorVersion;
use aws_sdk_sns::config::{Credentials, Region};
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sns_service::{ServiceError, TopicPage, TopicService};

pub use error::{Error, Result};

/// Error codes SNS (and the AWS query protocol in general) uses for rate limiting.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

const NOT_FOUND_CODES: &[&str] = &["NotFound", "NotFoundException"];

/// Connection options for the SNS client.
///
/// Unset fields fall back to the AWS default provider chain (environment,
/// shared config files, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub proxy_uri: Option<String>,
    pub endpoint_url: Option<String>,
}

/// Shared SNS client.
pub struct SnsClient {
    client: aws_sdk_sns::Client,
}

impl SnsClient {
    /// Create a new SNS client from the given options.
    pub async fn new(opts: &ClientOptions) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        match (&opts.access_key_id, &opts.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    None,
                    None,
                    "fluent-sns-static",
                ));
            }
            (None, None) => {}
            _ => return Err(Error::IncompleteCredentials),
        }

        if let Some(region) = &opts.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(endpoint_url) = &opts.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        if let Some(proxy_uri) = &opts.proxy_uri {
            tracing::warn!(
                "Proxy URI {proxy_uri} is configured but the SNS transport does not route through proxies; ignoring it"
            );
        }

        let sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            return Err(Error::MissingRegion);
        }

        Ok(Self::from_client(aws_sdk_sns::Client::new(&sdk_config)))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TopicService for SnsClient {
    async fn list_topics(
        &self,
        next_token: Option<&str>,
    ) -> std::result::Result<TopicPage, ServiceError> {
        let response = self
            .client
            .list_topics()
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(classify)?;

        let topic_arns = response
            .topics()
            .iter()
            .filter_map(|topic| topic.topic_arn().map(str::to_string))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Listed {} topics (more pages: {})",
            topic_arns.len(),
            response.next_token().is_some()
        );

        Ok(TopicPage {
            topic_arns,
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> std::result::Result<(), ServiceError> {
        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await;

        match response {
            Ok(output) => {
                tracing::trace!(
                    "Published message {} to {topic_arn}",
                    output.message_id().unwrap_or("<none>")
                );
                Ok(())
            }
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_not_found_exception())
                {
                    return Err(ServiceError::NotFound(
                        DisplayErrorContext(&err).to_string(),
                    ));
                }
                Err(classify(err))
            }
        }
    }
}

fn classify<E, R>(err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    classify_code(code.as_deref(), DisplayErrorContext(&err).to_string())
}

/// Map an AWS error code onto the service error taxonomy.
fn classify_code(code: Option<&str>, message: String) -> ServiceError {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => ServiceError::Throttling(message),
        Some(code) if NOT_FOUND_CODES.contains(&code) => ServiceError::NotFound(message),
        _ => ServiceError::Other(message),
    }
}
