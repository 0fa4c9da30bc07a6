//! Output lifecycle: configure, then start, then deliver.

use std::sync::Arc;

use sns_service::TopicService;
use tracing::info;

use crate::{
    BackoffPolicy, Config, RecordFormatter, RecordPublisher, Result, SubjectPolicy,
    TopicDirectory, TopicResolver,
};

/// A validated output that has not yet discovered its topics.
///
/// ```rust,ignore
/// let output = SnsOutput::configure(&config)?;      // fails without a topic strategy
/// let publisher = output.start(Arc::new(client)).await?;  // one-time discovery
/// publisher.deliver(chunk).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SnsOutput {
    resolver: TopicResolver,
    subject: SubjectPolicy,
    formatter: RecordFormatter,
    backoff: BackoffPolicy,
}

impl SnsOutput {
    /// Validate configuration. Missing topic selection is fatal here and
    /// never surfaces at delivery time.
    pub fn configure(config: &Config) -> Result<Self> {
        let resolver = TopicResolver::from_config(config)?;
        let formatter = RecordFormatter::from_config(config)?;
        let subject = SubjectPolicy::new(config.subject_key.clone(), config.subject.clone());

        info!("Configured SNS output with topic strategy {:?}", resolver.strategy());

        Ok(Self {
            resolver,
            subject,
            formatter,
            backoff: BackoffPolicy::default(),
        })
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn resolver(&self) -> &TopicResolver {
        &self.resolver
    }

    /// Discover topics once and hand back a publisher bound to that directory.
    pub async fn start<S>(self, service: Arc<S>) -> Result<RecordPublisher<S>>
    where
        S: TopicService + ?Sized,
    {
        let directory = TopicDirectory::discover(service.as_ref(), &self.backoff).await?;

        Ok(RecordPublisher::new(
            service,
            directory,
            self.resolver,
            self.subject,
            self.formatter,
        ))
    }
}
