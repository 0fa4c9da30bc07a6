//! Record publisher: one SNS publish call per chunk entry.
//!
//! Entries are processed strictly in order, one publish call at a time. For
//! each entry the publisher formats the record, takes the subject out of it,
//! resolves the topic, looks the topic up in the directory built at startup,
//! and publishes the JSON payload. Entries whose topic is unknown are logged
//! and dropped; the rest of the chunk still goes out.

use std::sync::Arc;

use fluent_chunk::{Chunk, Entry};
use sns_service::{ServiceError, TopicService};
use tracing::{debug, error};

use crate::payload::encode_payload;
use crate::{Error, RecordFormatter, Result, SubjectPolicy, TopicDirectory, TopicResolver};

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Published { topic: String },
    /// Topic unknown to the directory, or deleted since discovery
    Dropped { topic: String },
}

/// Per-chunk outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub published: usize,
    /// Topic names of dropped entries, in chunk order
    pub dropped: Vec<String>,
}

pub struct RecordPublisher<S: ?Sized> {
    service: Arc<S>,
    directory: TopicDirectory,
    resolver: TopicResolver,
    subject: SubjectPolicy,
    formatter: RecordFormatter,
}

impl<S> RecordPublisher<S>
where
    S: TopicService + ?Sized,
{
    pub fn new(
        service: Arc<S>,
        directory: TopicDirectory,
        resolver: TopicResolver,
        subject: SubjectPolicy,
        formatter: RecordFormatter,
    ) -> Self {
        Self {
            service,
            directory,
            resolver,
            subject,
            formatter,
        }
    }

    pub fn directory(&self) -> &TopicDirectory {
        &self.directory
    }

    /// Decode a binary chunk and deliver it.
    pub async fn deliver_bytes(&self, bytes: &[u8]) -> Result<DeliveryReport> {
        let chunk = Chunk::decode(bytes)?;
        self.deliver(chunk).await
    }

    /// Publish every entry of `chunk` in order.
    ///
    /// Returns an error on the first publish failure that is not a missing
    /// topic; entries before it have already been published.
    pub async fn deliver(&self, chunk: Chunk) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();

        for entry in chunk {
            match self.publish_entry(entry).await? {
                Delivery::Published { .. } => report.published += 1,
                Delivery::Dropped { topic } => report.dropped.push(topic),
            }
        }

        debug!(
            "Delivered chunk: {} published, {} dropped",
            report.published,
            report.dropped.len()
        );
        Ok(report)
    }

    pub async fn publish_entry(&self, entry: Entry) -> Result<Delivery> {
        let Entry {
            tag,
            time,
            mut record,
        } = entry;

        self.formatter.format(&tag, time, &mut record);
        let subject = self.subject.take(&mut record);
        let Some(topic) = self.resolver.resolve(&tag, &record) else {
            error!("Record with tag '{tag}' has no topic, dropping it");
            return Ok(Delivery::Dropped {
                topic: String::new(),
            });
        };

        let Some(topic_arn) = self.directory.lookup(&topic) else {
            error!("Could not find topic '{topic}' on SNS");
            return Ok(Delivery::Dropped { topic });
        };

        let message = encode_payload(&record)?;

        match self.service.publish(topic_arn, &subject, &message).await {
            Ok(()) => Ok(Delivery::Published { topic }),
            Err(ServiceError::NotFound(reason)) => {
                error!("Topic '{topic}' ({topic_arn}) no longer exists on SNS: {reason}");
                Ok(Delivery::Dropped { topic })
            }
            Err(source) => Err(Error::Publish {
                topic_arn: topic_arn.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, SnsOutput};
    use bson::{doc, Binary};
    use sns_service::testing::MockTopicService;
    use std::io::Write;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    const ARN_PREFIX: &str = "arn:aws:sns:us-east-1:123456789012";

    fn arn(name: &str) -> String {
        format!("{ARN_PREFIX}:{name}")
    }

    fn field_config() -> Config {
        Config {
            topic_map_key: Some("topic".to_string()),
            include_time_key: false,
            ..Config::default()
        }
    }

    async fn publisher(
        config: &Config,
        service: MockTopicService,
    ) -> (Arc<MockTopicService>, RecordPublisher<MockTopicService>) {
        let service = Arc::new(service);
        let publisher = SnsOutput::configure(config)
            .unwrap()
            .start(Arc::clone(&service))
            .await
            .unwrap();
        (service, publisher)
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_subject_precedence() {
        let config = Config {
            subject_key: Some("title".to_string()),
            subject: Some("Static subject".to_string()),
            ..field_config()
        };
        let (service, publisher) =
            publisher(&config, MockTopicService::with_topics([arn("alerts")])).await;

        let chunk: Chunk = vec![
            Entry::new("t", 1, doc! { "topic": "alerts", "title": "From record", "n": 1 }),
            Entry::new("t", 2, doc! { "topic": "alerts", "n": 2 }),
        ]
        .into_iter()
        .collect();
        publisher.deliver(chunk).await.unwrap();

        let published = service.published();
        assert_eq!(published[0].subject, "From record");
        assert_eq!(published[0].message, r#"{"topic":"alerts","n":1}"#);
        assert_eq!(published[1].subject, "Static subject");
    }

    #[tokio::test]
    async fn test_default_subject_literal() {
        let (service, publisher) =
            publisher(&field_config(), MockTopicService::with_topics([arn("alerts")])).await;

        publisher
            .publish_entry(Entry::new("t", 1, doc! { "topic": "alerts" }))
            .await
            .unwrap();

        assert_eq!(service.published()[0].subject, "Fluent-Notification");
    }

    #[tokio::test]
    async fn test_missing_topic_dropped_others_published() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (service, publisher) = publisher(
            &field_config(),
            MockTopicService::with_topics([arn("orders"), arn("billing")]),
        )
        .await;

        let chunk: Chunk = vec![
            Entry::new("t", 1, doc! { "topic": "orders", "id": 1 }),
            Entry::new("t", 2, doc! { "topic": "missing", "id": 2 }),
            Entry::new("t", 3, doc! { "topic": "billing", "id": 3 }),
        ]
        .into_iter()
        .collect();
        let report = publisher.deliver(chunk).await.unwrap();

        assert_eq!(report.published, 2);
        assert_eq!(report.dropped, vec!["missing".to_string()]);

        let arns: Vec<String> = service.published().into_iter().map(|m| m.topic_arn).collect();
        assert_eq!(arns, vec![arn("orders"), arn("billing")]);

        let output = logs.contents();
        assert_eq!(output.matches("Could not find topic 'missing' on SNS").count(), 1);
    }

    #[tokio::test]
    async fn test_record_without_topic_is_dropped() {
        let (service, publisher) =
            publisher(&field_config(), MockTopicService::with_topics([arn("orders")])).await;

        let delivery = publisher
            .publish_entry(Entry::new("t", 1, doc! { "id": 1 }))
            .await
            .unwrap();

        assert_eq!(delivery, Delivery::Dropped { topic: String::new() });
        assert!(service.published().is_empty());
    }

    #[tokio::test]
    async fn test_record_without_topic_never_matches_empty_name() {
        // An ARN with a trailing ':' is indexed under the empty name.
        let (service, publisher) = publisher(
            &field_config(),
            MockTopicService::with_topics([format!("{ARN_PREFIX}:"), arn("orders")]),
        )
        .await;
        assert!(publisher.directory().lookup("").is_some());

        let chunk: Chunk = vec![
            Entry::new("t", 1, doc! { "id": 1 }),
            Entry::new("t", 2, doc! { "topic": "orders", "id": 2 }),
        ]
        .into_iter()
        .collect();
        let report = publisher.deliver(chunk).await.unwrap();

        assert_eq!(report.published, 1);
        assert_eq!(report.dropped, vec![String::new()]);
        let arns: Vec<String> = service.published().into_iter().map(|m| m.topic_arn).collect();
        assert_eq!(arns, vec![arn("orders")]);
    }

    #[tokio::test]
    async fn test_dotted_topic_normalized_before_lookup() {
        let config = Config {
            topic_map_tag: true,
            remove_tag_prefix: Some("sns".to_string()),
            include_time_key: false,
            ..Config::default()
        };
        let (service, publisher) =
            publisher(&config, MockTopicService::with_topics([arn("orders-created")])).await;

        publisher
            .publish_entry(Entry::new("sns.orders.created", 1, doc! { "id": 1 }))
            .await
            .unwrap();

        assert_eq!(service.published()[0].topic_arn, arn("orders-created"));
    }

    #[tokio::test]
    async fn test_time_and_tag_injected_into_payload() {
        let config = Config {
            topic_name: Some("events".to_string()),
            include_tag_key: true,
            utc: true,
            ..Config::default()
        };
        let (service, publisher) =
            publisher(&config, MockTopicService::with_topics([arn("events")])).await;

        publisher
            .publish_entry(Entry::new("app.web", 1_700_000_000, doc! { "msg": "hi" }))
            .await
            .unwrap();

        assert_eq!(
            service.published()[0].message,
            r#"{"msg":"hi","tag":"app.web","time":"2023-11-14 22:13:20 +0000"}"#
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_payload_still_published() {
        let (service, publisher) =
            publisher(&field_config(), MockTopicService::with_topics([arn("raw")])).await;

        let bytes = Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: vec![b'a', 0xC3, b'b'],
        };
        publisher
            .publish_entry(Entry::new("t", 1, doc! { "topic": "raw", "data": bytes }))
            .await
            .unwrap();

        let message = &service.published()[0].message;
        assert_eq!(message, "{\"topic\":\"raw\",\"data\":\"a\u{FFFD}b\"}");
    }

    #[tokio::test]
    async fn test_publish_not_found_is_dropped() {
        let service = MockTopicService::with_topics([arn("gone"), arn("ok")]).fail_publish_to(
            arn("gone"),
            ServiceError::NotFound("Topic does not exist".to_string()),
        );
        let (service, publisher) = publisher(&field_config(), service).await;

        let chunk: Chunk = vec![
            Entry::new("t", 1, doc! { "topic": "gone" }),
            Entry::new("t", 2, doc! { "topic": "ok" }),
        ]
        .into_iter()
        .collect();
        let report = publisher.deliver(chunk).await.unwrap();

        assert_eq!(report.published, 1);
        assert_eq!(report.dropped, vec!["gone".to_string()]);
        assert_eq!(service.published().len(), 1);
    }

    #[tokio::test]
    async fn test_other_publish_error_stops_chunk() {
        let service = MockTopicService::with_topics([arn("bad"), arn("ok")]).fail_publish_to(
            arn("bad"),
            ServiceError::Other("InternalError".to_string()),
        );
        let (service, publisher) = publisher(&field_config(), service).await;

        let chunk: Chunk = vec![
            Entry::new("t", 1, doc! { "topic": "ok" }),
            Entry::new("t", 2, doc! { "topic": "bad" }),
            Entry::new("t", 3, doc! { "topic": "ok" }),
        ]
        .into_iter()
        .collect();
        let result = publisher.deliver(chunk).await;

        match result {
            Err(Error::Publish { topic_arn, source }) => {
                assert_eq!(topic_arn, arn("bad"));
                assert!(matches!(source, ServiceError::Other(_)));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
        assert_eq!(service.published().len(), 1);
    }

    #[tokio::test]
    async fn test_deliver_bytes_decodes_chunk() {
        let (service, publisher) =
            publisher(&field_config(), MockTopicService::with_topics([arn("orders")])).await;

        let chunk: Chunk = vec![Entry::new("t", 1, doc! { "topic": "orders" })]
            .into_iter()
            .collect();
        let report = publisher.deliver_bytes(&chunk.encode().unwrap()).await.unwrap();

        assert_eq!(report.published, 1);
        assert_eq!(service.published().len(), 1);

        assert!(matches!(
            publisher.deliver_bytes(&[7, 0, 0]).await,
            Err(Error::Chunk(_))
        ));
    }
}
