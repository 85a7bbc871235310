//! NATS JetStream wiring: streams, consumers, and the publisher.
//!
//! Subjects carry the source-post id as their final token, so events for
//! one post stay ordered while independent posts spread across workers.
//! Durable pull consumers give per-message manual acknowledgment: nothing
//! is committed until the full per-message pipeline has run.

use anyhow::{Context as _, Result};
use async_nats::jetstream::{self, consumer::PullConsumer, stream};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use engagement::error::EngagementError;
use engagement::{subjects, EventPublisher};

pub const DISCOVERED_POSTS_STREAM: &str = "discovered-posts";
pub const REPLY_SUGGESTIONS_STREAM: &str = "reply-suggestions";
pub const DEAD_LETTER_STREAM: &str = "dead-letter";

const INGEST_CONSUMER: &str = "ingest";
const PERSIST_CONSUMER: &str = "persist";

/// Connect to NATS and return a JetStream context.
pub async fn connect(url: &str) -> Result<jetstream::Context> {
    let client = async_nats::connect(url)
        .await
        .with_context(|| format!("failed to connect to NATS at {url}"))?;
    Ok(jetstream::new(client))
}

/// Create the three pipeline streams if they do not exist yet.
pub async fn ensure_streams(js: &jetstream::Context) -> Result<()> {
    for (name, subject_prefix) in [
        (DISCOVERED_POSTS_STREAM, subjects::POSTS_DISCOVERED),
        (REPLY_SUGGESTIONS_STREAM, subjects::REPLIES_SUGGESTED),
        (DEAD_LETTER_STREAM, subjects::DEAD_LETTER),
    ] {
        js.get_or_create_stream(stream::Config {
            name: name.to_string(),
            subjects: vec![format!("{subject_prefix}.>")],
            ..Default::default()
        })
        .await
        .with_context(|| format!("failed to ensure stream {name}"))?;
        info!(stream = name, "stream ready");
    }
    Ok(())
}

/// Durable pull consumer for the ingestion stage. Multiple workers share
/// the durable: each message is delivered to exactly one of them.
pub async fn ingest_consumer(js: &jetstream::Context) -> Result<PullConsumer> {
    durable_consumer(js, DISCOVERED_POSTS_STREAM, INGEST_CONSUMER).await
}

/// Durable pull consumer for the persistence stage.
pub async fn persist_consumer(js: &jetstream::Context) -> Result<PullConsumer> {
    durable_consumer(js, REPLY_SUGGESTIONS_STREAM, PERSIST_CONSUMER).await
}

async fn durable_consumer(
    js: &jetstream::Context,
    stream_name: &str,
    durable: &str,
) -> Result<PullConsumer> {
    let stream = js
        .get_stream(stream_name)
        .await
        .with_context(|| format!("failed to look up stream {stream_name}"))?;

    stream
        .get_or_create_consumer(
            durable,
            jetstream::consumer::pull::Config {
                durable_name: Some(durable.to_string()),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("failed to ensure consumer {durable} on {stream_name}"))
}

/// JetStream-backed implementation of the pipeline's publisher trait.
pub struct JetStreamPublisher {
    context: jetstream::Context,
}

impl JetStreamPublisher {
    pub fn new(context: jetstream::Context) -> Self {
        Self { context }
    }
}

#[async_trait]
impl EventPublisher for JetStreamPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> engagement::error::Result<()> {
        // Await the broker ack so a failed publish is visible to the
        // stage's dead-letter routing
        self.context
            .publish(subject, payload)
            .await
            .map_err(|e| EngagementError::Publish(e.to_string().into()))?
            .await
            .map_err(|e| EngagementError::Publish(e.to_string().into()))?;
        Ok(())
    }
}
