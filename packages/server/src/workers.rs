//! Long-running consumer workers for the two pipeline stages.
//!
//! Each worker pulls one message at a time, runs the stage, and only then
//! acknowledges. Acknowledgment is unconditional once the stage has
//! disposed of the event (including dead-letter routing), so a poisoned
//! message never loops; a crash before the ack redelivers the event, and
//! the stages' idempotency checks absorb the replay.

use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::{consumer::PullConsumer, Message};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use engagement::{
    CampaignSource, DiscoveredPost, IngestStage, PersistStage, ProductSource, ReplySuggestion,
    ShortLinkStore, TextGenerator,
};

/// Pause before rebuilding a broken message stream.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Run an ingestion worker until shutdown.
pub async fn run_ingest_worker<C, P, S, G>(
    worker_id: usize,
    stage: Arc<IngestStage<C, P, S, G>>,
    consumer: PullConsumer,
    shutdown: CancellationToken,
) where
    C: CampaignSource,
    P: ProductSource,
    S: ShortLinkStore,
    G: TextGenerator,
{
    info!(worker_id, "ingest worker started");
    run_consumer_loop(consumer, shutdown, |message| {
        let stage = stage.clone();
        async move {
            let post: DiscoveredPost = match serde_json::from_slice(&message.payload) {
                Ok(post) => post,
                Err(e) => {
                    warn!(error = %e, "undecodable discovered-post payload, acknowledging");
                    ack(&message).await;
                    return;
                }
            };

            if let Err(e) = stage.process(&post).await {
                error!(post_id = %post.post_id, error = %e, "ingest stage error");
            }
            ack(&message).await;
        }
    })
    .await;
    info!(worker_id, "ingest worker stopped");
}

/// Run the persistence worker until shutdown.
pub async fn run_persist_worker(
    stage: Arc<PersistStage>,
    consumer: PullConsumer,
    shutdown: CancellationToken,
) {
    info!("persist worker started");
    run_consumer_loop(consumer, shutdown, |message| {
        let stage = stage.clone();
        async move {
            let suggestion: ReplySuggestion = match serde_json::from_slice(&message.payload) {
                Ok(suggestion) => suggestion,
                Err(e) => {
                    warn!(error = %e, "undecodable reply-suggestion payload, acknowledging");
                    ack(&message).await;
                    return;
                }
            };

            // At-most-once for this stage: a storage error is logged and
            // the event acknowledged, avoiding a poison-message loop
            if let Err(e) = stage.process(&suggestion).await {
                error!(
                    post_id = %suggestion.post_id,
                    error = %e,
                    "failed to persist reply suggestion"
                );
            }
            ack(&message).await;
        }
    })
    .await;
    info!("persist worker stopped");
}

async fn run_consumer_loop<F, Fut>(
    consumer: PullConsumer,
    shutdown: CancellationToken,
    mut handle: F,
) where
    F: FnMut(Message) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    loop {
        let mut messages = match consumer.messages().await {
            Ok(messages) => messages,
            Err(e) => {
                error!(error = %e, "failed to open message stream, retrying");
                if sleep_or_shutdown(&shutdown).await {
                    return;
                }
                continue;
            }
        };

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                next = messages.next() => match next {
                    Some(Ok(message)) => handle(message).await,
                    Some(Err(e)) => {
                        warn!(error = %e, "message stream error, rebuilding");
                        break;
                    }
                    None => {
                        warn!("message stream ended, rebuilding");
                        break;
                    }
                },
            }
        }

        if sleep_or_shutdown(&shutdown).await {
            return;
        }
    }
}

/// Sleep for the reconnect delay; true if shutdown fired meanwhile.
async fn sleep_or_shutdown(shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => true,
        _ = tokio::time::sleep(RECONNECT_DELAY) => false,
    }
}

async fn ack(message: &Message) {
    if let Err(e) = message.ack().await {
        warn!(error = %e, "failed to acknowledge message");
    }
}
