// Main entry point for the engagement pipeline server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engagement::ai::OpenAI;
use engagement::{
    BitlyShortener, CampaignClient, IngestStage, PersistStage, PostgresStore, ProductClient,
    ReplySynthesizer, ShortLinkResolver, SynthesizerConfig,
};
use server::nats::{self, JetStreamPublisher};
use server::{build_app, workers, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,engagement=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting engagement pipeline server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let task_store = Arc::new(
        PostgresStore::from_pool(pool.clone())
            .await
            .context("Failed to initialize task store")?,
    );
    let link_store = PostgresStore::from_pool(pool)
        .await
        .context("Failed to initialize short-link store")?;
    tracing::info!("Database connected");

    // Wire up the event streams
    let jetstream = nats::connect(&config.nats_url).await?;
    nats::ensure_streams(&jetstream).await?;
    let publisher = Arc::new(JetStreamPublisher::new(jetstream.clone()));

    // Build the ingestion stage
    let context_timeout = Duration::from_secs(config.context_timeout_secs);
    let campaigns = CampaignClient::with_timeout(&config.campaign_service_url, context_timeout)
        .context("Failed to build campaign client")?;
    let products = ProductClient::with_timeout(&config.product_service_url, context_timeout)
        .context("Failed to build product client")?;

    let mut resolver = ShortLinkResolver::new(link_store);
    if let Some(token) = &config.bitly_token {
        resolver = resolver.with_provider(Arc::new(BitlyShortener::new(token)));
    } else {
        tracing::info!("No shortening provider configured, fallback links only");
    }

    let generator = OpenAI::new(&config.openai_api_key).with_model(&config.openai_model);
    let synthesizer = ReplySynthesizer::new(generator, SynthesizerConfig::default());

    let ingest_stage = Arc::new(IngestStage::new(
        campaigns,
        products,
        resolver,
        synthesizer,
        publisher,
    ));
    let persist_stage = Arc::new(PersistStage::new(task_store.clone()));

    // Spawn the stage workers
    let shutdown = CancellationToken::new();
    let mut worker_handles = Vec::new();

    for worker_id in 0..config.ingest_workers {
        let consumer = nats::ingest_consumer(&jetstream).await?;
        worker_handles.push(tokio::spawn(workers::run_ingest_worker(
            worker_id,
            ingest_stage.clone(),
            consumer,
            shutdown.clone(),
        )));
    }

    let consumer = nats::persist_consumer(&jetstream).await?;
    worker_handles.push(tokio::spawn(workers::run_persist_worker(
        persist_stage,
        consumer,
        shutdown.clone(),
    )));

    // Start the HTTP surface
    let app = build_app(AppState { tasks: task_store });
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("Server error")?;

    // Drain the workers before exiting
    shutdown.cancel();
    for handle in worker_handles {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
