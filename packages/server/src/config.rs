use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub campaign_service_url: String,
    pub product_service_url: String,
    pub bitly_token: Option<String>,
    /// Ingest workers pulling from the discovered-posts stream. Each
    /// handles its own share of the partitioned subjects.
    pub ingest_workers: usize,
    /// Bound on campaign/product lookups, in seconds.
    pub context_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: env::var("NATS_URL")
                .unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            campaign_service_url: env::var("CAMPAIGN_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            product_service_url: env::var("PRODUCT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            bitly_token: env::var("BITLY_TOKEN").ok().filter(|t| !t.is_empty()),
            ingest_workers: env::var("INGEST_WORKERS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("INGEST_WORKERS must be a valid number")?,
            context_timeout_secs: env::var("CONTEXT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("CONTEXT_TIMEOUT_SECS must be a valid number")?,
        })
    }
}
