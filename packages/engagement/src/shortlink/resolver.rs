//! Short-link resolver with cache-first reuse and local fallback.

use std::sync::Arc;

use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tracing::{info, warn};

use crate::traits::{LinkShortener, ShortLinkStore};
use crate::types::{LinkProvider, NewShortLink};

/// Length of the random tracking token on fallback links.
const TOKEN_LEN: usize = 8;

/// Resolves a `(original URL, campaign)` pair to a reusable short URL.
///
/// Resolution is best-effort by contract: a cache lookup failure is
/// treated as a miss, a provider failure falls back to a locally built
/// link, and a persistence failure still returns the computed URL. The
/// caller always gets a usable link.
pub struct ShortLinkResolver<S: ShortLinkStore> {
    store: S,
    provider: Option<Arc<dyn LinkShortener>>,
}

impl<S: ShortLinkStore> ShortLinkResolver<S> {
    /// Create a resolver without an external provider; every miss builds a
    /// fallback link.
    pub fn new(store: S) -> Self {
        Self {
            store,
            provider: None,
        }
    }

    /// Attach an external shortening provider.
    pub fn with_provider(mut self, provider: Arc<dyn LinkShortener>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Resolve a short URL for the pair, reusing the persisted record when
    /// one exists. Never re-shortens a pair that already has a record.
    pub async fn resolve(
        &self,
        original_url: &str,
        product_id: Option<i64>,
        campaign_id: i64,
    ) -> String {
        match self.store.find(original_url, campaign_id).await {
            Ok(Some(existing)) => {
                info!(short_url = %existing.short_url, "reusing existing short link");
                return existing.short_url;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "short link lookup failed, treating as miss");
            }
        }

        let (short_url, provider) = self.shorten(original_url).await;

        let record = NewShortLink {
            original_url: original_url.to_string(),
            campaign_id,
            product_id,
            short_url: short_url.clone(),
            provider,
        };

        match self.store.insert(&record).await {
            Ok(Some(_)) => {}
            // Another worker persisted the pair first; reuse its URL so the
            // pair keeps a single short link.
            Ok(None) => {
                if let Ok(Some(existing)) = self.store.find(original_url, campaign_id).await {
                    return existing.short_url;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to persist short link, returning it unpersisted");
            }
        }

        short_url
    }

    async fn shorten(&self, original_url: &str) -> (String, LinkProvider) {
        if let Some(provider) = &self.provider {
            match provider.shorten(original_url).await {
                Ok(short_url) => {
                    info!(%short_url, "provider shortened link");
                    return (short_url, LinkProvider::Provider);
                }
                Err(e) => {
                    warn!(error = %e, "shortening provider failed, using fallback");
                }
            }
        }

        (fallback_link(original_url), LinkProvider::Fallback)
    }
}

/// Build a fallback link: the original URL with a random alphanumeric
/// tracking parameter. `thread_rng` is cryptographically strong, so the
/// token is not predictable or replayable.
fn fallback_link(original_url: &str) -> String {
    let token: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();

    let separator = if original_url.contains('?') { '&' } else { '?' };
    format!("{original_url}{separator}ref={token}")
}
