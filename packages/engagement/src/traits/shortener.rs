//! Link-shortening provider capability.

use async_trait::async_trait;

use crate::error::ShortenError;

/// An external URL-shortening provider.
///
/// Failure is an explicit result, not an exception contract: the resolver
/// treats any `Err` as a signal to build a fallback link locally.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, long_url: &str) -> Result<String, ShortenError>;
}
