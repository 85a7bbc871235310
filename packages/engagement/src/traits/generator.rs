//! Generative-text provider capability.

use async_trait::async_trait;

use crate::error::Result;

/// A generative-text provider.
///
/// Given a system instruction and a user prompt, returns free-form text.
/// The output is untrusted: callers must parse and validate it, and must
/// survive it being arbitrary garbage.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}
