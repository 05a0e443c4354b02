//! Text generation backend trait.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RagError, Result};

/// A generative model that answers a complete prompt with text.
///
/// Implementations return the first candidate's text. They should not
/// enforce their own retry policy; the caller applies a single attempt
/// under a timeout.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate a response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Run one generation call raced against `timeout`.
///
/// If the timer wins the in-flight call is dropped, so its result is never
/// observed. A blank response counts as malformed.
///
/// # Errors
///
/// Returns [`RagError::Timeout`] when the budget elapses,
/// [`RagError::MalformedResponse`] for blank text, or whatever the
/// generator itself reported.
pub async fn generate_within(
    generator: &dyn TextGenerator,
    prompt: &str,
    timeout: Duration,
) -> Result<String> {
    debug!(provider = generator.name(), prompt_chars = prompt.chars().count(), "calling generator");

    let text = tokio::time::timeout(timeout, generator.generate(prompt))
        .await
        .map_err(|_| RagError::Timeout { operation: "generation", after: timeout })??;

    if text.trim().is_empty() {
        return Err(RagError::MalformedResponse {
            provider: generator.name().to_string(),
            message: "empty response text".to_string(),
        });
    }
    Ok(text)
}
