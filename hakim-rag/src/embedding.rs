//! Embedding backend trait.

use async_trait::async_trait;

use crate::error::Result;

/// A backend that turns text into fixed-dimension vectors.
///
/// The relevance scorer treats every error from this trait as a signal to
/// switch to keyword scoring for the current call, so implementations should
/// report failures rather than retry.
///
/// # Example
///
/// ```rust,ignore
/// use hakim_rag::EmbeddingProvider;
///
/// let vector = provider.embed("herbs for fever").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning vectors in input order.
    ///
    /// Defaults to sequential [`embed`](EmbeddingProvider::embed) calls;
    /// backends with a native batch endpoint override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimensionality of the vectors this backend produces.
    fn dimensions(&self) -> usize;
}
