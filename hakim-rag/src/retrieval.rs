//! Relevance scoring over the corpus.
//!
//! [`RelevanceScorer`] prefers vector similarity when an
//! [`EmbeddingProvider`] is configured and falls back to
//! [`KeywordScorer`] for the call on any embedding failure. Retrieval never
//! returns an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CachedEmbedding, EmbeddingCache, cosine_similarity};
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::keyword::KeywordScorer;
use crate::plant::PlantRecord;

/// Which strategy produced a [`RetrievalResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Cosine similarity of embeddings.
    Vector,
    /// Weighted keyword containment.
    Keyword,
}

/// One scored record for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    /// The scored record.
    pub record: PlantRecord,
    /// Index of the record in the corpus it was scored from.
    pub position: usize,
    /// Relevance in `[0, 1]`.
    pub similarity: f32,
    /// The record's flattened text.
    pub derived_text: String,
    /// The strategy that scored it.
    pub strategy: ScoringStrategy,
}

/// Sort by descending similarity and keep the first `k`.
///
/// The sort is stable, so equal similarities keep their corpus order.
pub(crate) fn rank(mut results: Vec<RetrievalResult>, k: usize) -> Vec<RetrievalResult> {
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(k);
    results
}

/// Ranks corpus records against a query.
///
/// The embedding cache is owned by the scorer (or injected with
/// [`with_cache`](RelevanceScorer::with_cache)) and filled lazily the first
/// time a record is scored with the vector strategy.
///
/// # Example
///
/// ```rust,ignore
/// use hakim_rag::{RagConfig, RelevanceScorer};
///
/// let scorer = RelevanceScorer::new(&RagConfig::default()).with_embedder(embedder);
/// let top = scorer.retrieve_top_k("herbs for fever", &plants, 3).await;
/// ```
pub struct RelevanceScorer {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    cache: EmbeddingCache,
    keyword: KeywordScorer,
    similarity_threshold: f32,
    embedding_timeout: Duration,
}

impl RelevanceScorer {
    /// Create a keyword-only scorer from the configuration.
    pub fn new(config: &RagConfig) -> Self {
        Self {
            embedder: None,
            cache: EmbeddingCache::new(),
            keyword: KeywordScorer::new(config.keyword.clone()),
            similarity_threshold: config.similarity_threshold,
            embedding_timeout: config.embedding_timeout,
        }
    }

    /// Enable the vector strategy with the given backend.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Use an existing cache instead of a fresh one.
    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = cache;
        self
    }

    /// The embedding cache.
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Whether an embedding backend is configured.
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Return at most `k` results sorted by descending similarity.
    ///
    /// Vector failures (network, malformed vectors, timeouts) are logged
    /// and the call is answered with keyword scoring instead.
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        corpus: &[PlantRecord],
        k: usize,
    ) -> Vec<RetrievalResult> {
        if k == 0 || corpus.is_empty() {
            return Vec::new();
        }

        if let Some(embedder) = &self.embedder {
            match self.vector_top_k(embedder.as_ref(), query, corpus, k).await {
                Ok(results) => {
                    info!(
                        strategy = "vector",
                        result_count = results.len(),
                        top_similarity = results.first().map(|r| r.similarity),
                        "retrieval completed"
                    );
                    return results;
                }
                Err(e) => {
                    warn!(
                        provider = embedder.name(),
                        error = %e,
                        "vector retrieval failed, using keyword scoring"
                    );
                }
            }
        }

        let results = self.keyword.rank(query, corpus, k);
        info!(
            strategy = "keyword",
            result_count = results.len(),
            top_similarity = results.first().map(|r| r.similarity),
            "retrieval completed"
        );
        results
    }

    async fn vector_top_k(
        &self,
        embedder: &dyn EmbeddingProvider,
        query: &str,
        corpus: &[PlantRecord],
        k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        self.ensure_embedded(embedder, corpus).await?;

        let query_embedding = tokio::time::timeout(self.embedding_timeout, embedder.embed(query))
            .await
            .map_err(|_| RagError::Timeout {
                operation: "query embedding",
                after: self.embedding_timeout,
            })??;

        if query_embedding.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: "query embedding is empty".to_string(),
            });
        }

        let entries = self.cache.get_many(corpus.iter().map(PlantRecord::key)).await;
        let mut scored = Vec::with_capacity(corpus.len());
        for (position, (record, entry)) in corpus.iter().zip(entries).enumerate() {
            let entry = entry.ok_or_else(|| RagError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: format!("no cached embedding for '{}'", record.key()),
            })?;
            if entry.embedding.len() != query_embedding.len() {
                return Err(RagError::EmbeddingError {
                    provider: embedder.name().to_string(),
                    message: format!(
                        "dimension mismatch: record '{}' has {}, query has {}",
                        record.key(),
                        entry.embedding.len(),
                        query_embedding.len()
                    ),
                });
            }

            let similarity = normalize(cosine_similarity(&entry.embedding, &query_embedding));
            if similarity >= self.similarity_threshold {
                scored.push(RetrievalResult {
                    record: record.clone(),
                    position,
                    similarity,
                    derived_text: entry.text.clone(),
                    strategy: ScoringStrategy::Vector,
                });
            }
        }

        Ok(rank(scored, k))
    }

    /// Embed and cache every corpus record that has no cache entry yet.
    async fn ensure_embedded(
        &self,
        embedder: &dyn EmbeddingProvider,
        corpus: &[PlantRecord],
    ) -> Result<()> {
        let missing: HashSet<&str> =
            self.cache.missing(corpus.iter().map(PlantRecord::key)).await.into_iter().collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let pending: Vec<(&str, String)> = corpus
            .iter()
            .filter(|record| missing.contains(record.key()) && seen.insert(record.key()))
            .map(|record| (record.key(), record.derived_text()))
            .collect();
        let texts: Vec<&str> = pending.iter().map(|(_, text)| text.as_str()).collect();

        debug!(provider = embedder.name(), batch_size = texts.len(), "embedding corpus records");
        let vectors = tokio::time::timeout(self.embedding_timeout, embedder.embed_batch(&texts))
            .await
            .map_err(|_| RagError::Timeout {
                operation: "corpus embedding",
                after: self.embedding_timeout,
            })??;

        if vectors.len() != pending.len() {
            return Err(RagError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: format!("expected {} embeddings, got {}", pending.len(), vectors.len()),
            });
        }

        let added = self
            .cache
            .insert_missing(pending.into_iter().zip(vectors).map(|((key, text), embedding)| {
                (key.to_string(), CachedEmbedding { embedding, text })
            }))
            .await;
        debug!(provider = embedder.name(), added, "embedding cache populated");
        Ok(())
    }
}

/// Map a cosine similarity onto `[0, 1]` for ranking.
fn normalize(similarity: f32) -> f32 {
    if similarity.is_nan() { 0.0 } else { similarity.clamp(0.0, 1.0) }
}
