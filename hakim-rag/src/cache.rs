//! Per-scorer cache of corpus embeddings.
//!
//! [`EmbeddingCache`] maps a record's key to its embedding and derived
//! text. Entries are written once and never replaced, so concurrent
//! populators converge on the same state; readers only take the read lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// One cached record embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEmbedding {
    /// The record's embedding vector.
    pub embedding: Vec<f32>,
    /// The derived text that was embedded.
    pub text: String,
}

/// An append-only map from record key to [`CachedEmbedding`].
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingCache {
    entries: Arc<RwLock<HashMap<String, Arc<CachedEmbedding>>>>,
}

impl EmbeddingCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for `key`.
    pub async fn get(&self, key: &str) -> Option<Arc<CachedEmbedding>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Look up several keys under a single read lock, preserving input order.
    pub async fn get_many<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Option<Arc<CachedEmbedding>>> {
        let entries = self.entries.read().await;
        keys.into_iter().map(|key| entries.get(key).cloned()).collect()
    }

    /// Keys from `keys` that have no entry yet, in input order.
    pub async fn missing<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let entries = self.entries.read().await;
        keys.into_iter().filter(|key| !entries.contains_key(*key)).collect()
    }

    /// Insert entries that are not already present.
    ///
    /// Existing entries win, which keeps racing populators from replacing a
    /// vector another reader has already scored against. Returns how many
    /// entries were added.
    pub async fn insert_missing(
        &self,
        entries: impl IntoIterator<Item = (String, CachedEmbedding)>,
    ) -> usize {
        let mut map = self.entries.write().await;
        let mut added = 0;
        for (key, entry) in entries {
            map.entry(key).or_insert_with(|| {
                added += 1;
                Arc::new(entry)
            });
        }
        added
    }

    /// Number of cached records.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry.
    pub async fn reset(&self) {
        self.entries.write().await.clear();
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
