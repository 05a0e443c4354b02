//! Corpus providers and structured plant lookup.
//!
//! The core never writes records. A [`CorpusProvider`] hands out an
//! immutable snapshot; [`CachedCorpus`] turns any provider into a
//! load-once-per-process snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{RagError, Result};
use crate::plant::PlantRecord;

/// A source of plant records.
///
/// # Example
///
/// ```rust,ignore
/// use hakim_rag::{CorpusProvider, JsonFileCorpus};
///
/// let corpus = JsonFileCorpus::new("data/medicinal_plants.json");
/// let plants = corpus.load().await?;
/// ```
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Load the ordered sequence of records.
    async fn load(&self) -> Result<Arc<[PlantRecord]>>;
}

/// A fixed, in-memory corpus.
#[derive(Debug, Clone)]
pub struct InMemoryCorpus {
    records: Arc<[PlantRecord]>,
}

impl InMemoryCorpus {
    /// Create a corpus serving the given records in order.
    pub fn new(records: impl Into<Vec<PlantRecord>>) -> Self {
        let records: Vec<PlantRecord> = records.into();
        Self { records: records.into() }
    }
}

#[async_trait]
impl CorpusProvider for InMemoryCorpus {
    async fn load(&self) -> Result<Arc<[PlantRecord]>> {
        Ok(Arc::clone(&self.records))
    }
}

/// Reads the flat JSON dataset (an array of plant objects) from disk.
///
/// The file is read on every [`load`](CorpusProvider::load). Records without
/// a scientific name are skipped.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    /// Create a provider for the dataset at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The dataset path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corpus_error(&self, message: impl Into<String>) -> RagError {
        RagError::CorpusError {
            source_name: self.path.display().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl CorpusProvider for JsonFileCorpus {
    async fn load(&self) -> Result<Arc<[PlantRecord]>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.corpus_error(format!("failed to read: {e}")))?;

        let parsed: Vec<PlantRecord> = serde_json::from_str(&raw)
            .map_err(|e| self.corpus_error(format!("failed to parse: {e}")))?;

        let total = parsed.len();
        let records: Vec<PlantRecord> = parsed
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                if record.scientific_name.trim().is_empty() {
                    warn!(
                        path = %self.path.display(),
                        index,
                        "skipping record without a scientific name"
                    );
                    None
                } else {
                    Some(record)
                }
            })
            .collect();

        debug!(path = %self.path.display(), total, kept = records.len(), "loaded corpus file");
        Ok(records.into())
    }
}

/// Wraps a provider so the corpus is loaded at most once per instance.
///
/// Concurrent first callers share a single initialization; a failed load is
/// not cached and the next call retries it.
pub struct CachedCorpus<P> {
    inner: P,
    snapshot: OnceCell<Arc<[PlantRecord]>>,
}

impl<P: CorpusProvider> CachedCorpus<P> {
    /// Cache the corpus served by `inner`.
    pub fn new(inner: P) -> Self {
        Self { inner, snapshot: OnceCell::new() }
    }

    /// Whether the snapshot has been populated.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.initialized()
    }

    /// Drop the snapshot so the next load reads from the inner provider again.
    pub fn reset(&mut self) {
        self.snapshot.take();
    }
}

#[async_trait]
impl<P: CorpusProvider> CorpusProvider for CachedCorpus<P> {
    async fn load(&self) -> Result<Arc<[PlantRecord]>> {
        let records = self
            .snapshot
            .get_or_try_init(|| async {
                let records = self.inner.load().await?;
                info!(record_count = records.len(), "corpus snapshot loaded");
                Ok::<_, RagError>(records)
            })
            .await?;
        Ok(Arc::clone(records))
    }
}

/// Structured lookup criteria over record fields.
///
/// Every supplied criterion must match (case-insensitive containment):
/// `symptom` against uses or symptoms, `name` against the local name and
/// `scientific_name` against the scientific name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantFilter {
    /// Condition or symptom text.
    pub symptom: Option<String>,
    /// Local name fragment.
    pub name: Option<String>,
    /// Scientific name fragment.
    pub scientific_name: Option<String>,
}

impl PlantFilter {
    /// Filter by symptom or use.
    pub fn symptom(mut self, symptom: impl Into<String>) -> Self {
        self.symptom = Some(symptom.into());
        self
    }

    /// Filter by local name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by scientific name.
    pub fn scientific_name(mut self, scientific_name: impl Into<String>) -> Self {
        self.scientific_name = Some(scientific_name.into());
        self
    }

    /// Return the matching records in corpus order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] if no non-blank criterion is set.
    pub fn apply<'a>(&self, records: &'a [PlantRecord]) -> Result<Vec<&'a PlantRecord>> {
        let symptom = lowered(&self.symptom);
        let name = lowered(&self.name);
        let scientific_name = lowered(&self.scientific_name);

        if symptom.is_none() && name.is_none() && scientific_name.is_none() {
            return Err(RagError::EmptyQuery);
        }

        Ok(records
            .iter()
            .filter(|plant| {
                symptom.as_deref().is_none_or(|s| {
                    contains(&plant.uses, s) || contains(&plant.symptoms, s)
                })
            })
            .filter(|plant| {
                name.as_deref().is_none_or(|n| plant.local_name.to_lowercase().contains(n))
            })
            .filter(|plant| {
                scientific_name
                    .as_deref()
                    .is_none_or(|n| plant.scientific_name.to_lowercase().contains(n))
            })
            .collect())
    }
}

fn lowered(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
}

fn contains(field: &Option<String>, needle: &str) -> bool {
    field.as_deref().is_some_and(|text| text.to_lowercase().contains(needle))
}
