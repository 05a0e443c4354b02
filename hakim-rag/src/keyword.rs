//! Multi-signal keyword scoring.
//!
//! Used when no embedding backend is configured, and whenever the vector
//! strategy fails for a call. Scores are raw weighted term hits plus
//! condition boosts, divided by the configured normalizer and clamped to 1.

use tracing::debug;

use crate::config::KeywordWeights;
use crate::plant::PlantRecord;
use crate::retrieval::{RetrievalResult, ScoringStrategy, rank};

/// Scores records by weighted query-term containment.
#[derive(Debug, Clone, Default)]
pub struct KeywordScorer {
    weights: KeywordWeights,
}

impl KeywordScorer {
    /// Create a scorer with the given weights.
    pub fn new(weights: KeywordWeights) -> Self {
        Self { weights }
    }

    /// The weights in use.
    pub fn weights(&self) -> &KeywordWeights {
        &self.weights
    }

    /// Normalized relevance of `record` for `query`, in `[0, 1]`.
    pub fn score(&self, query: &str, record: &PlantRecord) -> f32 {
        let query = query.to_lowercase();
        let terms = query_terms(&query);
        self.score_prepared(&query, &terms, &LoweredFields::from(record))
    }

    /// Score every record and return the best `k` with a non-zero score.
    ///
    /// Ties keep corpus order.
    pub fn rank(&self, query: &str, corpus: &[PlantRecord], k: usize) -> Vec<RetrievalResult> {
        let query = query.to_lowercase();
        let terms = query_terms(&query);

        let scored: Vec<RetrievalResult> = corpus
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let similarity = self.score_prepared(&query, &terms, &LoweredFields::from(record));
                (similarity > 0.0).then(|| RetrievalResult {
                    record: record.clone(),
                    position,
                    similarity,
                    derived_text: record.derived_text(),
                    strategy: ScoringStrategy::Keyword,
                })
            })
            .collect();

        let matched = scored.len();
        let results = rank(scored, k);
        debug!(
            term_count = terms.len(),
            matched,
            result_count = results.len(),
            top_similarity = results.first().map(|r| r.similarity),
            "keyword scoring completed"
        );
        results
    }

    fn score_prepared(&self, query: &str, terms: &[&str], fields: &LoweredFields) -> f32 {
        let w = &self.weights;
        let mut raw = 0.0;

        for &term in terms {
            if fields.uses.contains(term) {
                raw += w.uses;
            }
            if fields.symptoms.contains(term) {
                raw += w.symptoms;
            }
            if fields.scientific_name.contains(term) {
                raw += w.scientific_name;
            }
            if fields.local_name.contains(term) {
                raw += w.local_name;
            }
        }

        for boost in &w.boosts {
            if query.contains(boost.trigger.as_str())
                && boost.synonyms.iter().any(|s| fields.uses.contains(s.as_str()))
            {
                raw += boost.weight;
            }
        }

        (raw / w.normalizer).clamp(0.0, 1.0)
    }
}

/// Split a lowercased query into scoring terms.
///
/// Terms are whitespace-separated words with surrounding punctuation
/// stripped, longer than two characters. Repeated words count repeatedly.
pub fn query_terms(lowered: &str) -> Vec<&str> {
    lowered
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|term| term.chars().count() > 2)
        .collect()
}

struct LoweredFields {
    uses: String,
    symptoms: String,
    scientific_name: String,
    local_name: String,
}

impl From<&PlantRecord> for LoweredFields {
    fn from(record: &PlantRecord) -> Self {
        Self {
            uses: record.uses.as_deref().unwrap_or_default().to_lowercase(),
            symptoms: record.symptoms.as_deref().unwrap_or_default().to_lowercase(),
            scientific_name: record.scientific_name.to_lowercase(),
            local_name: record.local_name.to_lowercase(),
        }
    }
}
