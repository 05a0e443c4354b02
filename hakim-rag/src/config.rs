//! Configuration for retrieval, prompt budgeting, and answer generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::TRUNCATION_MARKER;
use crate::error::{RagError, Result};

/// Configuration parameters for the answer pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Number of records retrieved for the generation prompt.
    pub top_k: usize,
    /// Minimum similarity for a vector-strategy result to be kept.
    pub similarity_threshold: f32,
    /// Top similarity above which a generated answer is reported as `high` confidence.
    pub high_confidence_threshold: f32,
    /// Hard budget for one generation call.
    pub generation_timeout: Duration,
    /// Budget for one embedding call (query or corpus batch).
    pub embedding_timeout: Duration,
    /// Maximum characters in the assembled prompt.
    pub max_prompt_chars: usize,
    /// Context characters below which generation is skipped entirely.
    pub min_context_chars: usize,
    /// Keyword-strategy weights and boosts.
    pub keyword: KeywordWeights,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.0,
            high_confidence_threshold: 0.7,
            generation_timeout: Duration::from_secs(20),
            embedding_timeout: Duration::from_secs(10),
            max_prompt_chars: 30_000,
            min_context_chars: 1_000,
            keyword: KeywordWeights::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k == 0`
    /// - either threshold is outside `[0, 1]`
    /// - either timeout is zero
    /// - `min_context_chars >= max_prompt_chars`
    /// - `min_context_chars` cannot hold the truncation marker plus one character
    /// - the keyword normalizer is not positive
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RagError::ConfigError(format!(
                    "{name} ({value}) must be within [0, 1]"
                )));
            }
        }
        if self.generation_timeout.is_zero() || self.embedding_timeout.is_zero() {
            return Err(RagError::ConfigError("timeouts must be greater than zero".to_string()));
        }
        if self.min_context_chars >= self.max_prompt_chars {
            return Err(RagError::ConfigError(format!(
                "min_context_chars ({}) must be less than max_prompt_chars ({})",
                self.min_context_chars, self.max_prompt_chars
            )));
        }
        let marker_chars = TRUNCATION_MARKER.chars().count();
        if self.min_context_chars <= marker_chars {
            return Err(RagError::ConfigError(format!(
                "min_context_chars ({}) must exceed the truncation marker length ({marker_chars})",
                self.min_context_chars
            )));
        }
        if self.keyword.normalizer <= 0.0 {
            return Err(RagError::ConfigError("keyword normalizer must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of records retrieved for generation.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity for vector-strategy results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the similarity cut-point for `high` confidence.
    pub fn high_confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.high_confidence_threshold = threshold;
        self
    }

    /// Set the generation timeout.
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    /// Set the embedding timeout.
    pub fn embedding_timeout(mut self, timeout: Duration) -> Self {
        self.config.embedding_timeout = timeout;
        self
    }

    /// Set the prompt character ceiling.
    pub fn max_prompt_chars(mut self, chars: usize) -> Self {
        self.config.max_prompt_chars = chars;
        self
    }

    /// Set the minimum context space required to attempt generation.
    pub fn min_context_chars(mut self, chars: usize) -> Self {
        self.config.min_context_chars = chars;
        self
    }

    /// Replace the keyword weights.
    pub fn keyword_weights(mut self, weights: KeywordWeights) -> Self {
        self.config.keyword = weights;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Weights for the keyword-scoring strategy.
///
/// The defaults are empirically tuned; only the relative ordering they
/// produce matters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeywordWeights {
    /// Query term found in `uses`.
    pub uses: f32,
    /// Query term found in `symptoms`.
    pub symptoms: f32,
    /// Query term found in the scientific name.
    pub scientific_name: f32,
    /// Query term found in the local name.
    pub local_name: f32,
    /// Raw scores are divided by this and clamped to 1.
    pub normalizer: f32,
    /// Condition boosts applied on top of term matches.
    pub boosts: Vec<ConditionBoost>,
}

impl Default for KeywordWeights {
    fn default() -> Self {
        Self {
            uses: 3.0,
            symptoms: 2.0,
            scientific_name: 2.0,
            local_name: 1.0,
            normalizer: 10.0,
            boosts: default_boosts(),
        }
    }
}

/// A condition keyword and the `uses` synonyms that earn a boost for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionBoost {
    /// Substring looked for in the lowercased query.
    pub trigger: String,
    /// Substrings looked for in the record's lowercased `uses`.
    pub synonyms: Vec<String>,
    /// Score added when the trigger and any synonym both match.
    pub weight: f32,
}

impl ConditionBoost {
    /// Create a boost entry.
    pub fn new(trigger: &str, synonyms: &[&str], weight: f32) -> Self {
        Self {
            trigger: trigger.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            weight,
        }
    }
}

fn default_boosts() -> Vec<ConditionBoost> {
    vec![
        ConditionBoost::new("fever", &["fever", "temperature"], 2.0),
        ConditionBoost::new("headache", &["headache", "pain", "migraine"], 2.0),
        ConditionBoost::new("stomach", &["stomach", "gastro", "digest"], 2.0),
        ConditionBoost::new("skin", &["skin", "dermat", "wound"], 2.0),
        ConditionBoost::new(
            "diabetes",
            &["diabetes", "diabetic", "blood sugar", "glucose", "blood glucose", "sugar"],
            4.0,
        ),
        ConditionBoost::new("cough", &["cough", "respiratory", "bronchitis", "asthma"], 2.0),
        ConditionBoost::new("cold", &["cold", "flu", "respiratory", "nasal"], 2.0),
        ConditionBoost::new("pain", &["pain", "analgesic", "anti-inflammatory"], 2.0),
        ConditionBoost::new("digest", &["digest", "stomach", "gastro", "intestinal"], 2.0),
        ConditionBoost::new("liver", &["liver", "hepat", "jaundice"], 2.0),
        ConditionBoost::new("kidney", &["kidney", "renal", "urinary"], 2.0),
    ]
}
