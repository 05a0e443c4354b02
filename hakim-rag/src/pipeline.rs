//! Answer orchestration.
//!
//! The [`AnswerGenerator`] runs a query through up to four tiers, each
//! attempted only when the previous one could not produce an answer:
//!
//! 1. no generator configured: go straight to tier 3
//! 2. RAG: retrieve, assemble the prompt, generate under a timeout
//! 3. fallback: template answer from the retrieved records and the corpus
//! 4. error fallback: fixed safety answer when the corpus itself failed
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hakim_rag::{AnswerGenerator, JsonFileCorpus, RagConfig};
//!
//! let generator = AnswerGenerator::builder()
//!     .config(RagConfig::default())
//!     .corpus(Arc::new(JsonFileCorpus::new("data/medicinal_plants.json")))
//!     .text_generator(Arc::new(gemini))      // optional
//!     .embedding_provider(Arc::new(embedder)) // optional
//!     .build()?;
//!
//! let answer = generator.answer("What herbs help with fever?").await;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::answer::{AnswerMethod, Confidence, RagAnswer, Source};
use crate::cache::EmbeddingCache;
use crate::config::RagConfig;
use crate::context::{PromptBuilder, build_context};
use crate::corpus::CorpusProvider;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::fallback::{FallbackAnswerer, safety_answer};
use crate::generation::{TextGenerator, generate_within};
use crate::plant::PlantRecord;
use crate::retrieval::{RelevanceScorer, RetrievalResult};

/// Why the RAG tier handed over to the fallback tier.
#[derive(Debug)]
pub enum DegradeReason {
    /// No text generator is configured.
    NoGenerator,
    /// Retrieval found no relevant record.
    NoRelevantRecords,
    /// The prompt budget left too little room for context.
    PromptBudget(RagError),
    /// The generation call failed, timed out, or returned nothing usable.
    Generation(RagError),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::NoGenerator => f.write_str("no text generator configured"),
            DegradeReason::NoRelevantRecords => f.write_str("no relevant records"),
            DegradeReason::PromptBudget(e) => write!(f, "prompt budget: {e}"),
            DegradeReason::Generation(e) => write!(f, "generation failed: {e}"),
        }
    }
}

/// Result of one tier: either a finished answer or a hand-over to the next tier.
#[derive(Debug)]
pub enum TierOutcome {
    /// The tier produced the answer.
    Answered(RagAnswer),
    /// The tier gave up; `retrieved` carries whatever it had already ranked.
    Degrade {
        /// Why the tier gave up.
        reason: DegradeReason,
        /// Records retrieved before giving up, best first.
        retrieved: Vec<RetrievalResult>,
    },
}

/// Orchestrates retrieval, generation and the fallback tiers.
///
/// Construct one via [`AnswerGenerator::builder()`]. The generator is safe to
/// share between concurrent queries; the only shared mutable state is the
/// scorer's append-only embedding cache.
pub struct AnswerGenerator {
    config: RagConfig,
    corpus: Arc<dyn CorpusProvider>,
    scorer: RelevanceScorer,
    text_generator: Option<Arc<dyn TextGenerator>>,
    prompt_builder: PromptBuilder,
    fallback: FallbackAnswerer,
}

impl AnswerGenerator {
    /// Create a new [`AnswerGeneratorBuilder`].
    pub fn builder() -> AnswerGeneratorBuilder {
        AnswerGeneratorBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the relevance scorer.
    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Whether a text generator is configured.
    pub fn has_text_generator(&self) -> bool {
        self.text_generator.is_some()
    }

    /// Answer `query`. Never fails and never returns an empty answer.
    ///
    /// Errors that escape [`generate_answer`](Self::generate_answer) (an
    /// unreadable or empty corpus) produce the generic safety answer.
    pub async fn answer(&self, query: &str) -> RagAnswer {
        match self.generate_answer(query).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(tier = "error-fallback", error = %e, "answer pipeline failed");
                safety_answer()
            }
        }
    }

    /// Answer `query`, surfacing corpus failures to the caller.
    ///
    /// Backend failures never surface here; they degrade to the fallback
    /// tier. Use this when the caller wants to translate the escaped error
    /// (see [`RagError::class`]).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorpusError`] or [`RagError::EmptyCorpus`] if the
    /// corpus cannot supply any record.
    pub async fn generate_answer(&self, query: &str) -> Result<RagAnswer> {
        let corpus = self.corpus.load().await?;
        if corpus.is_empty() {
            return Err(RagError::EmptyCorpus);
        }
        debug!(query, corpus_size = corpus.len(), "answering query");

        let outcome = match &self.text_generator {
            None => {
                TierOutcome::Degrade { reason: DegradeReason::NoGenerator, retrieved: Vec::new() }
            }
            Some(generator) => self.rag_tier(query, &corpus, generator.as_ref()).await,
        };

        let answer = match outcome {
            TierOutcome::Answered(answer) => answer,
            TierOutcome::Degrade { reason, retrieved } => {
                match reason {
                    DegradeReason::NoGenerator => {
                        debug!(tier = "fallback", reason = %reason, "skipping generation")
                    }
                    _ => warn!(tier = "fallback", reason = %reason, "degrading to fallback answer"),
                }
                self.fallback_tier(query, &corpus, &retrieved)
            }
        };

        info!(
            query_len = query.len(),
            method = %answer.method,
            confidence = %answer.confidence,
            source_count = answer.sources.len(),
            "answer ready"
        );
        Ok(answer)
    }

    /// Rank the corpus for `query` with the configured `top_k`.
    ///
    /// Diagnostic access to the same retrieval the RAG tier uses.
    ///
    /// # Errors
    ///
    /// Returns the corpus provider's error if the corpus cannot be loaded.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let corpus = self.corpus.load().await?;
        Ok(self.scorer.retrieve_top_k(query, &corpus, self.config.top_k).await)
    }

    async fn rag_tier(
        &self,
        query: &str,
        corpus: &[PlantRecord],
        generator: &dyn TextGenerator,
    ) -> TierOutcome {
        let retrieved = self.scorer.retrieve_top_k(query, corpus, self.config.top_k).await;
        let Some(top_similarity) = retrieved.first().map(|r| r.similarity) else {
            return TierOutcome::Degrade { reason: DegradeReason::NoRelevantRecords, retrieved };
        };

        let context = build_context(&retrieved);
        let prompt = match self.prompt_builder.assemble(query, &context) {
            Ok(prompt) => prompt,
            Err(e) => {
                return TierOutcome::Degrade { reason: DegradeReason::PromptBudget(e), retrieved };
            }
        };

        match generate_within(generator, &prompt.text, self.config.generation_timeout).await {
            Ok(text) => {
                let confidence = if top_similarity > self.config.high_confidence_threshold {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                TierOutcome::Answered(RagAnswer {
                    answer: text,
                    confidence,
                    sources: retrieved.iter().map(Source::from).collect(),
                    method: AnswerMethod::Rag,
                })
            }
            Err(e) => TierOutcome::Degrade { reason: DegradeReason::Generation(e), retrieved },
        }
    }

    /// Template answer over the corpus with retrieved records moved to the front.
    ///
    /// The fallback answerer takes the first substring match, so records the
    /// scorer already judged relevant win over the rest of the corpus.
    fn fallback_tier(
        &self,
        query: &str,
        corpus: &[PlantRecord],
        retrieved: &[RetrievalResult],
    ) -> RagAnswer {
        if retrieved.is_empty() {
            return self.fallback.answer(query, corpus);
        }

        let mut prioritized: Vec<PlantRecord> =
            retrieved.iter().map(|r| r.record.clone()).collect();
        prioritized.extend(
            corpus
                .iter()
                .enumerate()
                .filter(|(position, _)| !retrieved.iter().any(|r| r.position == *position))
                .map(|(_, record)| record.clone()),
        );
        self.fallback.answer(query, &prioritized)
    }
}

/// Builder for constructing an [`AnswerGenerator`].
///
/// Only the corpus is required. Without a text generator every query is
/// answered by the fallback tier; without an embedding provider retrieval
/// uses keyword scoring.
#[derive(Default)]
pub struct AnswerGeneratorBuilder {
    config: Option<RagConfig>,
    corpus: Option<Arc<dyn CorpusProvider>>,
    text_generator: Option<Arc<dyn TextGenerator>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    cache: Option<EmbeddingCache>,
}

impl AnswerGeneratorBuilder {
    /// Set the configuration. Defaults to [`RagConfig::default()`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the corpus provider.
    pub fn corpus(mut self, corpus: Arc<dyn CorpusProvider>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Set the text generator.
    pub fn text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    /// Set the embedding provider for vector retrieval.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Share an existing embedding cache with the scorer.
    pub fn embedding_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the [`AnswerGenerator`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the corpus is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<AnswerGenerator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let corpus =
            self.corpus.ok_or_else(|| RagError::ConfigError("corpus is required".to_string()))?;

        let mut scorer = RelevanceScorer::new(&config);
        if let Some(provider) = self.embedding_provider {
            scorer = scorer.with_embedder(provider);
        }
        if let Some(cache) = self.cache {
            scorer = scorer.with_cache(cache);
        }

        Ok(AnswerGenerator {
            prompt_builder: PromptBuilder::from_config(&config),
            config,
            corpus,
            scorer,
            text_generator: self.text_generator,
            fallback: FallbackAnswerer::new(),
        })
    }
}
