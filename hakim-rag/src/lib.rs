//! # hakim-rag
//!
//! Retrieval-augmented question answering over a corpus of medicinal plant
//! records.
//!
//! ## Overview
//!
//! A question goes through the [`AnswerGenerator`], which:
//!
//! 1. loads the corpus from a [`CorpusProvider`],
//! 2. ranks records with the [`RelevanceScorer`] (vector similarity when an
//!    [`EmbeddingProvider`] is configured, keyword scoring otherwise or on
//!    failure),
//! 3. builds a bounded prompt with [`PromptBuilder`] and asks a
//!    [`TextGenerator`] under a timeout,
//! 4. degrades to the deterministic [`FallbackAnswerer`] and finally to a
//!    fixed safety answer whenever a step fails.
//!
//! Every query receives a non-empty [`RagAnswer`] from
//! [`AnswerGenerator::answer`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hakim_rag::{AnswerGenerator, CachedCorpus, JsonFileCorpus};
//!
//! let corpus = CachedCorpus::new(JsonFileCorpus::new("data/medicinal_plants.json"));
//! let generator = AnswerGenerator::builder().corpus(Arc::new(corpus)).build()?;
//!
//! let answer = generator.answer("What herbs help with diabetes?").await;
//! println!("{} ({})", answer.answer, answer.confidence);
//! ```
//!
//! ## Features
//!
//! | Feature | Backend |
//! |---------|---------|
//! | `gemini` | [`gemini::GeminiClient`], generation and embeddings over the Gemini REST API |
//! | `openai` | [`openai::OpenAIClient`], any OpenAI-compatible endpoint |
//! | `full` | both |

pub mod answer;
pub mod cache;
pub mod config;
pub mod context;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod fallback;
pub mod generation;
pub mod keyword;
pub mod pipeline;
pub mod plant;
pub mod retrieval;

#[cfg(any(feature = "gemini", feature = "openai"))]
mod backend;
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

pub use answer::{AnswerMethod, Confidence, RagAnswer, Source};
pub use cache::{CachedEmbedding, EmbeddingCache, cosine_similarity};
pub use config::{ConditionBoost, KeywordWeights, RagConfig, RagConfigBuilder};
pub use context::{AssembledPrompt, PromptBuilder, build_context};
pub use corpus::{CachedCorpus, CorpusProvider, InMemoryCorpus, JsonFileCorpus, PlantFilter};
pub use embedding::EmbeddingProvider;
pub use error::{ErrorClass, RagError, Result};
pub use fallback::{FallbackAnswerer, safety_answer};
pub use generation::{TextGenerator, generate_within};
pub use keyword::KeywordScorer;
pub use pipeline::{AnswerGenerator, AnswerGeneratorBuilder, DegradeReason, TierOutcome};
pub use plant::PlantRecord;
pub use retrieval::{RelevanceScorer, RetrievalResult, ScoringStrategy};

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
#[cfg(feature = "openai")]
pub use openai::OpenAIClient;
