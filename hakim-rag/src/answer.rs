//! The answer contract returned to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plant::PlantRecord;
use crate::retrieval::RetrievalResult;

/// How much the caller should trust an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Terminal safety answer; nothing specific was found.
    Low,
    /// Template answers and generated answers with moderate retrieval scores.
    Medium,
    /// Fixed intent answers and well-supported generated answers.
    High,
}

impl Confidence {
    /// Numeric equivalent for callers that want a float.
    pub fn score(self) -> f32 {
        match self {
            Confidence::Low => 0.5,
            Confidence::Medium => 0.7,
            Confidence::High => 0.9,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

/// Which tier produced an answer. For observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerMethod {
    /// Generated from retrieved context.
    Rag,
    /// Template answer from corpus records.
    Fallback,
    /// Generic safety answer after an unrecoverable error.
    ErrorFallback,
}

impl fmt::Display for AnswerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnswerMethod::Rag => "rag",
            AnswerMethod::Fallback => "fallback",
            AnswerMethod::ErrorFallback => "error-fallback",
        })
    }
}

/// A plant an answer was based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Scientific name.
    pub plant_name: String,
    /// Local name.
    pub local_name: String,
    /// Relevance in `[0, 1]`.
    pub similarity: f32,
}

impl Source {
    /// A source for `record` with the given similarity.
    pub fn from_record(record: &PlantRecord, similarity: f32) -> Self {
        Self {
            plant_name: record.scientific_name.clone(),
            local_name: record.local_name.clone(),
            similarity,
        }
    }
}

impl From<&RetrievalResult> for Source {
    fn from(result: &RetrievalResult) -> Self {
        Source::from_record(&result.record, result.similarity)
    }
}

/// The pipeline's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagAnswer {
    /// Answer text; never empty.
    pub answer: String,
    /// Confidence level.
    pub confidence: Confidence,
    /// Plants the answer was derived from, most relevant first.
    pub sources: Vec<Source>,
    /// The tier that produced the answer.
    pub method: AnswerMethod,
}
