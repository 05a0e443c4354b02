//! Error types for the `hakim-rag` crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while answering a query.
///
/// Most of these never leave the [`AnswerGenerator`](crate::AnswerGenerator):
/// backend failures degrade to the next tier instead of propagating. The
/// corpus variants are the ones a caller of
/// [`generate_answer`](crate::AnswerGenerator::generate_answer) can observe.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The text generation backend failed.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Backend credentials are missing or were rejected.
    #[error("Authentication error ({provider}): {message}")]
    Authentication {
        /// The backend that rejected the credentials.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backend refused the call because of a rate limit or exhausted quota.
    #[error("Rate limited ({provider}): {message}")]
    RateLimited {
        /// The backend that throttled the call.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backend answered, but not with anything usable.
    #[error("Malformed response ({provider}): {message}")]
    MalformedResponse {
        /// The backend that produced the response.
        provider: String,
        /// What was wrong with it.
        message: String,
    },

    /// An external call did not settle within its budget.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// The operation that was abandoned.
        operation: &'static str,
        /// The budget that elapsed.
        after: Duration,
    },

    /// The corpus could not be read or parsed.
    #[error("Corpus error ({source_name}): {message}")]
    CorpusError {
        /// The corpus source (file path or provider name).
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// The corpus was read successfully but holds no records.
    #[error("Corpus is empty")]
    EmptyCorpus,

    /// Not even the minimum context fits next to the instructions and question.
    #[error(
        "Prompt budget exceeded: {available} characters available for context, {minimum} required"
    )]
    PromptBudgetExceeded {
        /// Characters left for the context block.
        available: usize,
        /// The configured context floor.
        minimum: usize,
    },

    /// The query was empty or whitespace.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Coarse error classes surfaced to the calling layer.
///
/// The caller translates a class into its own vocabulary (HTTP status,
/// process exit code) without inspecting individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Missing or invalid credentials, or invalid configuration.
    Configuration,
    /// Rate limit or quota exhaustion at a backend.
    RateLimited,
    /// The request itself was unusable.
    InvalidInput,
    /// Anything else.
    Internal,
}

impl ErrorClass {
    /// The HTTP status an API layer should answer with for this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::Configuration => 401,
            ErrorClass::RateLimited => 429,
            ErrorClass::InvalidInput => 400,
            ErrorClass::Internal => 500,
        }
    }
}

impl RagError {
    /// Classify this error for the calling layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            RagError::Authentication { .. } | RagError::ConfigError(_) => ErrorClass::Configuration,
            RagError::RateLimited { .. } => ErrorClass::RateLimited,
            RagError::EmptyQuery => ErrorClass::InvalidInput,
            _ => ErrorClass::Internal,
        }
    }

    /// Build the error for a failed backend HTTP exchange from its status and body.
    ///
    /// 401/403 (and Gemini's "API key not valid" 400) are credential
    /// problems; 429 or a body mentioning quota is throttling.
    pub fn from_backend_status(provider: &str, status: u16, detail: &str) -> Self {
        let lowered = detail.to_lowercase();
        let provider = provider.to_string();
        let message = format!("API returned {status}: {detail}");
        let bad_key = status == 400 && lowered.contains("api key");
        if status == 401 || status == 403 || bad_key {
            RagError::Authentication { provider, message }
        } else if status == 429 || lowered.contains("quota") {
            RagError::RateLimited { provider, message }
        } else {
            RagError::GenerationError { provider, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_status_is_classified() {
        let err = RagError::from_backend_status(
            "Gemini",
            400,
            "API key not valid. Please pass a valid API key.",
        );
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert_eq!(err.class().status_code(), 401);

        let err = RagError::from_backend_status("Gemini", 429, "Resource has been exhausted");
        assert_eq!(err.class(), ErrorClass::RateLimited);

        let err = RagError::from_backend_status("OpenAI", 400, "You exceeded your current quota");
        assert_eq!(err.class(), ErrorClass::RateLimited);

        let err = RagError::from_backend_status("OpenAI", 503, "overloaded");
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.class().status_code(), 500);
    }

    #[test]
    fn server_error_mentioning_api_key_is_not_a_credential_problem() {
        let err = RagError::from_backend_status("Gemini", 500, "internal error validating API key");
        assert!(matches!(err, RagError::GenerationError { .. }));
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[test]
    fn corpus_and_input_errors_have_distinct_classes() {
        assert_eq!(RagError::EmptyQuery.class(), ErrorClass::InvalidInput);
        assert_eq!(RagError::EmptyCorpus.class(), ErrorClass::Internal);
        assert_eq!(RagError::ConfigError("top_k".into()).class(), ErrorClass::Configuration);
    }
}
