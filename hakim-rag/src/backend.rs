//! HTTP plumbing shared by the hosted backends.

use serde::Deserialize;
use tracing::error;

use crate::error::{RagError, Result};

// Both Gemini and OpenAI wrap failures as `{"error": {"message": ...}}`.
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Which kind of call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Embedding,
    Generation,
}

impl CallKind {
    fn error(self, provider: &str, message: String) -> RagError {
        let provider = provider.to_string();
        match self {
            CallKind::Embedding => RagError::EmbeddingError { provider, message },
            CallKind::Generation => RagError::GenerationError { provider, message },
        }
    }
}

/// Map a transport failure (connect, TLS, body read) to a backend error.
pub(crate) fn transport_error(provider: &str, kind: CallKind, err: reqwest::Error) -> RagError {
    error!(provider, error = %err, "request failed");
    kind.error(provider, format!("request failed: {err}"))
}

/// Map a body that did not decode into the expected shape.
pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> RagError {
    let message = message.into();
    error!(provider, %message, "malformed response");
    RagError::MalformedResponse { provider: provider.to_string(), message }
}

/// Pass successful responses through; classify everything else.
pub(crate) async fn check_status(
    provider: &str,
    kind: CallKind,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    error!(provider, %status, "API error");

    match RagError::from_backend_status(provider, status.as_u16(), &detail) {
        RagError::GenerationError { message, .. } => Err(kind.error(provider, message)),
        classified => Err(classified),
    }
}
