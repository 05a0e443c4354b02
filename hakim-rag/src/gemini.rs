//! Gemini backend for generation and embeddings.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{CallKind, check_status, malformed, transport_error};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::TextGenerator;

const PROVIDER: &str = "Gemini";

/// The public Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";

const DEFAULT_DIMENSIONS: usize = 768;

/// A client for the Gemini REST API.
///
/// One client serves both roles: it implements [`TextGenerator`] with
/// `generateContent` and [`EmbeddingProvider`] with `embedContent` /
/// `batchEmbedContents`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use hakim_rag::gemini::GeminiClient;
///
/// let gemini = Arc::new(GeminiClient::from_env()?);
/// let generator = AnswerGenerator::builder()
///     .corpus(corpus)
///     .text_generator(gemini.clone())
///     .embedding_provider(gemini)
///     .build()?;
/// ```
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: String,
    dimensions: usize,
}

impl GeminiClient {
    /// Create a client with the default models.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Authentication`] if `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::Authentication {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| RagError::Authentication {
            provider: PROVIDER.into(),
            message: "GEMINI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the generation model (e.g. `gemini-1.5-pro`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model and its output size.
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embedding_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The generation model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        kind: CallKind,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, kind, e))?;
        check_status(PROVIDER, kind, response).await
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self { parts: vec![Part { text: Some(text.to_string()) }] }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Values,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Values>,
}

#[derive(Deserialize)]
struct Values {
    values: Vec<f32>,
}

// ── Trait implementations ──────────────────────────────────────────

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "generating");

        let body = GenerateRequest { contents: vec![Content::text(prompt)] };
        let url = self.url(&self.model, "generateContent");
        let response = self.post(&url, &body, CallKind::Generation).await?;
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| malformed(PROVIDER, format!("failed to parse response: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| malformed(PROVIDER, "response has no candidate text"))
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let body = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content::text(text),
            task_type: "RETRIEVAL_QUERY",
        };
        let response = self
            .post(&self.url(&self.embedding_model, "embedContent"), &body, CallKind::Embedding)
            .await?;
        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| malformed(PROVIDER, format!("failed to parse response: {e}")))?;
        Ok(parsed.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(provider = PROVIDER, batch_size = texts.len(), "embedding batch");

        let model = format!("models/{}", self.embedding_model);
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: model.clone(),
                    content: Content::text(text),
                    task_type: "RETRIEVAL_DOCUMENT",
                })
                .collect(),
        };
        let url = self.url(&self.embedding_model, "batchEmbedContents");
        let response = self.post(&url, &body, CallKind::Embedding).await?;
        let parsed: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| malformed(PROVIDER, format!("failed to parse response: {e}")))?;
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
