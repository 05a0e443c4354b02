//! Wiring of the optional generation and embedding backends.

use std::sync::Arc;

use hakim_rag::{EmbeddingProvider, RagError, TextGenerator};
use tracing::info;

use crate::cli::{BackendArgs, BackendKind};

/// The backends handed to the answer generator.
#[derive(Default)]
pub struct Backends {
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Backends {
    /// Offline: fallback answers and keyword retrieval.
    pub fn offline() -> Self {
        Self::default()
    }
}

/// Resolve `auto` to a concrete backend from the available keys.
pub fn resolve_kind(args: &BackendArgs) -> BackendKind {
    match args.backend {
        BackendKind::Auto if has_key(&args.gemini_api_key) => BackendKind::Gemini,
        BackendKind::Auto if has_key(&args.openai_api_key) => BackendKind::Openai,
        BackendKind::Auto => BackendKind::None,
        explicit => explicit,
    }
}

fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

/// Build the backends selected by `args`.
///
/// # Errors
///
/// Returns [`RagError::Authentication`] when the selected backend has no key
/// and [`RagError::ConfigError`] when it was not compiled in.
pub fn build(args: &BackendArgs) -> Result<Backends, RagError> {
    let kind = resolve_kind(args);
    info!(backend = ?kind, keyword_only = args.keyword_only, "selected backend");

    let mut backends = match kind {
        BackendKind::Auto | BackendKind::None => Backends::offline(),
        BackendKind::Gemini => gemini(args)?,
        BackendKind::Openai => openai(args)?,
    };
    if args.keyword_only {
        backends.embedder = None;
    }
    Ok(backends)
}

#[cfg(feature = "gemini")]
fn gemini(args: &BackendArgs) -> Result<Backends, RagError> {
    let api_key = args.gemini_api_key.clone().unwrap_or_default();
    let client = Arc::new(hakim_rag::GeminiClient::new(api_key)?);
    Ok(Backends { generator: Some(client.clone()), embedder: Some(client) })
}

#[cfg(not(feature = "gemini"))]
fn gemini(_args: &BackendArgs) -> Result<Backends, RagError> {
    Err(RagError::ConfigError("hakim was built without the `gemini` feature".to_string()))
}

#[cfg(feature = "openai")]
fn openai(args: &BackendArgs) -> Result<Backends, RagError> {
    let mut client = hakim_rag::OpenAIClient::new(args.openai_api_key.clone().unwrap_or_default())?;
    if let Some(base_url) = &args.openai_base_url {
        client = client.with_base_url(base_url.clone());
    }
    let client = Arc::new(client);
    Ok(Backends { generator: Some(client.clone()), embedder: Some(client) })
}

#[cfg(not(feature = "openai"))]
fn openai(_args: &BackendArgs) -> Result<Backends, RagError> {
    Err(RagError::ConfigError("hakim was built without the `openai` feature".to_string()))
}
