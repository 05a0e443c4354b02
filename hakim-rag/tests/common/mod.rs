//! Shared fixtures and mock backends for the integration tests.

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hakim_rag::{EmbeddingProvider, PlantRecord, RagError, Result, TextGenerator};

/// A small corpus covering the conditions the tests ask about.
pub fn sample_plants() -> Vec<PlantRecord> {
    vec![
        PlantRecord::new("Berberis lycium", "Sumbal")
            .with_family("Berberidaceae")
            .with_uses("Used for diabetes, jaundice and eye infections")
            .with_symptoms("High blood sugar, yellowing of skin")
            .with_preparation("Root decoction, 1 cup twice daily")
            .with_side_effects("Avoid during pregnancy"),
        PlantRecord::new("Mentha arvensis", "Podina")
            .with_family("Lamiaceae")
            .with_uses("Relieves indigestion and stomach ache")
            .with_symptoms("Bloating, nausea")
            .with_preparation("Fresh leaves as tea"),
        PlantRecord::new("Ocimum sanctum", "Tulsi")
            .with_family("Lamiaceae")
            .with_uses("Treats fever, cough and cold")
            .with_symptoms("Fever, sore throat")
            .with_preparation("Leaf infusion three times a day")
            .with_side_effects("May lower blood sugar"),
        PlantRecord::new("Zanthoxylum armatum", "Timur")
            .with_family("Rutaceae")
            .with_uses("Toothache and gum pain")
            .with_symptoms("Toothache"),
        PlantRecord::new("Rhododendron arboreum", "Gurans")
            .with_family("Ericaceae")
            .with_uses("Flower juice for dysentery and diarrhoea"),
    ]
}

/// A record with every text field padded to `len` characters.
pub fn bulky_plant(name: &str, len: usize) -> PlantRecord {
    let filler = "fever remedy ".repeat(len / 13 + 1);
    PlantRecord::new(name, format!("{name} local"))
        .with_uses(filler.clone())
        .with_preparation(filler.clone())
        .with_side_effects(filler)
}

/// Deterministic bag-of-words embedder: texts sharing words get similar vectors.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    pub batch_calls: AtomicUsize,
    pub embedded_texts: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, batch_calls: AtomicUsize::new(0), embedded_texts: AtomicUsize::new(0) }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.len() < 3 {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dimensions] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedder whose every call fails.
pub struct FailingEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError { provider: "failing".into(), message: "unavailable".into() })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// How a [`MockGenerator`] responds.
pub enum Behavior {
    Reply(String),
    Fail,
    Blank,
    Hang,
}

/// A scripted text generator that records the prompts it receives.
pub struct MockGenerator {
    behavior: Behavior,
    pub prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self { behavior, prompts: Mutex::new(Vec::new()) })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail => Err(RagError::GenerationError {
                provider: "mock".into(),
                message: "backend exploded".into(),
            }),
            Behavior::Blank => Ok("   ".to_string()),
            Behavior::Hang => std::future::pending().await,
        }
    }
}
