//! End-to-end behavior of the answer tiers.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hakim_rag::{
    AnswerGenerator, AnswerMethod, Confidence, CorpusProvider, InMemoryCorpus, PlantRecord,
    RagConfig, RagError, Result,
};

use common::{
    Behavior, FailingEmbeddingProvider, MockEmbeddingProvider, MockGenerator, bulky_plant,
    sample_plants,
};

struct BrokenCorpus;

#[async_trait]
impl CorpusProvider for BrokenCorpus {
    async fn load(&self) -> Result<Arc<[PlantRecord]>> {
        Err(RagError::CorpusError { source_name: "broken".into(), message: "disk on fire".into() })
    }
}

fn generator_with(
    text_generator: Option<Arc<MockGenerator>>,
    config: RagConfig,
) -> AnswerGenerator {
    let mut builder = AnswerGenerator::builder()
        .config(config)
        .corpus(Arc::new(InMemoryCorpus::new(sample_plants())));
    if let Some(text_generator) = text_generator {
        builder = builder.text_generator(text_generator);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn without_backend_answers_from_fallback() {
    let generator = generator_with(None, RagConfig::default());

    let answer = generator.answer("What herbs help with diabetes?").await;

    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert!(!answer.answer.is_empty());
    assert!(answer.confidence >= Confidence::Medium);
}

#[tokio::test]
async fn rag_answer_cites_retrieved_sources() {
    let mock =
        MockGenerator::replying("Sumbal (Berberis lycium) is traditionally used for diabetes.");
    let generator = generator_with(Some(mock.clone()), RagConfig::default());

    let answer = generator.answer("What herbs help with diabetes?").await;

    assert_eq!(answer.method, AnswerMethod::Rag);
    assert!(answer.answer.contains("Sumbal"));
    assert_eq!(answer.sources[0].plant_name, "Berberis lycium");
    assert!(answer.sources.len() <= 3);

    let prompt = mock.last_prompt().unwrap();
    assert!(prompt.contains("Plant: Berberis lycium (Sumbal)"));
    assert!(prompt.contains("User Question: What herbs help with diabetes?"));
}

#[tokio::test]
async fn confidence_tracks_top_similarity() {
    let mock = MockGenerator::replying("Tulsi helps.");
    let generator = generator_with(Some(mock.clone()), RagConfig::default());
    // Tulsi clamps to 1.0 for this query.
    let strong = generator.answer("fever and cough remedies").await;
    assert_eq!(strong.confidence, Confidence::High);

    // Only a local-name hit: 1 / 10.
    let weak = generator.answer("gurans").await;
    assert_eq!(weak.method, AnswerMethod::Rag);
    assert_eq!(weak.confidence, Confidence::Medium);
}

#[tokio::test]
async fn every_source_comes_from_the_corpus() {
    let mock = MockGenerator::replying("ok");
    let generator = generator_with(Some(mock), RagConfig::default());
    let plants = sample_plants();

    for query in ["fever", "stomach ache", "diabetes and jaundice", "toothache"] {
        let answer = generator.answer(query).await;
        for source in &answer.sources {
            assert!(plants.iter().any(|p| p.scientific_name == source.plant_name
                && p.local_name == source.local_name));
            assert!((0.0..=1.0).contains(&source.similarity));
        }
    }
}

#[tokio::test]
async fn hanging_backend_times_out_to_fallback() {
    let config =
        RagConfig::builder().generation_timeout(Duration::from_millis(200)).build().unwrap();
    let mock = MockGenerator::new(Behavior::Hang);
    let generator = generator_with(Some(mock.clone()), config);

    let started = Instant::now();
    let answer = generator.answer("fever").await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(mock.calls(), 1);
    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert!(!answer.answer.is_empty());
}

#[tokio::test]
async fn blank_backend_response_degrades() {
    let mock = MockGenerator::new(Behavior::Blank);
    let generator = generator_with(Some(mock), RagConfig::default());

    let answer = generator.answer("toothache").await;

    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert_eq!(answer.sources[0].local_name, "Timur");
}

#[tokio::test]
async fn backend_error_degrades_preferring_retrieved_records() {
    let mock = MockGenerator::new(Behavior::Fail);
    let generator = generator_with(Some(mock), RagConfig::default());

    // Podina comes first in the corpus, but Timur scores higher for "ache".
    let answer = generator.answer("ache").await;

    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert_eq!(answer.confidence, Confidence::Medium);
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].plant_name, "Zanthoxylum armatum");
}

#[tokio::test]
async fn no_relevant_records_skips_generation() {
    let mock = MockGenerator::replying("should not be used");
    let generator = generator_with(Some(mock.clone()), RagConfig::default());

    let answer = generator.answer("xyzzyquux").await;

    assert_eq!(mock.calls(), 0);
    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert!(answer.answer.contains("couldn't find specific matches"));
}

#[tokio::test]
async fn prompt_budget_failure_skips_generation() {
    let config =
        RagConfig::builder().max_prompt_chars(2_500).min_context_chars(2_000).build().unwrap();
    let mock = MockGenerator::replying("should not be used");
    let generator = AnswerGenerator::builder()
        .config(config)
        .corpus(Arc::new(InMemoryCorpus::new(vec![bulky_plant("Bulky", 3_000)])))
        .text_generator(mock.clone())
        .build()
        .unwrap();

    let answer = generator.answer("fever remedy").await;

    assert_eq!(mock.calls(), 0);
    assert_eq!(answer.method, AnswerMethod::Fallback);
}

#[tokio::test]
async fn corpus_failure_gives_safety_answer() {
    let generator = AnswerGenerator::builder().corpus(Arc::new(BrokenCorpus)).build().unwrap();

    let answer = generator.answer("fever").await;
    assert_eq!(answer.method, AnswerMethod::ErrorFallback);
    assert_eq!(answer.confidence, Confidence::Low);
    assert!(answer.sources.is_empty());

    let err = generator.generate_answer("fever").await.unwrap_err();
    assert!(matches!(err, RagError::CorpusError { .. }));
}

#[tokio::test]
async fn empty_corpus_gives_safety_answer() {
    let generator = AnswerGenerator::builder()
        .corpus(Arc::new(InMemoryCorpus::new(Vec::<PlantRecord>::new())))
        .build()
        .unwrap();

    assert_eq!(generator.answer("fever").await.method, AnswerMethod::ErrorFallback);
    assert!(matches!(generator.generate_answer("fever").await, Err(RagError::EmptyCorpus)));
}

#[tokio::test]
async fn embedding_failure_still_produces_rag_answer() {
    let mock = MockGenerator::replying("Podina eases stomach ache.");
    let generator = AnswerGenerator::builder()
        .corpus(Arc::new(InMemoryCorpus::new(sample_plants())))
        .text_generator(mock)
        .embedding_provider(Arc::new(FailingEmbeddingProvider))
        .build()
        .unwrap();

    let answer = generator.answer("stomach ache").await;

    assert_eq!(answer.method, AnswerMethod::Rag);
    assert_eq!(answer.sources[0].local_name, "Podina");
}

#[tokio::test]
async fn vector_retrieval_feeds_the_prompt() {
    let mock = MockGenerator::replying("Tulsi.");
    let generator = AnswerGenerator::builder()
        .corpus(Arc::new(InMemoryCorpus::new(sample_plants())))
        .text_generator(mock.clone())
        .embedding_provider(Arc::new(MockEmbeddingProvider::new(64)))
        .build()
        .unwrap();

    let retrieved = generator.retrieve("Treats fever, cough and cold").await.unwrap();
    assert_eq!(retrieved[0].record.local_name, "Tulsi");
    assert_eq!(retrieved.len(), 3);

    let answer = generator.answer("Treats fever, cough and cold").await;
    assert_eq!(answer.method, AnswerMethod::Rag);
    assert_eq!(answer.sources[0].local_name, "Tulsi");
    assert_eq!(generator.scorer().cache().len().await, sample_plants().len());
}

#[test]
fn builder_requires_corpus() {
    assert!(matches!(AnswerGenerator::builder().build(), Err(RagError::ConfigError(_))));
}
