//! Template answers from the fallback tier.

mod common;

use hakim_rag::fallback::SUBSTRING_MATCH_SIMILARITY;
use hakim_rag::{AnswerMethod, Confidence, FallbackAnswerer, safety_answer};

use common::sample_plants;

#[test]
fn greeting_gets_introduction() {
    let answer = FallbackAnswerer::new().answer("Hello there", &sample_plants());

    assert_eq!(answer.confidence, Confidence::High);
    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert!(answer.answer.contains("Herbal Medicine AI Assistant"));
    assert!(answer.sources.is_empty());
}

#[test]
fn bare_hi_is_a_greeting() {
    let answer = FallbackAnswerer::new().answer("hi", &sample_plants());

    assert_eq!(answer.confidence, Confidence::High);
    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert!(answer.answer.contains("Herbal Medicine AI Assistant"));
    assert!(answer.sources.is_empty());
}

#[test]
fn greeting_words_inside_other_words_do_not_count() {
    let answer = FallbackAnswerer::new().answer("which plant treats toothache", &sample_plants());
    assert!(!answer.answer.contains("Herbal Medicine AI Assistant"));
}

#[test]
fn capability_question_reports_corpus_size() {
    let plants = sample_plants();
    let answer = FallbackAnswerer::new().answer("What can you do?", &plants);

    assert_eq!(answer.confidence, Confidence::High);
    let expected = format!("My database contains {} medicinal plants", plants.len());
    assert!(answer.answer.contains(&expected));
}

#[test]
fn substring_match_cites_one_plant() {
    let answer = FallbackAnswerer::new().answer("Toothache", &sample_plants());

    assert_eq!(answer.confidence, Confidence::Medium);
    assert_eq!(answer.method, AnswerMethod::Fallback);
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].plant_name, "Zanthoxylum armatum");
    assert_eq!(answer.sources[0].local_name, "Timur");
    assert_eq!(answer.sources[0].similarity, SUBSTRING_MATCH_SIMILARITY);
    assert!(answer.answer.contains("Plant: Zanthoxylum armatum (Timur)"));
    assert!(answer.answer.contains("Side Effects: Not specified"));
}

#[test]
fn local_name_matches() {
    let answer = FallbackAnswerer::new().answer("tulsi", &sample_plants());
    assert_eq!(answer.sources[0].local_name, "Tulsi");
}

#[test]
fn no_match_gives_guidance() {
    let answer = FallbackAnswerer::new().answer("xyzzyquux", &sample_plants());

    assert_eq!(answer.confidence, Confidence::Medium);
    assert!(answer.sources.is_empty());
    assert!(answer.answer.contains("couldn't find specific matches"));
    assert!(answer.answer.contains("\"xyzzyquux\""));
}

#[test]
fn answers_are_deterministic() {
    let plants = sample_plants();
    let answerer = FallbackAnswerer::new();
    for query in ["hi", "what do you do", "fever", "xyzzyquux", ""] {
        assert_eq!(answerer.answer(query, &plants), answerer.answer(query, &plants));
        assert!(!answerer.answer(query, &plants).answer.trim().is_empty());
    }
}

#[test]
fn safety_answer_is_low_confidence() {
    let answer = safety_answer();

    assert_eq!(answer.confidence, Confidence::Low);
    assert_eq!(answer.method, AnswerMethod::ErrorFallback);
    assert!(answer.sources.is_empty());
    assert!(answer.answer.contains("healthcare professional"));
}
