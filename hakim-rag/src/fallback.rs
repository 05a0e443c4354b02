//! Deterministic template answers.
//!
//! [`FallbackAnswerer`] needs no backend and performs no I/O, so it is
//! always available as the last tier before the generic safety answer.
//! For a given query and corpus it always returns the same answer.

use crate::answer::{AnswerMethod, Confidence, RagAnswer, Source};
use crate::plant::{PlantRecord, or_placeholder};

/// Similarity reported for a plant found by plain substring matching.
pub const SUBSTRING_MATCH_SIMILARITY: f32 = 0.7;

const GREETINGS: &[&str] = &["hi", "hello", "hey"];

const GREETING_ANSWER: &str = "Hello! I'm your Herbal Medicine AI Assistant specializing in Himalayan medicinal plants. I can help you with:

- Information about specific medicinal plants
- Traditional remedies for various health conditions
- Preparation methods and dosages
- Safety precautions and side effects

What would you like to know about herbal medicine? You can ask about specific conditions like diabetes, fever, cough, or any other health concern.";

const SAFETY_ANSWER: &str = "I'm sorry, I couldn't look that up right now. Here are some general health tips while the service recovers:

- Stay hydrated: drink at least 8 glasses of water daily.
- Exercise regularly: aim for at least 30 minutes of moderate activity a day.
- Herbal teas such as green tea and chamomile have antioxidant properties.
- Eat a balanced diet with fruits, vegetables, and whole grains.

Traditional remedies are not a substitute for medical care. Please consult a qualified healthcare professional for any serious or persistent condition.";

/// Produces template answers from raw corpus records.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAnswerer;

impl FallbackAnswerer {
    /// Create a fallback answerer.
    pub fn new() -> Self {
        Self
    }

    /// Answer `query` from `corpus` without any scoring.
    ///
    /// Checked in order: greeting, capability question, first record whose
    /// uses, symptoms, scientific name or local name contains the whole
    /// lowercased query, and finally a guidance answer.
    ///
    /// The greeting and capability checks match whole words, so "hi" fires
    /// for "hi there" but not for "which".
    pub fn answer(&self, query: &str, corpus: &[PlantRecord]) -> RagAnswer {
        let lowered = query.trim().to_lowercase();
        let words: Vec<&str> =
            lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let has_word = |word: &str| words.contains(&word);

        if GREETINGS.iter().any(|&greeting| has_word(greeting)) {
            return template(GREETING_ANSWER.to_string(), Confidence::High);
        }

        if has_word("what") && (has_word("can") || has_word("do")) {
            return template(capability_answer(corpus.len()), Confidence::High);
        }

        if let Some(plant) = find_substring_match(&lowered, corpus) {
            return RagAnswer {
                answer: plant_answer(plant),
                confidence: Confidence::Medium,
                sources: vec![Source::from_record(plant, SUBSTRING_MATCH_SIMILARITY)],
                method: AnswerMethod::Fallback,
            };
        }

        template(no_match_answer(query.trim(), corpus.len()), Confidence::Medium)
    }
}

/// The unconditional last-resort answer: general safety tips, low confidence, no sources.
pub fn safety_answer() -> RagAnswer {
    RagAnswer {
        answer: SAFETY_ANSWER.to_string(),
        confidence: Confidence::Low,
        sources: Vec::new(),
        method: AnswerMethod::ErrorFallback,
    }
}

fn template(answer: String, confidence: Confidence) -> RagAnswer {
    RagAnswer { answer, confidence, sources: Vec::new(), method: AnswerMethod::Fallback }
}

fn find_substring_match<'a>(needle: &str, corpus: &'a [PlantRecord]) -> Option<&'a PlantRecord> {
    if needle.is_empty() {
        return None;
    }
    corpus.iter().find(|plant| {
        field_contains(plant.uses.as_deref(), needle)
            || field_contains(plant.symptoms.as_deref(), needle)
            || field_contains(Some(plant.scientific_name.as_str()), needle)
            || field_contains(Some(plant.local_name.as_str()), needle)
    })
}

fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|text| text.to_lowercase().contains(needle))
}

fn plant_answer(plant: &PlantRecord) -> String {
    format!(
        "Based on my database, I found some relevant information:

Plant: {}
Uses: {}
Preparation: {}
Side Effects: {}

Note: This is basic information from my database. For comprehensive medical advice, please consult a healthcare professional.",
        plant.display_name(),
        or_placeholder(&plant.uses),
        or_placeholder(&plant.preparation),
        or_placeholder(&plant.side_effects),
    )
}

fn capability_answer(corpus_size: usize) -> String {
    format!(
        "I can help you with information about Himalayan medicinal plants. Here's what I can do:

- Search for specific plants: ask about any plant by name
- Find remedies for conditions: tell me about symptoms or health issues
- Explain preparation methods for herbal remedies
- Share safety information: precautions and side effects
- Match local and scientific plant names

My database contains {corpus_size} medicinal plants from the Himalayan region. Try asking something like:
- \"What herbs help with diabetes?\"
- \"Tell me about chamomile\"
- \"How to treat fever naturally?\"
- \"What plants help with digestive issues?\""
    )
}

fn no_match_answer(query: &str, corpus_size: usize) -> String {
    format!(
        "I understand you're asking about \"{query}\". While I have a database of {corpus_size} Himalayan medicinal plants, I couldn't find specific matches for your query.

Here's how I can help you better:

Be more specific. Try asking about particular conditions like:
- \"What herbs help with diabetes?\"
- \"Plants for treating fever\"
- \"Remedies for cough and cold\"

Ask about specific plants by name:
- \"Tell me about chamomile\"
- \"What is Rhodiola used for?\"

Describe your symptoms:
- \"I have digestive issues\"
- \"Help with skin problems\"

Remember: always consult healthcare professionals for serious medical conditions. I provide information about traditional herbal remedies, not medical advice."
    )
}
