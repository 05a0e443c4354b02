//! Context assembly and prompt budgeting.
//!
//! [`build_context`] flattens retrieved records into fixed-format blocks.
//! [`PromptBuilder`] wraps the context in the instruction prefix and the
//! user question, truncating only the context when the prompt would exceed
//! its character ceiling.

use tracing::{debug, warn};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::plant::or_placeholder;
use crate::retrieval::RetrievalResult;

/// Separator placed between record blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Appended to a context block that was cut short.
pub const TRUNCATION_MARKER: &str = "...\n[Context truncated: further plant records were omitted]";

/// Instructions that open every generation prompt.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a knowledgeable herbal medicine expert specializing in traditional remedies from the Himalayan region.

CRITICAL INSTRUCTIONS:
1. Base your answer ONLY on the provided medicinal plants data.
2. If the question cannot be answered using the available data, clearly state: \"I don't have enough information about that specific condition in my database. Please consult a healthcare professional.\"
3. NEVER make up information or suggest remedies that are not in the data.
4. Always emphasize consulting healthcare professionals for serious conditions.
5. Include safety warnings and side effects from the data.
6. For diabetes questions, look for plants that mention diabetes, blood sugar, glucose, or anti-diabetic properties.
7. Provide specific plant names, preparation methods, and dosages from the data.

Available medicinal plants data:
";

/// Flatten retrieved records into the context block handed to the model.
///
/// Every field is present; empty ones read `Not specified`.
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|result| {
            let plant = &result.record;
            format!(
                "Plant: {}\nFamily: {}\nUses: {}\nPreparation: {}\nSide Effects: {}",
                plant.display_name(),
                or_placeholder(&plant.family),
                or_placeholder(&plant.uses),
                or_placeholder(&plant.preparation),
                or_placeholder(&plant.side_effects),
            )
        })
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// A prompt ready to send to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// The full prompt text.
    pub text: String,
    /// Characters of context that made it into the prompt, marker included.
    pub context_chars: usize,
    /// Whether the context was cut.
    pub truncated: bool,
}

/// Builds prompts within a character budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    max_chars: usize,
    min_context_chars: usize,
}

impl PromptBuilder {
    /// Create a builder with an explicit ceiling and context floor.
    pub fn new(max_chars: usize, min_context_chars: usize) -> Self {
        Self { max_chars, min_context_chars }
    }

    /// Create a builder from the pipeline configuration.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.max_prompt_chars, config.min_context_chars)
    }

    /// Assemble instructions, context and question.
    ///
    /// The instructions and the question are never shortened. When the whole
    /// prompt is over budget the context keeps its head and gets
    /// [`TRUNCATION_MARKER`] appended.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PromptBudgetExceeded`] if fewer than
    /// `min_context_chars` characters remain for the context, or if the room
    /// left cannot hold the marker plus at least one character of context.
    pub fn assemble(&self, question: &str, context: &str) -> Result<AssembledPrompt> {
        let suffix = question_suffix(question);
        let fixed_chars = SYSTEM_INSTRUCTIONS.chars().count() + suffix.chars().count();
        let context_chars = context.chars().count();

        if fixed_chars + context_chars <= self.max_chars {
            debug!(prompt_chars = fixed_chars + context_chars, "prompt within budget");
            return Ok(AssembledPrompt {
                text: format!("{SYSTEM_INSTRUCTIONS}{context}{suffix}"),
                context_chars,
                truncated: false,
            });
        }

        let marker_chars = TRUNCATION_MARKER.chars().count();
        let available = self.max_chars.saturating_sub(fixed_chars);
        let floor = self.min_context_chars.max(marker_chars + 1);
        if available < floor {
            return Err(RagError::PromptBudgetExceeded { available, minimum: floor });
        }

        let keep = available - marker_chars;
        let head = truncate_chars(context, keep);
        warn!(
            context_chars,
            kept_chars = keep,
            max_chars = self.max_chars,
            "prompt over budget, truncating context"
        );

        Ok(AssembledPrompt {
            text: format!("{SYSTEM_INSTRUCTIONS}{head}{TRUNCATION_MARKER}{suffix}"),
            context_chars: keep + marker_chars,
            truncated: true,
        })
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

fn question_suffix(question: &str) -> String {
    format!(
        "\n\nUser Question: {question}\n\nPlease provide a helpful response based ONLY on the available medicinal plants data. Include specific plant recommendations, preparation methods, and safety warnings when applicable."
    )
}

/// The first `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn small_prompt_is_untouched() {
        let prompt = PromptBuilder::default().assemble("fever?", "Plant: A (B)").unwrap();
        assert!(!prompt.truncated);
        assert!(prompt.text.starts_with(SYSTEM_INSTRUCTIONS));
        assert!(prompt.text.contains("Plant: A (B)"));
        assert!(prompt.text.contains("User Question: fever?"));
    }
}
