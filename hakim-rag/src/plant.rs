//! Data types for plant records and their flattened text.

use serde::{Deserialize, Serialize};

/// Placeholder used wherever a record field is empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// One medicinal plant in the corpus.
///
/// The serde names match the flat JSON dataset the corpus is read from, so a
/// raw record such as `{"Scientific Name": "...", "Uses": "..."}` deserializes
/// directly. Optional fields that are absent, `null`, or empty are `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlantRecord {
    /// Scientific name; the record's identity within a corpus.
    #[serde(rename = "Scientific Name", default)]
    pub scientific_name: String,
    /// Local (common) name.
    #[serde(rename = "Local Name", default)]
    pub local_name: String,
    /// Botanical family.
    #[serde(rename = "Family", default, deserialize_with = "non_empty")]
    pub family: Option<String>,
    /// Traditional uses.
    #[serde(rename = "Uses", default, deserialize_with = "non_empty")]
    pub uses: Option<String>,
    /// Symptoms the plant is used against.
    #[serde(rename = "Symptoms", default, deserialize_with = "non_empty")]
    pub symptoms: Option<String>,
    /// Preparation and dosage notes.
    #[serde(rename = "Preparation & Dosage", default, deserialize_with = "non_empty")]
    pub preparation: Option<String>,
    /// Side effects and precautions.
    #[serde(rename = "Side Effects / Precautions", default, deserialize_with = "non_empty")]
    pub side_effects: Option<String>,
}

impl PlantRecord {
    /// Create a record with only its names set.
    pub fn new(scientific_name: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            local_name: local_name.into(),
            ..Self::default()
        }
    }

    /// Set the botanical family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Set the traditional uses.
    pub fn with_uses(mut self, uses: impl Into<String>) -> Self {
        self.uses = Some(uses.into());
        self
    }

    /// Set the symptoms.
    pub fn with_symptoms(mut self, symptoms: impl Into<String>) -> Self {
        self.symptoms = Some(symptoms.into());
        self
    }

    /// Set the preparation and dosage notes.
    pub fn with_preparation(mut self, preparation: impl Into<String>) -> Self {
        self.preparation = Some(preparation.into());
        self
    }

    /// Set the side effects and precautions.
    pub fn with_side_effects(mut self, side_effects: impl Into<String>) -> Self {
        self.side_effects = Some(side_effects.into());
        self
    }

    /// The key used to cache derived computations for this record.
    pub fn key(&self) -> &str {
        &self.scientific_name
    }

    /// `Scientific (Local)` display name.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.scientific_name, self.local_name)
    }

    /// Flattened text used for embedding and as the retrieval result's text.
    pub fn derived_text(&self) -> String {
        format!(
            "Plant: {}\nFamily: {}\nUses: {}\nPreparation: {}\nSide Effects: {}\nSymptoms: {}",
            self.display_name(),
            or_placeholder(&self.family),
            or_placeholder(&self.uses),
            or_placeholder(&self.preparation),
            or_placeholder(&self.side_effects),
            or_placeholder(&self.symptoms),
        )
    }
}

/// The field's value, or [`NOT_SPECIFIED`] when it is missing.
pub fn or_placeholder(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(NOT_SPECIFIED)
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}
