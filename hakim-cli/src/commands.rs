//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hakim_rag::{
    AnswerGenerator, CachedCorpus, CorpusProvider, JsonFileCorpus, PlantFilter, PlantRecord,
    RagAnswer, RagConfig, RagError, RetrievalResult,
};
use tracing::debug;

use crate::backend::{self, Backends};
use crate::cli::{BackendArgs, Commands, GlobalArgs};
use crate::exit_codes::EXIT_SUCCESS;

/// Run a parsed subcommand and return the process exit code.
pub async fn run(global: &GlobalArgs, command: Commands) -> anyhow::Result<i32> {
    match command {
        Commands::Ask { question, backend, top_k, timeout_secs, json, strict } => {
            let question = validate_query(&question)?;
            let mut config = load_config(global.config.as_deref())?;
            if let Some(k) = top_k {
                config.top_k = k;
            }
            if let Some(secs) = timeout_secs {
                config.generation_timeout = Duration::from_secs(secs);
            }

            let generator = answer_generator(global, config, &backend)?;
            let answer = if strict {
                generator.generate_answer(question).await?
            } else {
                generator.answer(question).await
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print!("{}", render_answer(&answer));
            }
            Ok(EXIT_SUCCESS)
        }
        Commands::Search { query, backend, top_k, json } => {
            let query = validate_query(&query)?;
            let mut config = load_config(global.config.as_deref())?;
            if let Some(k) = top_k {
                config.top_k = k;
            }

            let generator = answer_generator(global, config, &backend)?;
            let results = generator.retrieve(query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", render_results(&results));
            }
            Ok(EXIT_SUCCESS)
        }
        Commands::Lookup { symptom, name, scientific_name, json } => {
            let filter = PlantFilter { symptom, name, scientific_name };
            let plants = JsonFileCorpus::new(global.corpus.clone()).load().await?;
            let found = filter.apply(&plants)?;
            debug!(?filter, matched = found.len(), "lookup completed");

            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print!("{}", render_plants(&found));
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Reject blank input before it reaches the pipeline.
pub fn validate_query(query: &str) -> Result<&str, RagError> {
    let trimmed = query.trim();
    if trimmed.is_empty() { Err(RagError::EmptyQuery) } else { Ok(trimmed) }
}

/// Read pipeline settings from `path`, or use the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RagConfig> {
    let Some(path) = path else {
        return Ok(RagConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: RagConfig = serde_json::from_str(&raw)
        .map_err(|e| RagError::ConfigError(format!("{}: {e}", path.display())))?;
    Ok(config)
}

fn answer_generator(
    global: &GlobalArgs,
    config: RagConfig,
    args: &BackendArgs,
) -> anyhow::Result<AnswerGenerator> {
    let Backends { generator, embedder } = backend::build(args)?;
    let corpus = CachedCorpus::new(JsonFileCorpus::new(global.corpus.clone()));

    let mut builder = AnswerGenerator::builder().config(config).corpus(Arc::new(corpus));
    if let Some(generator) = generator {
        builder = builder.text_generator(generator);
    }
    if let Some(embedder) = embedder {
        builder = builder.embedding_provider(embedder);
    }
    Ok(builder.build()?)
}

/// Human-readable answer with its metadata.
pub fn render_answer(answer: &RagAnswer) -> String {
    let mut out = format!("{}\n\n", answer.answer.trim_end());
    let _ = writeln!(
        out,
        "Confidence: {} ({:.1}) via {}",
        answer.confidence,
        answer.confidence.score(),
        answer.method
    );
    if !answer.sources.is_empty() {
        out.push_str("Sources:\n");
        for source in &answer.sources {
            let _ = writeln!(
                out,
                "  - {} ({}) {:.3}",
                source.plant_name, source.local_name, source.similarity
            );
        }
    }
    out
}

/// One line per ranked record.
pub fn render_results(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return "No relevant plants found.\n".to_string();
    }
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}  {:.3}  [{:?}]",
            rank + 1,
            result.record.display_name(),
            result.similarity,
            result.strategy
        );
    }
    out
}

/// Full records separated by blank lines.
pub fn render_plants(plants: &[&PlantRecord]) -> String {
    if plants.is_empty() {
        return "No plants matched.\n".to_string();
    }
    plants.iter().map(|plant| format!("{}\n", plant.derived_text())).collect::<Vec<_>>().join("\n")
}
