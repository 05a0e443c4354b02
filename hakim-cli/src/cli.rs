//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::telemetry::LogFormat;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_CORPUS: &str = "data/medicinal_plants.json";

/// Main CLI structure
#[derive(Debug, Parser)]
#[command(name = "hakim")]
#[command(about = "Ask questions about traditional Himalayan medicinal plants", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path to the plant dataset (JSON array)
    #[arg(long, global = true, env = "HAKIM_CORPUS", default_value = DEFAULT_CORPUS)]
    pub corpus: PathBuf,

    /// JSON file with pipeline settings; flags below override it
    #[arg(long, global = true, env = "HAKIM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Backend selection and credentials.
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Which generation backend to use
    #[arg(long, env = "HAKIM_BACKEND", value_enum, default_value_t = BackendKind::Auto)]
    pub backend: BackendKind,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Override the OpenAI-compatible API root
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Rank with keyword scoring only, even when the backend can embed
    #[arg(long)]
    pub keyword_only: bool,
}

/// Generation backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// First backend with a configured API key, otherwise none
    Auto,
    /// Offline: template answers only
    None,
    /// Google Gemini
    Gemini,
    /// OpenAI or a compatible server
    Openai,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask a question and print the answer
    Ask {
        /// Natural language question
        #[arg(value_name = "QUESTION")]
        question: String,

        #[command(flatten)]
        backend: BackendArgs,

        /// Number of records used as context
        #[arg(long, short = 'k', env = "HAKIM_TOP_K")]
        top_k: Option<usize>,

        /// Generation timeout in seconds
        #[arg(long, env = "HAKIM_TIMEOUT_SECS", value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Fail with a non-zero exit code instead of printing the safety answer
        #[arg(long)]
        strict: bool,
    },
    /// Show the records retrieval ranks highest for a query
    Search {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        #[command(flatten)]
        backend: BackendArgs,

        /// Number of results
        #[arg(long, short = 'k', env = "HAKIM_TOP_K")]
        top_k: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Filter plants by symptom, local name or scientific name
    Lookup {
        /// Symptom or condition mentioned in uses or symptoms
        #[arg(long)]
        symptom: Option<String>,

        /// Local (common) name fragment
        #[arg(long)]
        name: Option<String>,

        /// Scientific name fragment
        #[arg(long)]
        scientific_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
