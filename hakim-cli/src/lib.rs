//! # hakim-cli
//!
//! The `hakim` command-line front end for [`hakim_rag`].
//!
//! ## Usage
//!
//! ```bash
//! # Offline answer from the bundled dataset
//! hakim ask "What herbs help with diabetes?" --backend none
//!
//! # Generated answer (reads GEMINI_API_KEY from the environment or .env)
//! hakim ask "How is Tulsi prepared for fever?" --json
//!
//! # Inspect retrieval
//! hakim search "stomach ache" -k 5
//!
//! # Structured filter
//! hakim lookup --symptom cough
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod exit_codes;
pub mod telemetry;

pub use cli::{Cli, Commands};
