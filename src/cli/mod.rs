//! CLI module for Candlelight.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::dataset::DatasetFormat;
use clap::{Parser, Subcommand};

/// Candlelight Concert AI Assistant
///
/// Answers questions about concerts, venues and tickets from the Candlelight FAQ.
#[derive(Parser, Debug)]
#[command(name = "candlelight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build (or rebuild) the knowledge base from the FAQ dataset
    Build {
        /// Dataset to index (defaults to dataset.path from the config)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Column identifying each FAQ entry (defaults to dataset.source_column)
        #[arg(short, long)]
        source_column: Option<String>,

        /// Dataset format (csv, tsv, jsonl); inferred from the extension when omitted
        #[arg(short, long)]
        format: Option<DatasetFormat>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Chat model to use instead of llm.model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// Chat model to use instead of llm.model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the FAQ entries most similar to a query
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (defaults to retrieval.score_threshold)
        #[arg(short, long)]
        min_score: Option<f32>,
    },

    /// Show whether the knowledge base exists and how it was built
    Status,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check credentials, dataset, index and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_with_overrides() {
        let cli = Cli::try_parse_from([
            "candlelight",
            "-vv",
            "build",
            "--dataset",
            "faq.jsonl",
            "--format",
            "jsonl",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build {
                dataset,
                source_column,
                format,
            } => {
                assert_eq!(dataset.as_deref(), Some("faq.jsonl"));
                assert_eq!(source_column, None);
                assert_eq!(format, Some(DatasetFormat::Jsonl));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["candlelight", "search", "parking"]).unwrap();
        match cli.command {
            Commands::Search {
                query,
                limit,
                min_score,
            } => {
                assert_eq!(query, "parking");
                assert_eq!(limit, 5);
                assert_eq!(min_score, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
