//! CLI module for askrag
//!
//! Provides command-line interface parsing for the askrag-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::rag::SearchStrategy;

/// askrag - question answering over a local LLM
///
/// Serves `/ask` and `/ask_rag` in front of an Ollama model, with a small
/// retrieval step over a flat text knowledge base.
#[derive(Parser, Debug)]
#[command(
    name = "askrag-server",
    version,
    about = "askrag - question answering over a local LLM",
    long_about = "Serves /ask and /ask_rag in front of an Ollama model. /ask_rag selects\n\
                  passages from a plain-text knowledge base (blank-line separated) by keyword\n\
                  or embedding similarity and asks the model to answer from them.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  askrag-server init                         # Scaffold askrag.toml and a sample corpus\n    \
                  askrag-server                              # Start the server (requires askrag.toml)\n    \
                  askrag-server ask \"What is RAG?\"           # One-shot question\n    \
                  askrag-server retrieve \"remote work\"       # Show selected passages\n    \
                  askrag-server --config my.toml serve       # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "askrag.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Reload askrag.toml when it changes on disk
        #[arg(short, long)]
        watch: bool,
    },

    /// Initialize a new askrag project
    ///
    /// Creates askrag.toml, .env.example and a sample knowledge_base.txt.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config {
        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Ask the LLM a single question from the terminal
    Ask {
        /// The question
        prompt: String,

        /// System instruction (persona) to use instead of the configured one
        #[arg(short, long)]
        system: Option<String>,

        /// Answer from the knowledge base
        #[arg(long)]
        rag: bool,

        /// Retrieval strategy for --rag (keyword or similarity)
        #[arg(long)]
        strategy: Option<SearchStrategy>,
    },

    /// Show which passages a query selects, without calling the LLM
    Retrieve {
        /// The query
        query: String,

        /// Retrieval strategy (keyword or similarity)
        #[arg(long)]
        strategy: Option<SearchStrategy>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
