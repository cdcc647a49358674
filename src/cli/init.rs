//! Init command implementation
//!
//! Scaffolds a new askrag project: configuration, environment template and
//! a sample knowledge base to try `/ask_rag` against.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (askrag.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing askrag project");

    let base_path = &config.path;

    let config_path = base_path.join("askrag.toml");
    if config_path.exists() && !config.force {
        output.warning("askrag.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    output.subheader("Creating files");

    let files: [(&str, &str, String); 3] = [
        ("config", "askrag.toml", generate_askrag_toml()),
        ("env", ".env.example", generate_env_example()),
        ("corpus", "knowledge_base.txt", generate_knowledge_base()),
    ];

    for (kind, name, content) in &files {
        let path = base_path.join(name);
        match write_file(&path, content, config.force) {
            Ok(true) => output.created(kind, name),
            Ok(false) => output.skipped(name, "already exists"),
            Err(e) => {
                output.error(&format!("Failed to create {}: {}", name, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    output.complete("askrag project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Start Ollama and pull the models:");
    output.command("ollama serve");
    output.command("ollama pull llama3");
    output.command("ollama pull mxbai-embed-large  # only for strategy = \"similarity\"");
    output.newline();
    output.info("2. Start the server:");
    output.command("askrag-server");
    output.newline();
    output.info("3. Ask something from the knowledge base:");
    output.command(
        "curl -s localhost:8000/ask_rag -H 'content-type: application/json' \
         -d '{\"prompt\": \"What is the remote work policy?\"}'",
    );

    output.hint("Edit knowledge_base.txt; passages are separated by a blank line");

    InitResult::Success
}

/// Returns `Ok(false)` when the file exists and `force` is off.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_askrag_toml() -> String {
    r#"# askrag configuration
# Environment variables override these values:
#   ASKRAG_HOST, ASKRAG_PORT, OLLAMA_URL, ASKRAG_MODEL,
#   ASKRAG_KNOWLEDGE_BASE, ASKRAG_STRATEGY

[server]
host = "127.0.0.1"
port = 8000
log_level = "info"
# pretty or json
log_format = "pretty"

[llm]
base_url = "http://localhost:11434"
model = "llama3"
system_prompt = "You are a helpful and professional GenAI assistant."

[rag]
knowledge_base = "knowledge_base.txt"
# keyword: case-insensitive substring match on any query word
# similarity: embedding dot product above similarity_threshold
strategy = "keyword"
similarity_threshold = 0.6
embedding_model = "mxbai-embed-large"
embedding_timeout_secs = 30
# Use keyword matching when the embedding service cannot be reached
fallback_to_keyword = false
# system_prompt = "You are a friendly HR assistant. Answer questions about company policies."
"#
    .to_string()
}

fn generate_env_example() -> String {
    r#"# askrag Environment Variables
# Copy this file to .env and adjust.

# Logging level (trace, debug, info, warn, error)
RUST_LOG=info,askrag=debug

# Ollama server
# OLLAMA_URL=http://localhost:11434
# ASKRAG_MODEL=llama3

# Server
# ASKRAG_HOST=0.0.0.0
# ASKRAG_PORT=8000

# Retrieval
# ASKRAG_KNOWLEDGE_BASE=knowledge_base.txt
# ASKRAG_STRATEGY=keyword
"#
    .to_string()
}

fn generate_knowledge_base() -> String {
    r#"Vacation policy: full-time employees accrue 20 days of paid vacation per year. Unused days up to 5 carry over into the next year.

Remote work policy: employees may work remotely up to 2 days per week with manager approval. Core collaboration hours are 10:00 to 15:00 local time.

Expense policy: travel expenses must be submitted within 30 days with receipts attached. Meals are reimbursed up to 50 per day.

Parental leave: new parents receive 16 weeks of paid leave, which can be taken within the first year after birth or adoption.
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::knowledge::split_chunks;
    use crate::utils::toml_config::AskragConfig;
    use tempfile::TempDir;

    fn init_at(temp_dir: &TempDir, force: bool) -> InitResult {
        let config = InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
        };
        run(config, &Output::no_color())
    }

    #[test]
    fn test_generated_toml_parses_and_validates() {
        let config: AskragConfig = toml::from_str(&generate_askrag_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "llama3");
        assert!(config.rag.system_prompt.is_none());
    }

    #[test]
    fn test_sample_knowledge_base_has_passages() {
        let chunks = split_chunks(&generate_knowledge_base());
        assert_eq!(chunks.len(), 4);
        assert!(chunks[1].text.starts_with("Remote work policy"));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("x.txt");
        fs::write(&path, "original").unwrap();

        assert!(!write_file(&path, "new", false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");

        assert!(write_file(&path, "new", true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        assert!(matches!(init_at(&temp_dir, false), InitResult::Success));

        assert!(temp_dir.path().join("askrag.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join("knowledge_base.txt").exists());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("askrag.toml"), "existing").expect("Failed to write");

        assert!(matches!(init_at(&temp_dir, false), InitResult::AlreadyExists));
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("askrag.toml"), "existing").expect("Failed to write");

        assert!(matches!(init_at(&temp_dir, true), InitResult::Success));

        let content =
            fs::read_to_string(temp_dir.path().join("askrag.toml")).expect("Failed to read");
        assert!(content.contains("[server]"));
        assert!(!content.contains("existing"));
    }
}
