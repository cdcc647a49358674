//! TOML-based configuration for askrag
//!
//! Everything the server needs is declared in one TOML file (`askrag.toml`
//! by default): where the HTTP server listens, which Ollama model answers,
//! and how the RAG endpoint retrieves context.
//!
//! A handful of environment variables override the file after parsing, so
//! the same file works on a laptop and inside a container.
//!
//! # Hot Reloading
//!
//! `AskragConfigManager` keeps the current configuration behind an
//! `ArcSwap`. Handlers read it per request, so changing the retrieval
//! strategy or threshold on disk takes effect without a restart.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::rag::search::{DEFAULT_SIMILARITY_THRESHOLD, SearchStrategy};

/// Root configuration structure loaded from askrag.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskragConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub rag: RagConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama server URL
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Chat model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// System instruction sent with every `/ask` prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful and professional GenAI assistant.".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_model(),
            system_prompt: default_system_prompt(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Flat text corpus, chunks separated by a blank line
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,

    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Raw dot-product cutoff for the similarity strategy (exclusive)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding server URL; the LLM base URL when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_base_url: Option<String>,

    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Optional system instruction for `/ask_rag`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Use keyword retrieval when the embedding service is unreachable
    #[serde(default)]
    pub fallback_to_keyword: bool,
}

fn default_knowledge_base() -> PathBuf {
    PathBuf::from("knowledge_base.txt")
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_embedding_model() -> String {
    "mxbai-embed-large".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            knowledge_base: default_knowledge_base(),
            strategy: SearchStrategy::default(),
            similarity_threshold: default_similarity_threshold(),
            embedding_model: default_embedding_model(),
            embedding_base_url: None,
            embedding_timeout_secs: default_embedding_timeout_secs(),
            system_prompt: None,
            fallback_to_keyword: false,
        }
    }
}

impl RagConfig {
    /// Where embedding requests go
    pub fn embedding_url<'a>(&'a self, llm: &'a LlmConfig) -> &'a str {
        self.embedding_base_url.as_deref().unwrap_or(&llm.base_url)
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{var}' has an invalid value '{value}'")]
    InvalidEnvOverride { var: String, value: String },

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

/// Environment variables that override the file, in application order
pub const ENV_OVERRIDES: &[&str] = &[
    "ASKRAG_HOST",
    "ASKRAG_PORT",
    "OLLAMA_URL",
    "ASKRAG_MODEL",
    "ASKRAG_KNOWLEDGE_BASE",
    "ASKRAG_STRATEGY",
];

impl AskragConfig {
    /// Load configuration from a TOML file, apply environment overrides and
    /// validate the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config: AskragConfig = toml::from_str(&content)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;

        config.validate()?;

        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ASKRAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ASKRAG_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                var: "ASKRAG_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("ASKRAG_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = lookup("ASKRAG_KNOWLEDGE_BASE") {
            self.rag.knowledge_base = PathBuf::from(path);
        }
        if let Some(strategy) = lookup("ASKRAG_STRATEGY") {
            self.rag.strategy = strategy
                .parse()
                .map_err(|_| ConfigError::InvalidEnvOverride {
                    var: "ASKRAG_STRATEGY".to_string(),
                    value: strategy.clone(),
                })?;
        }
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        validate_url("llm.base_url", &self.llm.base_url)?;
        if let Some(ref url) = self.rag.embedding_base_url {
            validate_url("rag.embedding_base_url", url)?;
        }

        if self.rag.knowledge_base.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "rag.knowledge_base must not be empty".to_string(),
            ));
        }

        if !self.rag.similarity_threshold.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "rag.similarity_threshold must be a finite number, got {}",
                self.rag.similarity_threshold
            )));
        }

        if self.rag.strategy == SearchStrategy::Similarity
            && self.rag.embedding_model.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "rag.embedding_model is required for the similarity strategy".to_string(),
            ));
        }

        if self.rag.embedding_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rag.embedding_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value).map(|_| ()).map_err(|e| {
        ConfigError::ValidationError(format!("{} '{}' is not a URL: {}", field, value, e))
    })
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct AskragConfigManager {
    config: Arc<ArcSwap<AskragConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl AskragConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = AskragConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: AskragConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("askrag.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Record `path` as this manager's file, for a config built in memory
    /// standing in for a file that does not exist yet.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<AskragConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Replace the current configuration
    pub fn store(&self, config: AskragConfig) {
        self.config.store(Arc::new(config));
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = AskragConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = self.config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are seen
        let parent = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce_duration) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match AskragConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for AskragConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}
