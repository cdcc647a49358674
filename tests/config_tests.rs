//! Integration tests for the TOML configuration system
//!
//! These tests verify that configuration works end-to-end:
//! - A file on disk becomes a running router
//! - Edits to the file reach handlers without a restart

use askrag::{AppState, AskragConfigManager, SearchStrategy, api::create_router};
use axum_test::TestServer;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn write_config(path: &Path, knowledge_base: &Path, strategy: &str) {
    let content = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8000

[llm]
base_url = "http://localhost:11434"
model = "llama3"

[rag]
knowledge_base = "{}"
strategy = "{}"
similarity_threshold = 0.6
"#,
        knowledge_base.display().to_string().replace('\\', "\\\\"),
        strategy
    );
    std::fs::write(path, content).expect("Failed to write config");
}

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_state_from_config_file_serves_requests() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("askrag.toml");
    let kb = dir.path().join("missing.txt");
    write_config(&config_path, &kb, "keyword");

    let manager = Arc::new(AskragConfigManager::new(&config_path).unwrap());
    let state = AppState::from_config(manager).unwrap();

    assert_eq!(state.llm.model_name(), "llama3");
    assert!(state.embedder.is_some());
    assert_eq!(state.knowledge.path(), kb.as_path());
    assert!(!state.knowledge.is_loaded());

    // The knowledge base is only read on the first RAG request
    let server = TestServer::new(create_router(state)).unwrap();
    server.get("/").await.assert_status_ok();

    let response = server
        .post("/ask_rag")
        .json(&json!({"prompt": "anything"}))
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"error": "Knowledge base file not found."}));
}

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_pipeline_follows_manager_updates() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("askrag.toml");
    write_config(&config_path, &dir.path().join("kb.txt"), "keyword");

    let manager = Arc::new(AskragConfigManager::new(&config_path).unwrap());
    let state = AppState::from_config(manager.clone()).unwrap();
    assert_eq!(state.rag_pipeline().retriever().strategy(), SearchStrategy::Keyword);

    write_config(&config_path, &dir.path().join("kb.txt"), "similarity");
    manager.reload().unwrap();

    let retriever = state.rag_pipeline().retriever().clone();
    if std::env::var("ASKRAG_STRATEGY").is_err() {
        assert_eq!(retriever.strategy(), SearchStrategy::Similarity);
        assert_eq!(retriever.similarity_threshold(), 0.6);
    }
}

#[tokio::test]
async fn test_watcher_picks_up_file_changes() {
    if std::env::var("ASKRAG_STRATEGY").is_ok() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("askrag.toml");
    let kb = dir.path().join("kb.txt");
    write_config(&config_path, &kb, "keyword");

    let manager = AskragConfigManager::new(&config_path).unwrap();
    manager.start_watching().unwrap();

    // Give the watcher a moment to register
    tokio::time::sleep(Duration::from_millis(200)).await;
    write_config(&config_path, &kb, "similarity");

    let mut reloaded = false;
    for _ in 0..50 {
        if manager.config().rag.strategy == SearchStrategy::Similarity {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    manager.stop_watching();
    assert!(reloaded, "configuration was not hot-reloaded");
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("askrag.toml");
    std::fs::write(&config_path, "[rag]\nsimilarity_threshold = \"high\"\n").unwrap();

    assert!(AskragConfigManager::new(&config_path).is_err());
}
