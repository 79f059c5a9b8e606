//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `nl2sql-server`
//! integration tests.
//!
//! - `TestApp`: spawns the real router on a random port. The chat provider is
//!   the real OpenAI client pointed at an `httpmock::MockServer`; embeddings and
//!   vector search use the deterministic in-process mocks, pre-populated with
//!   the two-table patient/roster schema.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use nl2sql::{
    extract_schema_chunks, providers::ai::OpenAiChatProvider, Nl2SqlService, PromptAssembler,
    SchemaIndex,
};
use nl2sql_server::{config::AppConfig, router::create_router, state::AppState};
use nl2sql_test_utils::{MockEmbedder, RecordingStore, PATIENT_ROSTER_DDL};
use reqwest::Client;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};

/// Minimal YAML that satisfies the required keys.
pub const TEST_CONFIG_YAML: &str = "openai_api_key: sk-test\npinecone_api_key: pc-test\n";

/// A chat completion body whose single choice carries `content`.
pub fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

/// Initializes test logging once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub store: RecordingStore,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        init_tracing();

        let mock_server = MockServer::start_async().await;
        let config = AppConfig::from_yaml(TEST_CONFIG_YAML)?;

        let store = RecordingStore::new();
        let index = SchemaIndex::new(Box::new(MockEmbedder::new()), Box::new(store.clone()));
        index
            .ensure_populated(&extract_schema_chunks(PATIENT_ROSTER_DDL)?)
            .await?;

        let ai_provider = OpenAiChatProvider::new(
            &mock_server.url("/v1"),
            Some(config.openai_api_key.clone()),
            config.openai_model.clone(),
            config.temperature,
        )?;

        let service = Nl2SqlService::builder()
            .schema_index(index)
            .assembler(PromptAssembler::new(config.scoping_template()))
            .ai_provider(Box::new(ai_provider))
            .top_k(config.top_k)
            .build()?;

        let app_state = AppState {
            service: Arc::new(service),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            store,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver is gone if the server task already exited.
            let _ = tx.send(());
        }
    }
}
