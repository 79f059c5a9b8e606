//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. Building the state is the bootstrap sequence:
//! the schema is loaded, the vector index is connected and populated once, and
//! only then is the generation service handed to the request handlers.

use crate::config::AppConfig;
use nl2sql::{
    load_schema_chunks,
    providers::{
        ai::{OpenAiChatProvider, OpenAiEmbedder},
        vector::{PineconeStore, VectorStore},
    },
    Nl2SqlError, Nl2SqlService, PopulateOutcome, PromptAssembler, SchemaChunk, SchemaIndex,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The generation pipeline. Read-only after startup.
    pub service: Arc<Nl2SqlService>,
}

/// Builds the shared application state from the configuration.
///
/// Any failure here is fatal: the server must not start without schema
/// context or a reachable vector index.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let chunks = load_schema_chunks(&config.schema_sql_path).map_err(Nl2SqlError::from)?;

    let store = PineconeStore::connect(&config.pinecone_config())
        .await
        .map_err(Nl2SqlError::from)?;

    let service = build_service(&config, &chunks, Box::new(store)).await?;

    Ok(AppState {
        service: Arc::new(service),
    })
}

/// Wires the OpenAI clients, the schema index over `store`, and the prompt
/// assembler into an [`Nl2SqlService`], populating the index if it is empty.
pub async fn build_service(
    config: &AppConfig,
    chunks: &[SchemaChunk],
    store: Box<dyn VectorStore>,
) -> Result<Nl2SqlService, Nl2SqlError> {
    let embedder = OpenAiEmbedder::new(
        &config.openai_api_base,
        Some(config.openai_api_key.clone()),
        config.openai_embed_model.clone(),
    )?;
    let index = SchemaIndex::new(Box::new(embedder), store)
        .with_batch_size(config.upsert_batch_size);

    match index.ensure_populated(chunks).await? {
        PopulateOutcome::AlreadyPopulated { existing } => {
            info!(existing, "Reusing existing schema vectors")
        }
        PopulateOutcome::Populated { upserted } => {
            info!(upserted, "Populated schema index")
        }
    }

    let ai_provider = OpenAiChatProvider::new(
        &config.openai_api_base,
        Some(config.openai_api_key.clone()),
        config.openai_model.clone(),
        config.temperature,
    )?;

    Nl2SqlService::builder()
        .schema_index(index)
        .assembler(PromptAssembler::new(config.scoping_template()))
        .ai_provider(Box::new(ai_provider))
        .top_k(config.top_k)
        .build()
}
