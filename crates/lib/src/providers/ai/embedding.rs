//! # Embeddings Provider
//!
//! This module provides the embedding gateway: one vector per input text, in the
//! same order as the inputs. Batching policy belongs to the caller; a single
//! `embed` call sends every text it is given in one request.

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

const SERVICE: &str = "Embeddings API";

/// Turns texts into vectors.
#[async_trait]
pub trait Embedder: Send + Sync + Debug + DynClone {
    /// Embeds every text in `texts`, returning one vector per text in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

dyn_clone::clone_trait_object!(Embedder);

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// An [`Embedder`] backed by the OpenAI `/embeddings` endpoint or a compatible server.
#[derive(Clone, Debug)]
pub struct OpenAiEmbedder {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates a new `OpenAiEmbedder`. The `/embeddings` path is appended to `api_base`.
    pub fn new(api_base: &str, api_key: Option<String>, model: String) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url: format!("{}/embeddings", api_base.trim_end_matches('/')),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = OpenAIEmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        debug!(model = %self.model, inputs = texts.len(), "--> Sending request to Embeddings API");

        let mut request_builder = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let mut embedding_response: OpenAIEmbeddingResponse =
            response
                .json()
                .await
                .map_err(|source| ProviderError::Deserialization {
                    service: SERVICE,
                    source,
                })?;

        if embedding_response.data.len() != texts.len() {
            return Err(ProviderError::DimensionMismatch {
                expected: texts.len(),
                actual: embedding_response.data.len(),
            });
        }

        // The API reports each vector's input position; don't rely on array order.
        embedding_response.data.sort_by_key(|d| d.index);
        Ok(embedding_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }
}
