//! # Pinecone Vector Store
//!
//! A thin REST client over Pinecone's control plane (index lifecycle) and data
//! plane (stats, upsert, query). All data-plane calls are scoped to a single
//! namespace.

use super::{VectorMatch, VectorRecord, VectorStore};
use crate::errors::ProviderError;
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const SERVICE: &str = "Pinecone API";
const API_VERSION: &str = "2024-07";
const READY_POLL_ATTEMPTS: u32 = 30;
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Connection settings for a Pinecone serverless index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Control-plane root, normally `https://api.pinecone.io`.
    pub controller_url: String,
    pub index_name: String,
    pub namespace: String,
    pub cloud: String,
    pub region: String,
    pub dimension: usize,
}

// --- Control plane ---

#[derive(Deserialize, Debug)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Deserialize, Debug, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize, Debug)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'static str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize, Debug)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize, Debug)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

// --- Data plane ---

#[derive(Deserialize, Debug)]
struct DescribeIndexStatsResponse {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceSummary>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: u64,
}

#[derive(Serialize, Debug)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize, Debug)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

/// A [`VectorStore`] backed by one namespace of a Pinecone index.
#[derive(Clone, Debug)]
pub struct PineconeStore {
    client: ReqwestClient,
    api_key: String,
    index_url: String,
    namespace: String,
}

impl PineconeStore {
    /// Creates a store that talks directly to an index's data-plane URL.
    pub fn new(api_key: String, index_url: &str, namespace: String) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_key,
            index_url: normalize_host(index_url),
            namespace,
        })
    }

    /// Resolves the index host through the control plane, creating the index
    /// first if it does not exist, and waits until it reports ready.
    pub async fn connect(config: &PineconeConfig) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        let controller = config.controller_url.trim_end_matches('/');
        let describe_url = format!("{controller}/indexes/{}", config.index_name);

        let mut description = describe_index(&client, &config.api_key, &describe_url).await?;
        if description.is_none() {
            info!(
                index = %config.index_name,
                dimension = config.dimension,
                "Vector index not found; creating it"
            );
            let body = CreateIndexRequest {
                name: &config.index_name,
                dimension: config.dimension,
                metric: "cosine",
                spec: IndexSpec {
                    serverless: ServerlessSpec {
                        cloud: &config.cloud,
                        region: &config.region,
                    },
                },
            };
            let request = with_headers(
                client.post(format!("{controller}/indexes")),
                &config.api_key,
            )
            .json(&body);
            send(request).await?;
        }

        let mut attempts = 0;
        let host = loop {
            match description {
                Some(desc) if desc.status.ready => break desc.host,
                _ if attempts >= READY_POLL_ATTEMPTS => {
                    return Err(ProviderError::IndexNotReady(config.index_name.clone()));
                }
                _ => {
                    attempts += 1;
                    debug!(attempt = attempts, "Waiting for vector index to become ready");
                    tokio::time::sleep(READY_POLL_INTERVAL).await;
                    description = describe_index(&client, &config.api_key, &describe_url).await?;
                }
            }
        };

        info!(index = %config.index_name, %host, "Connected to vector index");
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            index_url: normalize_host(&host),
            namespace: config.namespace.clone(),
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = with_headers(
            self.client.post(format!("{}{path}", self.index_url)),
            &self.api_key,
        )
        .json(body);
        let response = send(request).await?;
        response
            .json()
            .await
            .map_err(|source| ProviderError::Deserialization {
                service: SERVICE,
                source,
            })
    }
}

/// Describes an index, returning `None` when it does not exist.
async fn describe_index(
    client: &ReqwestClient,
    api_key: &str,
    url: &str,
) -> Result<Option<IndexDescription>, ProviderError> {
    let response = with_headers(client.get(url), api_key)
        .send()
        .await
        .map_err(|source| ProviderError::Request {
            service: SERVICE,
            source,
        })?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map(Some)
        .map_err(|source| ProviderError::Deserialization {
            service: SERVICE,
            source,
        })
}

fn with_headers(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
}

async fn send(request: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Request {
            service: SERVICE,
            source,
        })?;
    check_status(response).await
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        service: SERVICE,
        status: status.as_u16(),
        body,
    })
}

/// Pinecone reports bare hostnames; tests and proxies may pass full URLs.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn vector_count(&self) -> Result<u64, ProviderError> {
        let stats: DescribeIndexStatsResponse = self
            .post_json("/describe_index_stats", &serde_json::json!({}))
            .await?;
        Ok(stats
            .namespaces
            .get(&self.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ProviderError> {
        if records.is_empty() {
            return Ok(());
        }
        let body = UpsertRequest {
            vectors: &records,
            namespace: &self.namespace,
        };
        let _: serde_json::Value = self.post_json("/vectors/upsert", &body).await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ProviderError> {
        let body = QueryRequest {
            namespace: &self.namespace,
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let response: QueryResponse = self.post_json("/query", &body).await?;
        Ok(response.matches)
    }
}
