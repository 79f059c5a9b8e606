//! # HTTP Provider Tests
//!
//! Exercises the OpenAI-compatible chat and embedding clients and the Pinecone
//! vector store against an `httpmock` server, checking both the requests they
//! send and how they interpret responses.

use httpmock::{Method::GET, Method::POST, MockServer};
use nl2sql::providers::ai::{AiProvider, Embedder, OpenAiChatProvider, OpenAiEmbedder};
use nl2sql::providers::vector::{
    PineconeConfig, PineconeStore, VectorMetadata, VectorRecord, VectorStore,
};
use nl2sql::ProviderError;
use serde_json::json;
use std::time::Duration;

// --- Chat completions ---

#[tokio::test]
async fn test_chat_provider_sends_prompts_and_returns_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "gpt-test", "temperature": 0.5}"#)
                .body_contains(r#""role":"system","content":"system text""#)
                .body_contains(r#""role":"user","content":"user text""#);
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "```sql\nSELECT 1;\n```"}}]
            }));
        })
        .await;

    let provider = OpenAiChatProvider::new(
        &server.url("/v1"),
        Some("sk-test".to_string()),
        "gpt-test".to_string(),
        0.5,
    )
    .unwrap();
    let content = provider.generate("system text", "user text").await.unwrap();

    mock.assert_async().await;
    assert_eq!(content, "```sql\nSELECT 1;\n```");
}

#[tokio::test]
async fn test_chat_provider_reports_api_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        })
        .await;

    let provider =
        OpenAiChatProvider::new(&server.base_url(), None, "gpt-test".to_string(), 0.5).unwrap();
    let err = provider.generate("s", "u").await.unwrap_err();

    match err {
        ProviderError::Api { status, body, .. } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_provider_without_choices_is_empty_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let provider =
        OpenAiChatProvider::new(&server.base_url(), None, "gpt-test".to_string(), 0.5).unwrap();
    let err = provider.generate("s", "u").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse(_)));
}

// --- Embeddings ---

#[tokio::test]
async fn test_embedder_orders_vectors_by_index() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embeddings")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({"model": "embed-test", "input": ["first", "second"]}));
            then.status(200).json_body(json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]
            }));
        })
        .await;

    let embedder = OpenAiEmbedder::new(
        &server.base_url(),
        Some("sk-test".to_string()),
        "embed-test".to_string(),
    )
    .unwrap();
    let vectors = embedder
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn test_embedder_skips_request_for_empty_input() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let embedder = OpenAiEmbedder::new(&server.base_url(), None, "embed-test".to_string()).unwrap();
    let vectors = embedder.embed(&[]).await.unwrap();

    assert!(vectors.is_empty());
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_embedder_rejects_count_mismatch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200)
                .json_body(json!({ "data": [{ "index": 0, "embedding": [1.0] }] }));
        })
        .await;

    let embedder = OpenAiEmbedder::new(&server.base_url(), None, "embed-test".to_string()).unwrap();
    let err = embedder
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::DimensionMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

// --- Pinecone data plane ---

fn pinecone_store(server: &MockServer) -> PineconeStore {
    PineconeStore::new("pc-key".to_string(), &server.base_url(), "schema".to_string()).unwrap()
}

#[tokio::test]
async fn test_pinecone_vector_count_is_namespace_scoped() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/describe_index_stats")
                .header("api-key", "pc-key")
                .header("x-pinecone-api-version", "2024-07");
            then.status(200).json_body(json!({
                "namespaces": {
                    "other": { "vectorCount": 99 },
                    "schema": { "vectorCount": 12 }
                },
                "dimension": 1536,
                "totalVectorCount": 111
            }));
        })
        .await;

    let count = pinecone_store(&server).vector_count().await.unwrap();

    mock.assert_async().await;
    assert_eq!(count, 12);
}

#[tokio::test]
async fn test_pinecone_vector_count_for_missing_namespace_is_zero() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/describe_index_stats");
            then.status(200).json_body(json!({ "namespaces": {} }));
        })
        .await;

    assert_eq!(pinecone_store(&server).vector_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pinecone_upsert_sends_records_with_namespace() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/vectors/upsert").json_body(json!({
                "vectors": [
                    { "id": "patient", "values": [0.5, 0.25], "metadata": { "text": "Table: patient" } }
                ],
                "namespace": "schema"
            }));
            then.status(200).json_body(json!({ "upsertedCount": 1 }));
        })
        .await;

    pinecone_store(&server)
        .upsert(vec![VectorRecord {
            id: "patient".to_string(),
            values: vec![0.5, 0.25],
            metadata: VectorMetadata::from("Table: patient"),
        }])
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_pinecone_upsert_of_nothing_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/vectors/upsert");
            then.status(200).json_body(json!({ "upsertedCount": 0 }));
        })
        .await;

    pinecone_store(&server).upsert(Vec::new()).await.unwrap();
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_pinecone_query_parses_matches() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/query").json_body(json!({
                "namespace": "schema",
                "vector": [1.0, 0.0],
                "topK": 2,
                "includeMetadata": true,
                "includeValues": false
            }));
            then.status(200).json_body(json!({
                "matches": [
                    { "id": "roster_patient", "score": 0.9, "metadata": { "text": "Table: roster_patient" } },
                    { "id": "patient", "score": 0.7 }
                ],
                "namespace": "schema"
            }));
        })
        .await;

    let matches = pinecone_store(&server).query(&[1.0, 0.0], 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "roster_patient");
    assert_eq!(
        matches[0].metadata,
        Some(VectorMetadata::from("Table: roster_patient"))
    );
    assert_eq!(matches[1].metadata, None);
}

// --- Pinecone control plane ---

fn pinecone_config(server: &MockServer) -> PineconeConfig {
    PineconeConfig {
        api_key: "pc-key".to_string(),
        controller_url: server.base_url(),
        index_name: "nl2sql-schema-index".to_string(),
        namespace: "schema".to_string(),
        cloud: "aws".to_string(),
        region: "us-east-1".to_string(),
        dimension: 1536,
    }
}

#[tokio::test]
async fn test_pinecone_connect_uses_existing_ready_index() {
    let server = MockServer::start_async().await;
    let describe = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/indexes/nl2sql-schema-index")
                .header("api-key", "pc-key");
            then.status(200).json_body(json!({
                "name": "nl2sql-schema-index",
                "host": server.base_url(),
                "status": { "ready": true, "state": "Ready" }
            }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/indexes");
            then.status(201);
        })
        .await;
    let stats = server
        .mock_async(|when, then| {
            when.method(POST).path("/describe_index_stats");
            then.status(200)
                .json_body(json!({ "namespaces": { "schema": { "vectorCount": 3 } } }));
        })
        .await;

    let store = PineconeStore::connect(&pinecone_config(&server)).await.unwrap();
    assert_eq!(store.vector_count().await.unwrap(), 3);

    describe.assert_async().await;
    create.assert_hits_async(0).await;
    stats.assert_async().await;
}

#[tokio::test]
async fn test_pinecone_connect_creates_missing_index() {
    let server = MockServer::start_async().await;
    let config = pinecone_config(&server);

    let not_found = server
        .mock_async(|when, then| {
            when.method(GET).path("/indexes/nl2sql-schema-index");
            then.status(404).json_body(json!({ "error": { "code": "NOT_FOUND" } }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/indexes").json_body(json!({
                "name": "nl2sql-schema-index",
                "dimension": 1536,
                "metric": "cosine",
                "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } }
            }));
            then.status(201).json_body(json!({
                "name": "nl2sql-schema-index",
                "host": "",
                "status": { "ready": false, "state": "Initializing" }
            }));
        })
        .await;

    let connecting = tokio::spawn(async move { PineconeStore::connect(&config).await });

    // The store sleeps between readiness polls, so the index can be flipped to
    // ready once creation has been requested.
    for _ in 0..100 {
        if create.hits_async().await > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    create.assert_async().await;
    not_found.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/indexes/nl2sql-schema-index");
            then.status(200).json_body(json!({
                "name": "nl2sql-schema-index",
                "host": server.base_url(),
                "status": { "ready": true, "state": "Ready" }
            }));
        })
        .await;

    let store = connecting.await.unwrap();
    assert!(store.is_ok());
}
