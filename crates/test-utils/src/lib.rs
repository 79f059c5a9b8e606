//! # Test Utilities
//!
//! Mock providers shared by the `nl2sql` and `nl2sql-server` test suites. Each
//! mock records its calls behind an `Arc<Mutex<..>>`, so a clone handed to the
//! code under test still reports back to the test that created it.

use async_trait::async_trait;
use nl2sql::{
    errors::ProviderError,
    providers::{
        ai::{AiProvider, Embedder},
        vector::{InMemoryStore, VectorMatch, VectorRecord, VectorStore},
    },
    schema::SchemaChunk,
};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Dimension of the vectors produced by [`MockEmbedder`].
pub const MOCK_DIMENSION: usize = 16;

fn mock_failure(service: &'static str) -> ProviderError {
    ProviderError::Api {
        service,
        status: 503,
        body: "mock failure".to_string(),
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockAiProvider {
    /// Creates a provider that answers with `responses` in order, then with `SELECT 1;`.
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().rev().map(String::from).collect(),
            )),
            ..Default::default()
        }
    }

    /// Creates a provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Retrieves the recorded (system, user) prompt pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if self.fail {
            return Err(mock_failure("MockAiProvider"));
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| "SELECT 1;".to_string()))
    }
}

// --- Mock Embedder ---

/// A deterministic bag-of-words embedder.
///
/// Each lowercase word adds weight to one of [`MOCK_DIMENSION`] buckets, so texts
/// that share words end up close under cosine similarity.
#[derive(Clone, Debug, Default)]
pub struct MockEmbedder {
    batches: Arc<Mutex<Vec<usize>>>,
    fail: bool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// The size of every batch passed to `embed`, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; MOCK_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let word = word.strip_suffix('s').unwrap_or(&word);
            let bucket = word.bytes().map(usize::from).sum::<usize>() % MOCK_DIMENSION;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.batches.lock().unwrap().push(texts.len());
        if self.fail {
            return Err(mock_failure("MockEmbedder"));
        }
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

// --- Recording Vector Store ---

/// An [`InMemoryStore`] that counts calls and can be switched into a failing mode.
#[derive(Clone, Debug, Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    upsert_calls: Arc<Mutex<Vec<usize>>>,
    query_calls: Arc<Mutex<usize>>,
    fail: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Number of records in each upsert call, in call order.
    pub fn upsert_calls(&self) -> Vec<usize> {
        self.upsert_calls.lock().unwrap().clone()
    }

    pub fn query_calls(&self) -> usize {
        *self.query_calls.lock().unwrap()
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn vector_count(&self) -> Result<u64, ProviderError> {
        if self.fail {
            return Err(mock_failure("RecordingStore"));
        }
        self.inner.vector_count().await
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ProviderError> {
        self.upsert_calls.lock().unwrap().push(records.len());
        if self.fail {
            return Err(mock_failure("RecordingStore"));
        }
        self.inner.upsert(records).await
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ProviderError> {
        *self.query_calls.lock().unwrap() += 1;
        if self.fail {
            return Err(mock_failure("RecordingStore"));
        }
        self.inner.query(vector, top_k).await
    }
}

// --- Fixtures ---

/// The two-table schema used by the end-to-end scenarios.
pub const PATIENT_ROSTER_DDL: &str = "CREATE TABLE patient (id INT PRIMARY KEY, dob DATE); CREATE TABLE roster_patient (roster_id INT, patient_id INT);";

/// Builds `count` distinct single-column chunks named `table_0`, `table_1`, ...
pub fn numbered_chunks(count: usize) -> Vec<SchemaChunk> {
    (0..count)
        .map(|i| {
            SchemaChunk::new(
                format!("table_{i}"),
                format!("Table: table_{i}\nCREATE TABLE table_{i} (\n  col_{i} INT\n);"),
            )
        })
        .collect()
}
