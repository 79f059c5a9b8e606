//! In-memory [`VectorStore`] for local development and tests.
//!
//! Vector search is brute-force cosine similarity over every stored vector.

use super::{VectorMatch, VectorRecord, VectorStore};
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A cloneable handle to a shared in-memory vector store.
///
/// Clones share the same underlying records.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<BTreeMap<String, VectorRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record stored under `id`, if any.
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn vector_count(&self) -> Result<u64, ProviderError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.len() as u64)
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ProviderError> {
        let mut stored = self.records.write().unwrap_or_else(|e| e.into_inner());
        for record in records {
            stored.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ProviderError> {
        let stored = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut matches: Vec<VectorMatch> = stored
            .values()
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                metadata: Some(r.metadata.clone()),
            })
            .collect();
        // Stable sort: ties keep id order, which keeps results deterministic.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}
