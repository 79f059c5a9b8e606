//! # Vector Stores
//!
//! The [`VectorStore`] trait is the seam to the similarity-search backend that
//! holds one vector per schema chunk. Records are keyed by id, so writing the
//! same id twice overwrites the earlier record instead of duplicating it.

pub mod memory;
pub mod pinecone;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use memory::InMemoryStore;
pub use pinecone::{PineconeConfig, PineconeStore};

/// Metadata stored alongside each vector. The chunk text is reconstructed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub text: String,
}

impl From<&str> for VectorMetadata {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// A vector to be written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// A single ranked result from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<VectorMetadata>,
}

/// A similarity-search backend.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug + DynClone {
    /// The number of vectors currently held by the store.
    async fn vector_count(&self) -> Result<u64, ProviderError>;

    /// Inserts or overwrites records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ProviderError>;

    /// Returns up to `top_k` matches ordered by descending similarity.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ProviderError>;
}

dyn_clone::clone_trait_object!(VectorStore);
