//! # Schema Index
//!
//! Owns the population and retrieval of schema chunks in a vector store.
//!
//! Population is "fill if empty": when the store already holds at least one
//! vector, [`SchemaIndex::ensure_populated`] does nothing. Otherwise every chunk
//! is embedded and upserted in fixed-size batches so no single request grows
//! with the size of the schema.

use crate::{
    errors::{ProviderError, RetrievalError},
    providers::{
        ai::Embedder,
        vector::{VectorMetadata, VectorRecord, VectorStore},
    },
    schema::SchemaChunk,
};
use tracing::{debug, info, warn};

/// Number of chunks embedded and upserted per request during population.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 32;

/// What [`SchemaIndex::ensure_populated`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// The store already held vectors; nothing was written.
    AlreadyPopulated { existing: u64 },
    /// The store was empty and this many chunks were written.
    Populated { upserted: usize },
}

/// Semantic index over schema chunks.
#[derive(Clone, Debug)]
pub struct SchemaIndex {
    embedder: Box<dyn Embedder>,
    store: Box<dyn VectorStore>,
    batch_size: usize,
}

impl SchemaIndex {
    pub fn new(embedder: Box<dyn Embedder>, store: Box<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            batch_size: DEFAULT_UPSERT_BATCH_SIZE,
        }
    }

    /// Overrides the population batch size. Values below one are clamped to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embeds and upserts `chunks` if the store is empty; otherwise does nothing.
    ///
    /// Meant to be called once at startup. Re-running it after a partial failure
    /// is safe: records are keyed by table name, so a repeated upsert overwrites.
    pub async fn ensure_populated(
        &self,
        chunks: &[SchemaChunk],
    ) -> Result<PopulateOutcome, RetrievalError> {
        let existing = self
            .store
            .vector_count()
            .await
            .map_err(RetrievalError::VectorStore)?;
        if existing > 0 {
            info!(existing, "Schema index already populated");
            return Ok(PopulateOutcome::AlreadyPopulated { existing });
        }

        info!(
            table_count = chunks.len(),
            batch_size = self.batch_size,
            "Uploading schema vectors"
        );
        for (batch, group) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = group.iter().map(|c| c.text.clone()).collect();
            let vectors = self
                .embedder
                .embed(&texts)
                .await
                .map_err(RetrievalError::Embedding)?;
            if vectors.len() != group.len() {
                return Err(RetrievalError::Embedding(
                    ProviderError::DimensionMismatch {
                        expected: group.len(),
                        actual: vectors.len(),
                    },
                ));
            }

            let records = group
                .iter()
                .zip(vectors)
                .map(|(chunk, values)| VectorRecord {
                    id: chunk.id.clone(),
                    values,
                    metadata: VectorMetadata {
                        text: chunk.text.clone(),
                    },
                })
                .collect();
            self.store
                .upsert(records)
                .await
                .map_err(RetrievalError::VectorStore)?;
            debug!(batch, size = group.len(), "Upserted schema batch");
        }

        info!(upserted = chunks.len(), "Schema upload complete");
        Ok(PopulateOutcome::Populated {
            upserted: chunks.len(),
        })
    }

    /// Returns up to `top_k` chunks most similar to `query`, in the store's ranking order.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SchemaChunk>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(RetrievalError::Embedding)?
            .into_iter()
            .next()
            .ok_or(RetrievalError::Embedding(ProviderError::DimensionMismatch {
                expected: 1,
                actual: 0,
            }))?;

        let matches = self
            .store
            .query(&query_vector, top_k)
            .await
            .map_err(RetrievalError::VectorStore)?;

        let chunks: Vec<SchemaChunk> = matches
            .into_iter()
            .take(top_k)
            .filter_map(|m| match m.metadata {
                Some(metadata) => Some(SchemaChunk::new(m.id, metadata.text)),
                None => {
                    warn!(id = %m.id, "Vector match has no text metadata; skipping");
                    None
                }
            })
            .collect();

        debug!(top_k, returned = chunks.len(), "Schema search complete");
        Ok(chunks)
    }
}
