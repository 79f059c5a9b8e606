use std::path::PathBuf;
use thiserror::Error;

/// Failures of an external capability (chat, embeddings, vector index).
///
/// These are transport-level errors. The components that call a provider wrap
/// them into [`RetrievalError`] or [`GenerationError`] so callers can tell which
/// stage of the pipeline failed.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to deserialize {service} response: {source}")]
    Deserialization {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
    #[error("Embedding API returned {actual} vectors for {expected} inputs")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Vector index '{0}' did not become ready in time")]
    IndexNotReady(String),
}

/// The schema source could not produce any chunks.
#[derive(Error, Debug)]
pub enum SchemaSourceError {
    #[error("Schema SQL file not found at {}. Set SCHEMA_SQL_PATH or place the file in the working directory.", .path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read schema SQL file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No CREATE TABLE statements found in {}. Check SCHEMA_SQL_PATH or the SQL format.", .path.display())]
    NoTablesFound { path: PathBuf },
}

/// The embedding or vector-index backend failed during population or search.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding service error: {0}")]
    Embedding(#[source] ProviderError),
    #[error("Vector store error: {0}")]
    VectorStore(#[source] ProviderError),
}

/// The chat completion failed or produced nothing usable.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Chat completion failed: {0}")]
    Chat(#[source] ProviderError),
    #[error("The model returned no SQL statement")]
    EmptyCompletion,
}

/// Umbrella error for assembling and bootstrapping the service.
#[derive(Error, Debug)]
pub enum Nl2SqlError {
    #[error(transparent)]
    SchemaSource(#[from] SchemaSourceError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("AI provider is missing")]
    MissingAiProvider,
    #[error("Schema index is missing")]
    MissingSchemaIndex,
}
