//! # Natural Language to SQL
//!
//! This crate converts a natural-language question into a single SQL statement.
//! Relevant schema fragments are retrieved from a vector index, assembled into a
//! grounded, scope-aware prompt, and sent to a chat-completion provider.
//!
//! The pipeline, leaf first:
//!
//! 1. [`schema`] parses raw DDL into bounded [`SchemaChunk`]s, one per table.
//! 2. [`providers`] wraps the external embedding, chat, and vector-search APIs.
//! 3. [`index::SchemaIndex`] populates the vector store once and serves top-k retrieval.
//! 4. [`prompts::PromptAssembler`] builds the deterministic (system, user) prompt pair.
//! 5. [`generator::Nl2SqlService`] runs retrieve, assemble, generate, sanitize.

pub mod errors;
pub mod generator;
pub mod index;
pub mod prompts;
pub mod providers;
pub mod schema;

pub use errors::{GenerationError, Nl2SqlError, ProviderError, RetrievalError, SchemaSourceError};
pub use generator::{sanitize_sql, GenerateRequest, GeneratedSql, Nl2SqlService, Nl2SqlServiceBuilder};
pub use index::{PopulateOutcome, SchemaIndex};
pub use prompts::{PromptAssembler, PromptPair, ScopingTemplate};
pub use schema::{extract_schema_chunks, load_schema_chunks, SchemaChunk};
