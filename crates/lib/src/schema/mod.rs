//! # Schema Chunks
//!
//! This module turns a raw DDL dump into [`SchemaChunk`]s, the bounded units of
//! text that get embedded and indexed for retrieval. One chunk is produced per
//! `CREATE TABLE` statement.

pub mod extractor;

pub use extractor::{
    extract_schema_chunks, COLUMNS_TRUNCATED_MARKER, CONSTRAINTS_TRUNCATED_MARKER,
    MAX_CHUNK_CHARS, MAX_COLUMN_LINES, MAX_CONSTRAINT_LINES, TEXT_TRUNCATED_MARKER,
};

use crate::errors::SchemaSourceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// One database table rendered as embeddable text.
///
/// The `id` is the table name and is unique within a single extraction run.
/// The `text` never exceeds [`MAX_CHUNK_CHARS`] plus the truncation marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChunk {
    pub id: String,
    pub text: String,
}

impl SchemaChunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Reads the DDL file at `path` and extracts one chunk per table.
///
/// Fails if the file is missing or unreadable, or if it contains no
/// extractable `CREATE TABLE` statements. Both cases are fatal at startup.
pub fn load_schema_chunks(path: impl AsRef<Path>) -> Result<Vec<SchemaChunk>, SchemaSourceError> {
    let path = path.as_ref();
    let sql_text = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SchemaSourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SchemaSourceError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let chunks = extract_schema_chunks(&sql_text).map_err(|e| match e {
        SchemaSourceError::NoTablesFound { .. } => SchemaSourceError::NoTablesFound {
            path: path.to_path_buf(),
        },
        other => other,
    })?;

    info!(
        table_count = chunks.len(),
        path = %path.display(),
        "Loaded schema chunks"
    );
    Ok(chunks)
}
