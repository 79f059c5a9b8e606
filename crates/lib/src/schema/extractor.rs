//! # DDL Extractor
//!
//! Parses `CREATE TABLE` statements out of a SQL dump and renders each table as
//! a compact, normalized block of text.
//!
//! The rendering is deliberately not the verbatim DDL: column lines and
//! constraint lines are separated, each list is capped, and the result is
//! re-assembled so that very wide tables still fit within one embedding call.

use super::SchemaChunk;
use crate::errors::SchemaSourceError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Hard cap on the rendered text of a single chunk, in characters.
pub const MAX_CHUNK_CHARS: usize = 4000;
/// Only the first N column lines of a table are kept.
pub const MAX_COLUMN_LINES: usize = 40;
/// Only the first N constraint lines of a table are kept.
pub const MAX_CONSTRAINT_LINES: usize = 15;

pub const COLUMNS_TRUNCATED_MARKER: &str = "-- (columns truncated for brevity)";
pub const CONSTRAINTS_TRUNCATED_MARKER: &str = "-- (constraints truncated for brevity)";
pub const TEXT_TRUNCATED_MARKER: &str = "\n-- (truncated for embedding)\n";

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"]?([A-Za-z0-9_]+)[`"]?\s*\((.*?)\)[^;()]*;"#,
    )
    .expect("valid CREATE TABLE regex")
});

static NESTED_CREATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CREATE\s+TABLE\s").expect("valid nested CREATE regex"));

/// Keywords that mark a body line as a table-level constraint when they open it.
const CONSTRAINT_PREFIXES: [&str; 4] = ["constraint", "unique", "index", "key"];

/// Extracts one [`SchemaChunk`] per `CREATE TABLE` statement in `sql_text`.
///
/// Chunks come back in the order the tables appear in the source. Table options
/// between the closing parenthesis and the semicolon (`) ENGINE=InnoDB;`) are
/// ignored. A statement that is never closed is skipped, and scanning resumes at
/// the next `CREATE TABLE` it swallowed. If the same table is
/// defined more than once, the last definition wins but keeps the position of
/// the first.
pub fn extract_schema_chunks(sql_text: &str) -> Result<Vec<SchemaChunk>, SchemaSourceError> {
    let cleaned = strip_comments(sql_text);

    let mut chunks: Vec<SchemaChunk> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mut cursor = 0;
    while let Some(caps) = CREATE_TABLE_RE.captures_at(&cleaned, cursor) {
        let (Some(whole), Some(body_match)) = (caps.get(0), caps.get(2)) else {
            break;
        };
        // An unclosed statement runs into the next one; drop it and rescan from there.
        if let Some(inner) = NESTED_CREATE_RE.find(body_match.as_str()) {
            warn!(table = &caps[1], "Skipping unterminated CREATE TABLE statement");
            cursor = body_match.start() + inner.start();
            continue;
        }
        cursor = whole.end();

        let table_name = &caps[1];
        let body = body_match.as_str();
        let text = cap_chunk_text(render_table(table_name, body));
        debug!(table = table_name, chars = text.chars().count(), "Extracted table");

        match positions.get(table_name) {
            Some(&idx) => {
                warn!(
                    table = table_name,
                    "Table defined more than once; keeping the last definition"
                );
                chunks[idx].text = text;
            }
            None => {
                positions.insert(table_name.to_string(), chunks.len());
                chunks.push(SchemaChunk::new(table_name, text));
            }
        }
    }

    if chunks.is_empty() {
        return Err(SchemaSourceError::NoTablesFound {
            path: "<inline>".into(),
        });
    }
    Ok(chunks)
}

/// Removes `--` line comments and `/* */` block comments, leaving quoted
/// literals and identifiers untouched.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Returns `true` when a trimmed body line describes a constraint rather than a column.
fn is_constraint_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("primary key") || lower.contains("foreign key") {
        return true;
    }
    CONSTRAINT_PREFIXES.iter().any(|kw| {
        lower.strip_prefix(kw).is_some_and(|rest| {
            rest.chars()
                .next()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
        })
    })
}

fn render_table(table_name: &str, body: &str) -> String {
    let mut columns: Vec<&str> = Vec::new();
    let mut constraints: Vec<&str> = Vec::new();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let line = line.trim_end_matches(',');
        if is_constraint_line(line) {
            constraints.push(line);
        } else {
            columns.push(line);
        }
    }

    if columns.len() > MAX_COLUMN_LINES {
        columns.truncate(MAX_COLUMN_LINES);
        columns.push(COLUMNS_TRUNCATED_MARKER);
    }
    if constraints.len() > MAX_CONSTRAINT_LINES {
        constraints.truncate(MAX_CONSTRAINT_LINES);
        constraints.push(CONSTRAINTS_TRUNCATED_MARKER);
    }

    let compact_body = columns
        .into_iter()
        .chain(constraints)
        .collect::<Vec<_>>()
        .join(",\n  ");

    format!(
        "Table: {table_name}\n\
         Columns and constraints (simplified):\n\
         CREATE TABLE {table_name} (\n  {compact_body}\n);"
    )
}

/// Caps `text` at [`MAX_CHUNK_CHARS`] characters, appending a visible marker when cut.
fn cap_chunk_text(text: String) -> String {
    match text.char_indices().nth(MAX_CHUNK_CHARS) {
        None => text,
        Some((byte_idx, _)) => {
            let mut capped = text[..byte_idx].to_string();
            capped.push_str(TEXT_TRUNCATED_MARKER);
            capped
        }
    }
}
