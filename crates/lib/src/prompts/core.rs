//! # Default Prompt Templates
//!
//! This module contains the fixed text blocks used by the
//! [`PromptAssembler`](super::PromptAssembler).
//!
//! Placeholders are substituted with plain `str::replace`, never with anything
//! time- or order-dependent, so the same inputs always yield the same prompt.

/// The system prompt for SQL generation.
///
/// Placeholders: `{dialect}`, `{primary_table}`, `{primary_alias}`,
/// `{primary_key}`, `{scope_instructions}`, `{schema_context}`
pub const SQL_GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert SQL generator for a {dialect} database.

You must:
- Use ONLY the tables and columns that exist in the provided schema context.
- Choose the correct joins and filters based on the question.
- Prefer {primary_table}-level queries where each row corresponds to a {primary_table}.
- Use the `{primary_table}` table (aliased as `{primary_alias}`) as the main driving table whenever possible.
- Unless the user explicitly wants only an aggregate (e.g. COUNT(*)), start your query with:
    SELECT {primary_alias}.{primary_key}
  and then any additional columns needed.
- Write valid {dialect} SQL.
- Output exactly one SQL statement.
- Do NOT include explanations, comments, or Markdown.
- Do NOT wrap the SQL in backticks or code fences.
- Do NOT use placeholders like <value>; use concrete values when the question implies them.
- For relative dates such as "today" or "last month", use the database's own date functions instead of literal dates.

SCOPING INSTRUCTIONS:
{scope_instructions}

DATABASE SCHEMA CONTEXT (excerpts):
{schema_context}"#;

/// The user prompt for SQL generation.
///
/// Placeholders: `{question}`
pub const SQL_GENERATION_USER_PROMPT: &str = r#"User question:
{question}

Return ONLY the SQL statement."#;

/// Stands in for the schema context when retrieval returned nothing.
pub const NO_SCHEMA_CONTEXT_MARKER: &str =
    "-- (no schema context available; use only tables the question names explicitly)";

/// Separator between chunk texts in the schema context block.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Joins chunk texts into the schema context block.
pub fn format_schema_context<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let context = texts.into_iter().collect::<Vec<_>>().join(CHUNK_SEPARATOR);
    if context.trim().is_empty() {
        NO_SCHEMA_CONTEXT_MARKER.to_string()
    } else {
        context
    }
}
