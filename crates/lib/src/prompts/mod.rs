//! # Prompt Assembly
//!
//! Builds the (system, user) prompt pair for SQL generation from retrieved
//! schema chunks, the question, and the optional roster/tenant identifiers.
//!
//! Assembly is a pure function of its inputs: no clock, no randomness, no
//! reordering of chunks. Identical inputs produce byte-identical prompts.

pub mod core;
pub mod scoping;

pub use self::core::{NO_SCHEMA_CONTEXT_MARKER, SQL_GENERATION_SYSTEM_PROMPT, SQL_GENERATION_USER_PROMPT};
pub use scoping::ScopingTemplate;

use crate::schema::SchemaChunk;
use serde::Serialize;

/// A system prompt and a user prompt, ready to send to a chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Assembles grounded, scope-aware prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    template: ScopingTemplate,
}

impl PromptAssembler {
    pub fn new(template: ScopingTemplate) -> Self {
        Self { template }
    }

    /// Builds the prompt pair. Chunks appear in the context in the order given.
    pub fn build(
        &self,
        question: &str,
        chunks: &[SchemaChunk],
        roster_id: Option<i64>,
        client_id: Option<i64>,
    ) -> PromptPair {
        let t = &self.template;
        let schema_context = self::core::format_schema_context(chunks.iter().map(|c| c.text.as_str()));
        let scope_instructions = t.render(roster_id, client_id);

        let system = SQL_GENERATION_SYSTEM_PROMPT
            .replace("{dialect}", &t.dialect)
            .replace("{primary_table}", &t.primary_table)
            .replace("{primary_alias}", &t.primary_alias)
            .replace("{primary_key}", &t.primary_key)
            .replace("{scope_instructions}", &scope_instructions)
            .replace("{schema_context}", &schema_context);

        let user = SQL_GENERATION_USER_PROMPT.replace("{question}", question.trim());

        PromptPair { system, user }
    }
}
