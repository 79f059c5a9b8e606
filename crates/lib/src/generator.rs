//! # SQL Generation
//!
//! Composes the pipeline: retrieve schema chunks, assemble the prompt, call the
//! chat provider, and sanitize its reply into a bare SQL statement.
//!
//! Retrieval failures degrade to an empty schema context (logged at `warn`)
//! instead of failing the request; the prompt then carries the explicit
//! "no schema context" marker. Chat failures always fail the request.

use crate::{
    errors::{GenerationError, Nl2SqlError},
    index::SchemaIndex,
    prompts::{PromptAssembler, PromptPair},
    providers::ai::AiProvider,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Number of schema chunks retrieved per question when not configured.
pub const DEFAULT_TOP_K: usize = 8;

/// Language tags a model may put after an opening code fence.
const FENCE_LANGUAGE_TAGS: [&str; 8] = [
    "sql",
    "mysql",
    "postgresql",
    "postgres",
    "psql",
    "sqlite",
    "tsql",
    "plsql",
];

/// A question plus its optional scoping identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub question: String,
    #[serde(default)]
    pub roster_id: Option<i64>,
    #[serde(default)]
    pub client_id: Option<i64>,
}

/// The generated statement and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSql {
    pub sql: String,
    /// Ids of the schema chunks placed in the prompt, in prompt order.
    /// Empty when retrieval found nothing or failed.
    pub context_tables: Vec<String>,
    pub prompt: PromptPair,
}

/// Strips a surrounding code fence and its language tag from a model reply.
///
/// Replies that are not fenced are returned trimmed but otherwise verbatim.
pub fn sanitize_sql(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let inner = after_open.strip_suffix("```").unwrap_or(after_open);
    let inner = inner.trim_start_matches('`').trim_end_matches('`');

    let first_token_len = inner
        .find(char::is_whitespace)
        .unwrap_or(inner.len());
    let first_token = &inner[..first_token_len];
    let body = if FENCE_LANGUAGE_TAGS
        .iter()
        .any(|tag| first_token.eq_ignore_ascii_case(tag))
    {
        &inner[first_token_len..]
    } else {
        inner
    };
    body.trim().to_string()
}

/// The natural-language-to-SQL service.
#[derive(Debug, Clone)]
pub struct Nl2SqlService {
    index: SchemaIndex,
    assembler: PromptAssembler,
    ai_provider: Box<dyn AiProvider>,
    top_k: usize,
}

impl Nl2SqlService {
    pub fn builder() -> Nl2SqlServiceBuilder {
        Nl2SqlServiceBuilder::default()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Generates a single SQL statement for `request`.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedSql, GenerationError> {
        info!(
            roster_id = ?request.roster_id,
            client_id = ?request.client_id,
            "Generating SQL for question: {:?}",
            request.question
        );

        let chunks = match self.index.search(&request.question, self.top_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "Schema retrieval failed; continuing with empty schema context");
                Vec::new()
            }
        };
        let context_tables: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        debug!(?context_tables, "Retrieved schema context");

        let prompt = self.assembler.build(
            &request.question,
            &chunks,
            request.roster_id,
            request.client_id,
        );
        debug!(system_prompt = %prompt.system, user_prompt = %prompt.user, "--> Sending prompts to AI Provider");

        let raw_response = self
            .ai_provider
            .generate(&prompt.system, &prompt.user)
            .await
            .map_err(GenerationError::Chat)?;
        debug!("<-- Raw completion from AI: {}", raw_response);

        let sql = sanitize_sql(&raw_response);
        if sql.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(GeneratedSql {
            sql,
            context_tables,
            prompt,
        })
    }

    /// Convenience wrapper returning only the SQL text.
    pub async fn generate_sql(
        &self,
        question: &str,
        roster_id: Option<i64>,
        client_id: Option<i64>,
    ) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            question: question.to_string(),
            roster_id,
            client_id,
        };
        Ok(self.generate(&request).await?.sql)
    }
}

/// A builder for [`Nl2SqlService`].
#[derive(Default)]
pub struct Nl2SqlServiceBuilder {
    index: Option<SchemaIndex>,
    assembler: Option<PromptAssembler>,
    ai_provider: Option<Box<dyn AiProvider>>,
    top_k: Option<usize>,
}

impl Nl2SqlServiceBuilder {
    pub fn schema_index(mut self, index: SchemaIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = Some(assembler);
        self
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Builds the service. The schema index and AI provider are required; the
    /// assembler defaults to the built-in scoping template.
    pub fn build(self) -> Result<Nl2SqlService, Nl2SqlError> {
        Ok(Nl2SqlService {
            index: self.index.ok_or(Nl2SqlError::MissingSchemaIndex)?,
            assembler: self.assembler.unwrap_or_default(),
            ai_provider: self.ai_provider.ok_or(Nl2SqlError::MissingAiProvider)?,
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_sql;

    #[test]
    fn strips_fence_and_sql_tag() {
        assert_eq!(sanitize_sql("```sql\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(sanitize_sql("```\nSELECT p.id FROM patient p;\n```"), "SELECT p.id FROM patient p;");
    }

    #[test]
    fn tag_is_case_insensitive_and_may_share_the_line() {
        assert_eq!(sanitize_sql("```SQL SELECT 1;```"), "SELECT 1;");
        assert_eq!(sanitize_sql("```mysql\nSELECT 2;\n```"), "SELECT 2;");
    }

    #[test]
    fn unfenced_reply_is_only_trimmed() {
        assert_eq!(sanitize_sql("  SELECT 1;\n"), "SELECT 1;");
    }

    #[test]
    fn statement_starting_with_select_is_not_mistaken_for_a_tag() {
        assert_eq!(sanitize_sql("```SELECT 1;```"), "SELECT 1;");
    }

    #[test]
    fn unterminated_fence_is_still_stripped() {
        assert_eq!(sanitize_sql("```sql\nSELECT 3;"), "SELECT 3;");
    }
}
