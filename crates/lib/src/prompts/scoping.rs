//! # Scoping Instructions
//!
//! Renders the `SCOPING INSTRUCTIONS` block of the system prompt: the
//! primary-entity query shape, and the roster and tenant clauses driven by the
//! optional identifiers on a request.
//!
//! The join table and column names differ between schemas, so they come from a
//! [`ScopingTemplate`] instead of being baked into the text.

use serde::{Deserialize, Serialize};

/// Schema-specific names used when rendering scoping instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopingTemplate {
    /// SQL dialect named in the prompt (e.g. `MySQL`).
    pub dialect: String,
    /// The driving table every query should start from.
    pub primary_table: String,
    pub primary_alias: String,
    /// Identifier column of the primary table, selected first.
    pub primary_key: String,
    /// Association table linking rosters to primary entities.
    pub roster_table: String,
    pub roster_alias: String,
    /// Column of the roster table that references the primary key.
    pub roster_fk_column: String,
    /// Column of the roster table holding the roster identifier.
    pub roster_id_column: String,
    pub soft_delete_column: String,
    pub active_column: String,
    /// Column that carries the tenant identifier on tenant-scoped tables.
    pub tenant_column: String,
}

impl Default for ScopingTemplate {
    fn default() -> Self {
        Self {
            dialect: "MySQL".to_string(),
            primary_table: "patient".to_string(),
            primary_alias: "p".to_string(),
            primary_key: "id".to_string(),
            roster_table: "roster_patient".to_string(),
            roster_alias: "rp".to_string(),
            roster_fk_column: "patient_id".to_string(),
            roster_id_column: "roster_id".to_string(),
            soft_delete_column: "is_deleted".to_string(),
            active_column: "is_active".to_string(),
            tenant_column: "client_id".to_string(),
        }
    }
}

impl ScopingTemplate {
    /// Lines describing the primary-entity query shape. Always present.
    pub fn entity_lines(&self) -> Vec<String> {
        let table = &self.primary_table;
        let alias = &self.primary_alias;
        vec![
            format!(
                "Think from a {}-CENTRIC perspective.",
                table.to_uppercase()
            ),
            format!("Whenever it makes sense, return one row per {table}."),
            format!("Use the `{table}` table as the driving table, aliased as `{alias}`."),
            format!(
                "Unless the user explicitly asks only for an aggregate (like COUNT), start the SELECT clause with `SELECT {alias}.{pk}` as the first column, then add any other needed {table} columns.",
                pk = self.primary_key
            ),
            format!("Use {}-compatible SQL syntax.", self.dialect),
        ]
    }

    /// The roster clause: a join filter when `roster_id` is set, an explicit
    /// "no roster filter" instruction otherwise.
    pub fn roster_clause(&self, roster_id: Option<i64>) -> String {
        let ra = &self.roster_alias;
        match roster_id {
            Some(id) => format!(
                "- The selected {rid_col} is {id}. Restrict results to {table} rows in that roster.\n\
                 \x20 Typically you should join the roster association table, for example:\n\
                 \x20 `FROM {table} {alias}\n\
                 \x20  JOIN {roster_table} {ra} ON {ra}.{fk} = {alias}.{pk}\n\
                 \x20    AND {ra}.{deleted} = 0\n\
                 \x20    AND {ra}.{active} = 1\n\
                 \x20    AND {ra}.{rid_col} = {id}`\n\
                 \x20 Exclude soft-deleted or inactive association rows only when those columns exist in the schema context. \
                 Adjust table and column names to match the actual schema, but always limit to this roster when {rid_col} is given.",
                rid_col = self.roster_id_column,
                table = self.primary_table,
                alias = self.primary_alias,
                roster_table = self.roster_table,
                fk = self.roster_fk_column,
                pk = self.primary_key,
                deleted = self.soft_delete_column,
                active = self.active_column,
            ),
            None => format!(
                "- No roster is selected. Do NOT add a {rid_col} filter or join `{roster_table}` for scoping unless the question itself names a specific roster.",
                rid_col = self.roster_id_column,
                roster_table = self.roster_table,
            ),
        }
    }

    /// The tenant clause: a conditional filter when `client_id` is set, an
    /// explicit prohibition otherwise.
    pub fn tenant_clause(&self, client_id: Option<i64>) -> String {
        let col = &self.tenant_column;
        match client_id {
            Some(id) => format!(
                "- The selected {col} is {id}. If relevant tables in the schema context have a `{col}` column, add conditions like `AND <table>.{col} = {id}` so the query is scoped to that client."
            ),
            None => format!("- No client is selected. Do NOT add any `{col}` filter."),
        }
    }

    /// Renders the full scoping block.
    pub fn render(&self, roster_id: Option<i64>, client_id: Option<i64>) -> String {
        let mut lines = self.entity_lines();
        lines.push(self.roster_clause(roster_id));
        lines.push(self.tenant_clause(client_id));
        lines.join("\n")
    }
}
