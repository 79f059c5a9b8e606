//! # Route Handlers
//!
//! The Axum handlers for the `nl2sql-server`: the root banner, the health
//! check, and the main natural-language-to-SQL endpoint.

use crate::{
    errors::AppError,
    state::AppState,
    types::{DebugParams, Nl2SqlRequest, Nl2SqlResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use nl2sql::GenerateRequest;
use serde_json::{json, Value};
use tracing::info;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "nl2sql server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Generates a single SQL statement for the question in the request body.
///
/// With `?debug=true` the response also carries the retrieved tables and the
/// exact prompts sent to the model.
pub async fn nl2sql_handler(
    State(app_state): State<AppState>,
    debug_params: Result<Query<DebugParams>, QueryRejection>,
    payload: Result<Json<Nl2SqlRequest>, JsonRejection>,
) -> Result<Json<Nl2SqlResponse>, AppError> {
    let Query(debug_params) = debug_params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if payload.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }
    info!(
        roster_id = ?payload.roster_id,
        client_id = ?payload.client_id,
        "Received nl2sql request"
    );

    let request = GenerateRequest {
        question: payload.question.clone(),
        roster_id: payload.roster_id,
        client_id: payload.client_id,
    };
    let generated = app_state.service.generate(&request).await?;

    let debug = debug_params.debug.unwrap_or(false).then(|| {
        json!({
            "context_tables": generated.context_tables,
            "system_prompt": generated.prompt.system,
            "user_prompt": generated.prompt.user,
        })
    });

    Ok(Json(Nl2SqlResponse {
        question: payload.question,
        roster_id: payload.roster_id,
        client_id: payload.client_id,
        sql: generated.sql,
        debug,
    }))
}
