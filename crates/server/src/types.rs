use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

/// The request body for the `/nl2sql` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nl2SqlRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub roster_id: Option<i64>,
    #[serde(default)]
    pub client_id: Option<i64>,
}

/// The response body for the `/nl2sql` endpoint.
///
/// The identifiers are echoed back as received, `null` when absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct Nl2SqlResponse {
    pub question: String,
    pub roster_id: Option<i64>,
    pub client_id: Option<i64>,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
}
