use market_core::DashboardSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Success Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub result: Value,
}

/// JSON-RPC 2.0 Error Response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub error: ErrorObject,
}

/// JSON-RPC Error Object
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One line written back to the client
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Success(JsonRpcResponse),
    Failure(JsonRpcError),
}

impl JsonRpcReply {
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcReply::Failure(_))
    }
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

pub const METHOD_SNAPSHOT: &str = "dashboard.snapshot";
pub const METHOD_REFRESH: &str = "dashboard.refresh";
pub const METHODS: [&str; 2] = [METHOD_SNAPSHOT, METHOD_REFRESH];

/// dashboard.refresh parameters
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshParams {
    /// Block until the refresh settles
    #[serde(default = "default_wait")]
    pub wait: bool,
}

impl Default for RefreshParams {
    fn default() -> Self {
        Self {
            wait: default_wait(),
        }
    }
}

fn default_wait() -> bool {
    true
}

/// Published snapshot plus the headline for its sentiment
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
    pub sentiment_message: String,
}

impl From<DashboardSnapshot> for SnapshotResponse {
    fn from(snapshot: DashboardSnapshot) -> Self {
        let sentiment_message = snapshot.sentiment.message().to_string();
        Self {
            snapshot,
            sentiment_message,
        }
    }
}

/// dashboard.refresh result
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RefreshResponse {
    /// Snapshot published by the awaited refresh
    Settled(SnapshotResponse),
    /// Refresh running in the background
    Accepted { accepted: bool },
}
