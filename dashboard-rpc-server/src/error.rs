use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RpcError {
    /// Get the JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        use crate::protocol::*;
        match self {
            RpcError::ParseError(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
            RpcError::InternalError(_) => INTERNAL_ERROR,
        }
    }

    /// Get additional error data (optional)
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            RpcError::MethodNotFound(_) => Some(serde_json::json!({
                "available_methods": crate::protocol::METHODS,
            })),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::InternalError(err.to_string())
    }
}
