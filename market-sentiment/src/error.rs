use thiserror::Error;

/// Failure reported by the model collaborator
///
/// Every variant is transient from the dashboard's point of view and is
/// retried by the fetch pipelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid or unauthorized API key")]
    Unauthorized,

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            LlmError::Api(format!("malformed response body: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// The model answered, but not in a shape we can use
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not parse VIX value from response")]
    ValueNotFound,
}

/// Error surfaced by a fetch-and-parse pipeline once retries are exhausted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error(transparent)]
    Transient(#[from] LlmError),

    #[error(transparent)]
    Unparseable(#[from] ParseError),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}
