pub mod dashboard;
pub mod error;
pub mod llm;
pub mod retry;

// Re-export commonly used items from llm module
pub use llm::{
    LlmClient, LlmConfig, LlmProvider, LlmRequest, LlmResponse, MarketPromptFormatter,
    ModelInvoker, RawCitation, RefreshMetrics, TickerResponseParser, VixResponseParser,
};

// Re-export commonly used items from dashboard module
pub use dashboard::{Dashboard, DashboardConfig, MarketDataFetcher};

pub use error::{FetchError, LlmError, ParseError};
pub use retry::{retry_with_backoff, RetryConfig};
