pub mod llm_client;
pub mod metrics;
pub mod prompt_formatter;
pub mod ticker_parser;
pub mod vix_parser;

// Re-export commonly used items
pub use llm_client::{
    LlmClient, LlmConfig, LlmProvider, LlmRequest, LlmResponse, ModelInvoker, RawCitation,
};
pub use metrics::{MetricsTimer, RefreshMetrics};
pub use prompt_formatter::MarketPromptFormatter;
pub use ticker_parser::TickerResponseParser;
pub use vix_parser::VixResponseParser;
