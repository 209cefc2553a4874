pub mod dashboard_snapshot;
pub mod sentiment;
pub mod ticker;
pub mod vix;

// Re-export common types
pub use dashboard_snapshot::{DashboardSnapshot, FALLBACK_ERROR_MESSAGE};
pub use sentiment::{SentimentLevel, VixThresholds};
pub use ticker::{default_roster, RosterEntry, TickerQuote};
pub use vix::{Citation, VixReading};

/// Lowercase roster key (e.g., "spx", "nvda")
pub type SymbolKey = String;
