//! Refresh Performance Metrics
//!
//! Tracks how one dashboard refresh went:
//! - Latency of the VIX and ticker pipelines (retries and backoff included)
//! - Attempts spent by each pipeline
//! - How much of the ticker roster the model actually covered

use std::time::{Duration, Instant};

use market_core::TickerQuote;

/// Metrics for a single refresh cycle
#[derive(Debug, Clone, Default)]
pub struct RefreshMetrics {
    /// Wall time of the VIX fetch-and-parse pipeline (milliseconds)
    pub vix_latency_ms: u64,

    /// Wall time of the ticker fetch-and-parse pipeline (milliseconds)
    pub ticker_latency_ms: u64,

    /// Model calls made by the VIX pipeline
    pub vix_attempts: u32,

    /// Model calls made by the ticker pipeline
    pub ticker_attempts: u32,

    /// Grounding sources kept for the VIX summary
    pub sources: usize,

    /// Roster entries the model answered for
    pub matched_quotes: usize,

    /// Roster entries filled with placeholders
    pub placeholder_quotes: usize,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_vix_latency(&mut self, duration: Duration) {
        self.vix_latency_ms = duration.as_millis() as u64;
    }

    pub fn set_ticker_latency(&mut self, duration: Duration) {
        self.ticker_latency_ms = duration.as_millis() as u64;
    }

    /// Count real versus placeholder quotes
    pub fn set_quotes(&mut self, quotes: &[TickerQuote]) {
        self.placeholder_quotes = quotes.iter().filter(|q| q.is_placeholder()).count();
        self.matched_quotes = quotes.len() - self.placeholder_quotes;
    }

    /// Pipelines run concurrently, so the refresh takes as long as the slower one
    pub fn refresh_latency_ms(&self) -> u64 {
        self.vix_latency_ms.max(self.ticker_latency_ms)
    }

    pub fn total_attempts(&self) -> u32 {
        self.vix_attempts + self.ticker_attempts
    }

    /// Report metrics to tracing logs
    pub fn report(&self) {
        tracing::info!(
            "Refresh Metrics: vix={}ms ({} attempt(s)), ticker={}ms ({} attempt(s)), refresh={}ms, calls={}, sources={}, quotes={}/{}",
            self.vix_latency_ms,
            self.vix_attempts,
            self.ticker_latency_ms,
            self.ticker_attempts,
            self.refresh_latency_ms(),
            self.total_attempts(),
            self.sources,
            self.matched_quotes,
            self.matched_quotes + self.placeholder_quotes,
        );
    }
}

/// Timer helper for measuring operation latency
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
