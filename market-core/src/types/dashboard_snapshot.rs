use crate::types::{SentimentLevel, TickerQuote, VixReading};
use serde::{Deserialize, Serialize};

/// Shown when a failed refresh carried no usable message
pub const FALLBACK_ERROR_MESSAGE: &str = "数据获取失败，请稍后重试";

/// Everything the presentation layer renders, published as one value
///
/// Snapshots are replaced wholesale; the transition helpers below
/// always return a new value instead of editing the published one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub vix: Option<VixReading>,
    pub ticker: Vec<TickerQuote>,
    pub sentiment: SentimentLevel,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

impl DashboardSnapshot {
    /// State at session start, before the first refresh settles
    pub fn initial() -> Self {
        Self {
            loading: true,
            error: None,
            vix: None,
            ticker: Vec::new(),
            sentiment: SentimentLevel::Unknown,
        }
    }

    /// Same data, marked as loading with the previous error cleared
    pub fn begin_refresh(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// Result of a refresh where both pipelines succeeded
    pub fn succeeded(
        vix: VixReading,
        ticker: Vec<TickerQuote>,
        sentiment: SentimentLevel,
        still_loading: bool,
    ) -> Self {
        Self {
            loading: still_loading,
            error: None,
            vix: Some(vix),
            ticker,
            sentiment,
        }
    }

    /// Result of a failed refresh; previously displayed data is kept
    pub fn failed(&self, message: &str, still_loading: bool) -> Self {
        let message = message.trim();
        let message = if message.is_empty() {
            FALLBACK_ERROR_MESSAGE
        } else {
            message
        };

        Self {
            loading: still_loading,
            error: Some(message.to_string()),
            ..self.clone()
        }
    }

    pub fn vix_value(&self) -> Option<f64> {
        self.vix.as_ref().map(|v| v.value)
    }
}
