use std::sync::Arc;
use std::time::Duration;

use market_core::{RosterEntry, TickerQuote, VixReading};

use crate::error::FetchError;
use crate::llm::{
    LlmRequest, MarketPromptFormatter, MetricsTimer, ModelInvoker, TickerResponseParser,
    VixResponseParser,
};
use crate::retry::{retry_with_backoff, RetryConfig};

/// Outcome of one fetch-and-parse pipeline, with bookkeeping for metrics
#[derive(Debug)]
pub struct PipelineRun<T> {
    pub result: Result<T, FetchError>,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Runs the two model queries the dashboard needs
///
/// Each pipeline retries the model call and the parse together, so an
/// answer that cannot be parsed is treated like a failed call.
pub struct MarketDataFetcher {
    invoker: Arc<dyn ModelInvoker>,
    model: String,
    retry: RetryConfig,
    roster: Vec<RosterEntry>,
}

impl MarketDataFetcher {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        model: String,
        retry: RetryConfig,
        roster: Vec<RosterEntry>,
    ) -> Self {
        Self {
            invoker,
            model,
            retry,
            roster,
        }
    }

    /// Query and parse the VIX level, change, summary and sources
    pub async fn fetch_vix(&self) -> PipelineRun<VixReading> {
        let timer = MetricsTimer::start();
        let prompt = MarketPromptFormatter::format_vix();
        let mut attempts = 0u32;

        let result = retry_with_backoff(&self.retry, "VIX fetch", || {
            attempts += 1;
            let request = LlmRequest::new(&self.model, prompt.clone()).with_web_search();
            let invoker = &self.invoker;
            async move {
                let response = invoker.invoke(request).await?;
                let reading =
                    VixResponseParser::parse(&response.raw_response, &response.citations)?;
                Ok::<_, FetchError>(reading)
            }
        })
        .await;

        PipelineRun {
            result,
            attempts,
            elapsed: timer.stop(),
        }
    }

    /// Query and parse quotes for the whole roster
    pub async fn fetch_ticker(&self) -> PipelineRun<Vec<TickerQuote>> {
        let timer = MetricsTimer::start();
        let prompt = MarketPromptFormatter::format_ticker(&self.roster);
        let mut attempts = 0u32;

        let result = retry_with_backoff(&self.retry, "Ticker fetch", || {
            attempts += 1;
            let request = LlmRequest::new(&self.model, prompt.clone()).with_web_search();
            let invoker = &self.invoker;
            let roster = &self.roster;
            async move {
                let response = invoker.invoke(request).await?;
                Ok::<_, FetchError>(TickerResponseParser::parse(&response.raw_response, roster))
            }
        })
        .await;

        PipelineRun {
            result,
            attempts,
            elapsed: timer.stop(),
        }
    }
}
