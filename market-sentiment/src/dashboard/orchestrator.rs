use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use market_core::{default_roster, DashboardSnapshot, RosterEntry, VixThresholds};

use crate::dashboard::fetcher::MarketDataFetcher;
use crate::llm::{ModelInvoker, RefreshMetrics};
use crate::retry::RetryConfig;

/// Configuration for the dashboard orchestrator
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Model identifier passed with every request
    pub model: String,

    /// Retry budget applied to each pipeline separately
    pub retry: RetryConfig,

    /// VIX band limits used to classify sentiment
    pub thresholds: VixThresholds,

    /// Instruments the ticker pipeline always reports on
    pub roster: Vec<RosterEntry>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            retry: RetryConfig::default(),
            thresholds: VixThresholds::default(),
            roster: default_roster(),
        }
    }
}

/// Ordering state for overlapping refreshes
#[derive(Debug, Default)]
struct RefreshSequence {
    last_started: u64,
    last_published: u64,
    in_flight: BTreeSet<u64>,
}

impl RefreshSequence {
    /// Whether a refresh that could still publish is running
    fn newer_in_flight(&self, than: u64) -> bool {
        self.in_flight.iter().any(|&seq| seq > than)
    }
}

/// Settles a refresh whose future is dropped before completion
struct InFlight<'a> {
    dashboard: &'a Dashboard,
    seq: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.dashboard.abandon(self.seq);
    }
}

/// Market sentiment dashboard
///
/// Owns the single published [`DashboardSnapshot`]. A refresh:
///
/// 1. Publishes the current data marked as loading, with the old error cleared
/// 2. Runs the VIX and ticker pipelines concurrently and waits for both
/// 3. On success, classifies sentiment and publishes a fresh snapshot
/// 4. On failure, publishes the previous data with an error message
///
/// Refreshes may overlap. Every refresh takes a sequence number and a
/// completion older than the last published one is discarded, so a slow,
/// superseded refresh never overwrites newer data. Dropping a refresh
/// future before it settles (e.g. under `tokio::time::timeout`) keeps the
/// published data and clears `loading` unless another refresh can still
/// publish.
pub struct Dashboard {
    thresholds: VixThresholds,
    fetcher: MarketDataFetcher,
    publisher: watch::Sender<DashboardSnapshot>,
    sequence: Mutex<RefreshSequence>,
}

impl Dashboard {
    /// Create a dashboard in its initial loading state
    ///
    /// # Arguments
    /// * `config` - Dashboard configuration
    /// * `invoker` - Model collaborator used by both pipelines
    pub fn new(config: DashboardConfig, invoker: Arc<dyn ModelInvoker>) -> Self {
        tracing::info!(
            "Initializing dashboard: model={}, max_retries={}, initial_delay={}ms, thresholds={}/{}, roster={}",
            config.model,
            config.retry.max_retries,
            config.retry.initial_delay.as_millis(),
            config.thresholds.calm_limit,
            config.thresholds.panic_limit,
            config.roster.len()
        );

        let (publisher, _) = watch::channel(DashboardSnapshot::initial());

        Self {
            thresholds: config.thresholds,
            fetcher: MarketDataFetcher::new(invoker, config.model, config.retry, config.roster),
            publisher,
            sequence: Mutex::new(RefreshSequence::default()),
        }
    }

    /// Copy of the latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.publisher.borrow().clone()
    }

    /// Receiver notified on every publication
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.publisher.subscribe()
    }

    /// Run one refresh cycle and return the snapshot it settled on
    ///
    /// If a newer refresh already published, this one's result is dropped
    /// and the currently published snapshot is returned instead.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let seq = {
            let mut sequence = self.sequence();
            sequence.last_started += 1;
            let seq = sequence.last_started;
            sequence.in_flight.insert(seq);
            let loading = self.publisher.borrow().begin_refresh();
            self.publisher.send_replace(loading);
            seq
        };
        let _in_flight = InFlight {
            dashboard: self,
            seq,
        };

        tracing::info!("Refresh #{} started", seq);

        let (vix_run, ticker_run) =
            tokio::join!(self.fetcher.fetch_vix(), self.fetcher.fetch_ticker());

        let mut metrics = RefreshMetrics::new();
        metrics.set_vix_latency(vix_run.elapsed);
        metrics.set_ticker_latency(ticker_run.elapsed);
        metrics.vix_attempts = vix_run.attempts;
        metrics.ticker_attempts = ticker_run.attempts;
        if let Ok(vix) = &vix_run.result {
            metrics.sources = vix.sources.len();
        }
        if let Ok(quotes) = &ticker_run.result {
            metrics.set_quotes(quotes);
        }
        metrics.report();

        let mut sequence = self.sequence();
        sequence.in_flight.remove(&seq);

        if seq < sequence.last_published {
            tracing::debug!(
                "Refresh #{} settled after #{} was published, dropping its result",
                seq,
                sequence.last_published
            );
            return self.snapshot();
        }

        let still_loading = sequence.newer_in_flight(seq);

        let next = match (vix_run.result, ticker_run.result) {
            (Ok(vix), Ok(ticker)) => {
                let sentiment = self.thresholds.classify(vix.value);
                tracing::info!(
                    "Refresh #{} succeeded: vix={:.2}, change={}, sentiment={}, quotes={}",
                    seq,
                    vix.value,
                    vix.change,
                    sentiment,
                    ticker.len()
                );
                DashboardSnapshot::succeeded(vix, ticker, sentiment, still_loading)
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(
                    "Refresh #{} failed ({}): {}",
                    seq,
                    if e.is_transient() { "transient" } else { "unparseable" },
                    e
                );
                let current = self.snapshot();
                current.failed(&e.to_string(), still_loading)
            }
        };

        sequence.last_published = seq;
        self.publisher.send_replace(next.clone());

        next
    }

    /// Bookkeeping for a refresh whose future was dropped mid-flight
    fn abandon(&self, seq: u64) {
        let mut sequence = self.sequence();
        if !sequence.in_flight.remove(&seq) {
            // Settled normally
            return;
        }

        tracing::warn!("Refresh #{} was cancelled before it settled", seq);

        if sequence.newer_in_flight(sequence.last_published) {
            return;
        }

        let settled = DashboardSnapshot {
            loading: false,
            ..self.publisher.borrow().clone()
        };
        self.publisher.send_replace(settled);
    }

    fn sequence(&self) -> MutexGuard<'_, RefreshSequence> {
        // Never held across an await
        self.sequence.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
