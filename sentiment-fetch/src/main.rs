mod report;

use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use tracing::{info, Level};

use market_core::VixThresholds;
use market_sentiment::{Dashboard, DashboardConfig, LlmClient, LlmConfig, LlmProvider, RetryConfig};

/// Market Sentiment Fetch CLI
///
/// Runs one dashboard refresh against the configured model provider and
/// prints the resulting snapshot.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// LLM provider (gemini, openai)
    #[arg(short, long, default_value = "gemini")]
    provider: LlmProvider,

    /// Model identifier
    #[arg(short, long, default_value = "gemini-2.5-flash")]
    model: String,

    /// Retries after the first attempt of each pipeline
    #[arg(short = 'r', long, default_value = "3")]
    max_retries: u32,

    /// Backoff before the first retry in milliseconds
    #[arg(short = 'd', long, default_value = "1000")]
    initial_delay_ms: u64,

    /// Timeout for a single model call
    #[arg(short, long, default_value = "30")]
    timeout_seconds: u64,

    /// Model calls allowed per minute
    #[arg(long, default_value = "10")]
    requests_per_minute: u32,

    /// VIX below this level is calm
    #[arg(long, default_value = "20")]
    calm_limit: f64,

    /// VIX above this level is extreme fear
    #[arg(long, default_value = "30")]
    panic_limit: f64,

    /// Print the snapshot as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

impl Args {
    /// Parse log level from string
    fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn thresholds(&self) -> Result<VixThresholds> {
        ensure!(
            self.calm_limit.is_finite() && self.panic_limit.is_finite(),
            "VIX thresholds must be finite numbers"
        );
        ensure!(
            self.calm_limit <= self.panic_limit,
            "--calm-limit ({}) must not exceed --panic-limit ({})",
            self.calm_limit,
            self.panic_limit
        );
        Ok(VixThresholds {
            calm_limit: self.calm_limit,
            panic_limit: self.panic_limit,
        })
    }

    fn dashboard_config(&self) -> Result<DashboardConfig> {
        Ok(DashboardConfig {
            model: self.model.clone(),
            retry: RetryConfig::new(self.max_retries, self.initial_delay_ms),
            thresholds: self.thresholds()?,
            ..Default::default()
        })
    }

    fn llm_config(&self) -> Result<LlmConfig> {
        let api_key = self.provider.api_key_from_env().with_context(|| {
            format!("Set {} or API_KEY", self.provider.api_key_var())
        })?;

        Ok(LlmConfig {
            provider: self.provider,
            api_key,
            requests_per_minute: self.requests_per_minute,
            timeout_seconds: self.timeout_seconds,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_max_level(args.parse_log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Market Sentiment Fetch");
    info!("  Provider: {}", args.provider);
    info!("  Model: {}", args.model);

    let dashboard_config = args.dashboard_config()?;
    let client = LlmClient::new(args.llm_config()?).context("Failed to initialize LLM client")?;
    let dashboard = Dashboard::new(dashboard_config, Arc::new(client));

    let snapshot = dashboard.refresh().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", report::render(&snapshot));
    }

    if let Some(error) = snapshot.error {
        bail!("Refresh failed: {}", error);
    }

    Ok(())
}
