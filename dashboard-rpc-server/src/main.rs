mod config;
mod error;
mod handler;
mod protocol;
mod server;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use market_core::VixThresholds;
use market_sentiment::{DashboardConfig, LlmConfig, LlmProvider, RetryConfig};

use config::ServerConfig;
use server::RpcServer;

#[derive(Parser)]
#[command(name = "dashboard-rpc-server")]
#[command(about = "JSON-RPC server for the market sentiment dashboard")]
struct Cli {
    /// Server host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(long, default_value = "7880")]
    port: u16,

    /// LLM provider (gemini, openai)
    #[arg(long, default_value = "gemini")]
    provider: LlmProvider,

    /// Model identifier
    #[arg(long, default_value = "gemini-2.5-flash")]
    model: String,

    /// Retries after the first attempt of each pipeline
    #[arg(long, default_value = "3")]
    max_retries: u32,

    /// Backoff before the first retry, doubled on every further retry
    #[arg(long, default_value = "1000")]
    initial_delay_ms: u64,

    /// Timeout for a single model call
    #[arg(long, default_value = "30")]
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

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig> {
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

        let api_key = self.provider.api_key_from_env().with_context(|| {
            format!("Set {} or API_KEY", self.provider.api_key_var())
        })?;

        Ok(ServerConfig {
            host: self.host,
            port: self.port,
            refresh_on_start: true,
            llm: LlmConfig {
                provider: self.provider,
                api_key,
                requests_per_minute: self.requests_per_minute,
                timeout_seconds: self.timeout_seconds,
                ..Default::default()
            },
            dashboard: DashboardConfig {
                model: self.model,
                retry: RetryConfig::new(self.max_retries, self.initial_delay_ms),
                thresholds: VixThresholds {
                    calm_limit: self.calm_limit,
                    panic_limit: self.panic_limit,
                },
                ..Default::default()
            },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "dashboard_rpc_server={},market_sentiment={}",
                cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Market Sentiment JSON-RPC Server Starting");
    tracing::info!("Configuration:");
    tracing::info!("  Host: {}", cli.host);
    tracing::info!("  Port: {}", cli.port);
    tracing::info!("  Provider: {}", cli.provider);
    tracing::info!("  Model: {}", cli.model);
    tracing::info!(
        "  Retries: {} (initial delay {}ms)",
        cli.max_retries,
        cli.initial_delay_ms
    );
    tracing::info!("  Thresholds: calm<{} panic>{}", cli.calm_limit, cli.panic_limit);

    let config = cli.into_config()?;

    let server = RpcServer::new(config)?;
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["dashboard-rpc-server"]);
        assert_eq!(cli.port, 7880);
        assert_eq!(cli.provider, LlmProvider::Gemini);
        assert_eq!(cli.max_retries, 3);
        assert_eq!(cli.initial_delay_ms, 1000);
        assert_eq!(cli.timeout_seconds, 30);
        assert_eq!(cli.calm_limit, 20.0);
        assert_eq!(cli.panic_limit, 30.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let cli = Cli::parse_from([
            "dashboard-rpc-server",
            "--calm-limit",
            "35",
            "--panic-limit",
            "30",
        ]);
        let err = cli.into_config().unwrap_err();
        assert!(err.to_string().contains("--calm-limit"));
    }

    #[test]
    fn test_provider_flag() {
        let cli = Cli::parse_from(["dashboard-rpc-server", "--provider", "openai"]);
        assert_eq!(cli.provider, LlmProvider::OpenAI);
    }
}
