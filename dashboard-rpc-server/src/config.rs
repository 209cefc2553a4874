use market_sentiment::{DashboardConfig, LlmConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Kick off one refresh in the background once the listener is up
    pub refresh_on_start: bool,
    pub llm: LlmConfig,
    pub dashboard: DashboardConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7880,
            refresh_on_start: true,
            llm: LlmConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
