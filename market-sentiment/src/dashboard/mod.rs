/// Dashboard refresh pipelines and the snapshot orchestrator
pub mod fetcher;
pub mod orchestrator;

pub use fetcher::{MarketDataFetcher, PipelineRun};
pub use orchestrator::{Dashboard, DashboardConfig};
