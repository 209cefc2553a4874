use std::sync::Arc;
use std::time::Instant;

use market_sentiment::Dashboard;

use crate::protocol::*;

/// Handler for dashboard queries
pub struct DashboardHandler {
    dashboard: Arc<Dashboard>,
}

impl DashboardHandler {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }

    /// Handle a dashboard.snapshot request
    pub fn handle_snapshot(&self) -> SnapshotResponse {
        SnapshotResponse::from(self.dashboard.snapshot())
    }

    /// Handle a dashboard.refresh request
    pub async fn handle_refresh(&self, params: RefreshParams) -> RefreshResponse {
        if !params.wait {
            self.spawn_refresh();
            return RefreshResponse::Accepted { accepted: true };
        }

        let started = Instant::now();
        let snapshot = self.dashboard.refresh().await;

        tracing::debug!(
            "Refresh settled in {}ms: vix={:?}, loading={}, error={:?}, quotes={}",
            started.elapsed().as_millis(),
            snapshot.vix_value(),
            snapshot.loading,
            snapshot.error,
            snapshot.ticker.len()
        );

        RefreshResponse::Settled(snapshot.into())
    }

    /// Run a refresh without waiting for it
    pub fn spawn_refresh(&self) {
        let dashboard = Arc::clone(&self.dashboard);
        tokio::spawn(async move {
            dashboard.refresh().await;
        });
    }
}
