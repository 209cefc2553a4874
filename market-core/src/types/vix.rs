use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when the model did not report a daily change
pub const CHANGE_NOT_AVAILABLE: &str = "N/A";

/// A web source the model grounded its answer on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// A validated VIX reading extracted from a model response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VixReading {
    /// Index value, always finite and non-negative
    pub value: f64,

    /// Signed daily change (e.g. "+2.3%") or "N/A"
    pub change: String,

    /// Narrative with every machine-readable marker removed
    pub summary: String,

    /// Grounding sources in order of appearance
    pub sources: Vec<Citation>,

    pub observed_at: DateTime<Utc>,
}

impl VixReading {
    /// Whether the model reported a usable daily change
    pub fn has_change(&self) -> bool {
        !self.change.is_empty() && self.change != CHANGE_NOT_AVAILABLE
    }
}
