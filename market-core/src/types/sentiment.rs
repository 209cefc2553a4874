use serde::{Deserialize, Serialize};

/// Market mood derived from the VIX level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLevel {
    Calm,
    ModerateFear,
    ExtremeFear,
    Unknown,
}

impl SentimentLevel {
    /// Classify against the default 20/30 thresholds
    pub fn classify(vix_value: f64) -> Self {
        VixThresholds::default().classify(vix_value)
    }

    /// User-facing headline for this level
    pub fn message(&self) -> &'static str {
        match self {
            SentimentLevel::Calm => "市场情绪：平静，观望为主",
            SentimentLevel::ModerateFear => "市场情绪：适度恐慌，可考虑分批加仓",
            SentimentLevel::ExtremeFear => "市场情绪：极度恐慌，黄金加仓机会",
            SentimentLevel::Unknown => "正在分析市场数据...",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLevel::Calm => "CALM",
            SentimentLevel::ModerateFear => "MODERATE_FEAR",
            SentimentLevel::ExtremeFear => "EXTREME_FEAR",
            SentimentLevel::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SentimentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// VIX band limits
///
/// Below `calm_limit` is calm, `calm_limit..=panic_limit` is moderate fear,
/// above `panic_limit` is extreme fear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VixThresholds {
    pub calm_limit: f64,
    pub panic_limit: f64,
}

impl Default for VixThresholds {
    fn default() -> Self {
        Self {
            calm_limit: 20.0,
            panic_limit: 30.0,
        }
    }
}

impl VixThresholds {
    pub fn classify(&self, vix_value: f64) -> SentimentLevel {
        if vix_value.is_nan() {
            SentimentLevel::Unknown
        } else if vix_value < self.calm_limit {
            SentimentLevel::Calm
        } else if vix_value <= self.panic_limit {
            SentimentLevel::ModerateFear
        } else {
            SentimentLevel::ExtremeFear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calm_band() {
        for v in [0.0, 9.5, 15.0, 19.99, 19.9999] {
            assert_eq!(SentimentLevel::classify(v), SentimentLevel::Calm, "vix={}", v);
        }
    }

    #[test]
    fn test_moderate_band() {
        for v in [20.0, 22.1, 25.0, 29.99, 30.0] {
            assert_eq!(SentimentLevel::classify(v), SentimentLevel::ModerateFear, "vix={}", v);
        }
    }

    #[test]
    fn test_extreme_band() {
        for v in [30.0001, 30.01, 35.0, 82.69] {
            assert_eq!(SentimentLevel::classify(v), SentimentLevel::ExtremeFear, "vix={}", v);
        }
    }

    #[test]
    fn test_nan_is_unknown() {
        assert_eq!(SentimentLevel::classify(f64::NAN), SentimentLevel::Unknown);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = VixThresholds {
            calm_limit: 15.0,
            panic_limit: 25.0,
        };
        assert_eq!(thresholds.classify(14.9), SentimentLevel::Calm);
        assert_eq!(thresholds.classify(15.0), SentimentLevel::ModerateFear);
        assert_eq!(thresholds.classify(25.0), SentimentLevel::ModerateFear);
        assert_eq!(thresholds.classify(25.5), SentimentLevel::ExtremeFear);
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_string(&SentimentLevel::ExtremeFear).unwrap();
        assert_eq!(json, "\"EXTREME_FEAR\"");
        assert_eq!(SentimentLevel::ModerateFear.to_string(), "MODERATE_FEAR");
    }

    #[test]
    fn test_messages() {
        assert!(SentimentLevel::ExtremeFear.message().contains("极度恐慌"));
        assert!(SentimentLevel::Calm.message().contains("平静"));
    }
}
