//! Plain-text rendering of a dashboard snapshot

use market_core::DashboardSnapshot;

/// Render the snapshot the way the dashboard lays it out
pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} [{}]\n",
        snapshot.sentiment.message(),
        snapshot.sentiment
    ));

    if let Some(error) = &snapshot.error {
        out.push_str(&format!("错误: {}\n", error));
    }

    match &snapshot.vix {
        Some(vix) => {
            let change = if vix.has_change() { vix.change.as_str() } else { "--" };
            out.push_str(&format!("\nVIX: {:.2} ({})\n", vix.value, change));
            out.push_str(&format!(
                "更新时间: {}\n",
                vix.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if !vix.summary.is_empty() {
                out.push_str(&format!("\n{}\n", vix.summary));
            }
        }
        None => out.push_str("\nVIX: --\n"),
    }

    if !snapshot.ticker.is_empty() {
        out.push('\n');
        for quote in &snapshot.ticker {
            let arrow = if quote.is_positive { "▲" } else { "▼" };
            out.push_str(&format!(
                "  {:<8} {:>12} {} {:>8}  {}\n",
                quote.symbol, quote.price, arrow, quote.change_percent, quote.display_name
            ));
        }
    }

    if let Some(vix) = &snapshot.vix {
        if !vix.sources.is_empty() {
            out.push_str("\n来源:\n");
            for (i, source) in vix.sources.iter().enumerate() {
                out.push_str(&format!("  {}. {} <{}>\n", i + 1, source.title, source.uri));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_core::{default_roster, Citation, SentimentLevel, TickerQuote, VixReading};

    fn reading() -> VixReading {
        VixReading {
            value: 18.45,
            change: "+2.3%".to_string(),
            summary: "今日 VIX 小幅上涨。".to_string(),
            sources: vec![Citation {
                title: "Cboe".to_string(),
                uri: "https://www.cboe.com".to_string(),
            }],
            observed_at: Utc.with_ymd_and_hms(2025, 6, 3, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_success() {
        let roster = default_roster();
        let mut ticker: Vec<TickerQuote> = roster.iter().map(TickerQuote::placeholder).collect();
        ticker[1] = TickerQuote::new(&roster[1], "19200.50", "-0.12%");

        let snapshot = DashboardSnapshot::succeeded(reading(), ticker, SentimentLevel::Calm, false);
        let text = render(&snapshot);

        assert!(text.starts_with("市场情绪：平静，观望为主 [CALM]"));
        assert!(text.contains("VIX: 18.45 (+2.3%)"));
        assert!(text.contains("2025-06-03 14:30:00 UTC"));
        assert!(text.contains("今日 VIX 小幅上涨。"));
        assert!(text.contains("19200.50 ▼   -0.12%"));
        assert!(text.contains("1. Cboe <https://www.cboe.com>"));
        assert!(!text.contains("错误"));
    }

    #[test]
    fn test_render_missing_change() {
        let mut vix = reading();
        vix.change = "N/A".to_string();
        let snapshot = DashboardSnapshot::succeeded(vix, Vec::new(), SentimentLevel::Calm, false);

        assert!(render(&snapshot).contains("VIX: 18.45 (--)"));
    }

    #[test]
    fn test_render_failure_without_data() {
        let snapshot = DashboardSnapshot::initial().failed("API error: boom", false);
        let text = render(&snapshot);

        assert!(text.contains("错误: API error: boom"));
        assert!(text.contains("VIX: --"));
        assert!(!text.contains("来源"));
    }
}
