//! Turns the free-text VIX answer into a validated [`VixReading`].
//!
//! Two strategies locate the index value: the `||VIX_VALUE: n||` trailer the
//! prompt asks for, and a loose "VIX ... dd.dd" scan for answers that ignored
//! the trailer. The change trailer is optional.

use chrono::Utc;
use market_core::{types::vix::CHANGE_NOT_AVAILABLE, Citation, VixReading};
use regex::Regex;
use std::sync::OnceLock;

use super::llm_client::RawCitation;
use crate::error::ParseError;

// `\d` is Unicode-aware in `regex`; digits here are ASCII only
struct VixPatterns {
    value: Regex,
    change: Regex,
    loose_value: Regex,
    signed_percent: Regex,
    strip_value: Regex,
    strip_change: Regex,
}

fn patterns() -> &'static VixPatterns {
    static PATTERNS: OnceLock<VixPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| VixPatterns {
        value: Regex::new(r"\|\|VIX_VALUE:\s*([0-9.]+)\|\|").expect("valid regex"),
        change: Regex::new(r"\|\|VIX_CHANGE:\s*([^\s|]+)\|\|").expect("valid regex"),
        loose_value: Regex::new(r"(?i)VIX.*?([0-9]{2}\.[0-9]{2})").expect("valid regex"),
        signed_percent: Regex::new(r"^[+\-−]?[0-9]+(?:\.[0-9]+)?%$").expect("valid regex"),
        strip_value: Regex::new(r"\|\|VIX_VALUE:.*?\|\|").expect("valid regex"),
        strip_change: Regex::new(r"\|\|VIX_CHANGE:.*?\|\|").expect("valid regex"),
    })
}

/// Parser for the VIX prompt's answer
pub struct VixResponseParser;

impl VixResponseParser {
    /// Parse a model answer and its grounding entries
    ///
    /// # Errors
    /// [`ParseError::ValueNotFound`] when neither strategy yields a number.
    pub fn parse(text: &str, citations: &[RawCitation]) -> Result<VixReading, ParseError> {
        let value = Self::extract_value(text).ok_or(ParseError::ValueNotFound)?;
        let change = Self::extract_change(text);
        let summary = Self::clean_summary(text);
        let sources = Self::extract_citations(citations);

        tracing::debug!(
            "Parsed VIX response: value={:.2}, change={}, summary_len={}, sources={}",
            value,
            change,
            summary.chars().count(),
            sources.len()
        );

        Ok(VixReading {
            value,
            change,
            summary,
            sources,
            observed_at: Utc::now(),
        })
    }

    /// Sentinel first, loose scan second
    pub fn extract_value(text: &str) -> Option<f64> {
        let p = patterns();

        let strict = p
            .value
            .captures(text)
            .and_then(|c| parse_non_negative(&c[1]));
        if strict.is_some() {
            return strict;
        }

        let loose = p
            .loose_value
            .captures(text)
            .and_then(|c| parse_non_negative(&c[1]));
        if loose.is_some() {
            tracing::warn!("VIX value sentinel missing, fell back to loose scan");
        }
        loose
    }

    /// Signed percentage from the change sentinel, or "N/A"
    pub fn extract_change(text: &str) -> String {
        let p = patterns();

        match p.change.captures(text) {
            Some(c) if p.signed_percent.is_match(&c[1]) => c[1].to_string(),
            Some(c) => {
                tracing::debug!("Ignoring malformed VIX change '{}'", &c[1]);
                CHANGE_NOT_AVAILABLE.to_string()
            }
            None => CHANGE_NOT_AVAILABLE.to_string(),
        }
    }

    /// Narrative with both trailers removed
    pub fn clean_summary(text: &str) -> String {
        let p = patterns();
        let without_value = p.strip_value.replace_all(text, "");
        let without_change = p.strip_change.replace_all(&without_value, "");
        without_change.trim().to_string()
    }

    /// Keep entries that carry a web link, in order
    pub fn extract_citations(citations: &[RawCitation]) -> Vec<Citation> {
        citations
            .iter()
            .filter_map(|raw| {
                let uri = raw.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
                let title = raw
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(uri);
                Some(Citation {
                    title: title.to_string(),
                    uri: uri.to_string(),
                })
            })
            .collect()
    }
}

fn parse_non_negative(digits: &str) -> Option<f64> {
    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "受通胀数据影响，市场波动率小幅上升。\n||VIX_VALUE: 18.45||\n||VIX_CHANGE: +2.3%||";

    #[test]
    fn test_parse_sentinels() {
        let reading = VixResponseParser::parse(WELL_FORMED, &[]).unwrap();

        assert_eq!(reading.value, 18.45);
        assert_eq!(reading.change, "+2.3%");
        assert_eq!(reading.summary, "受通胀数据影响，市场波动率小幅上升。");
        assert!(!reading.summary.contains("VIX_VALUE"));
        assert!(!reading.summary.contains("VIX_CHANGE"));
    }

    #[test]
    fn test_loose_fallback() {
        let text = "The VIX is currently at 22.10 amid renewed tariff worries.";
        let reading = VixResponseParser::parse(text, &[]).unwrap();

        assert_eq!(reading.value, 22.10);
        assert_eq!(reading.change, "N/A");
        assert_eq!(reading.summary, text);
    }

    #[test]
    fn test_loose_fallback_is_case_insensitive() {
        assert_eq!(VixResponseParser::extract_value("vix closed near 16.72 today"), Some(16.72));
    }

    #[test]
    fn test_loose_fallback_stays_on_one_line() {
        assert_eq!(VixResponseParser::extract_value("VIX data unavailable\nS&P at 54.30"), None);
    }

    #[test]
    fn test_value_not_found() {
        let text = "VIX is elevated today but I could not find an exact number.";
        let err = VixResponseParser::parse(text, &[]).unwrap_err();
        assert_eq!(err, ParseError::ValueNotFound);
    }

    #[test]
    fn test_single_digit_vix_needs_sentinel() {
        assert_eq!(VixResponseParser::extract_value("VIX at 9.87"), None);
        assert_eq!(VixResponseParser::extract_value("||VIX_VALUE: 9.87||"), Some(9.87));
    }

    #[test]
    fn test_malformed_sentinel_falls_back() {
        let text = "VIX trades at 19.05.\n||VIX_VALUE: 1.2.3||";
        assert_eq!(VixResponseParser::extract_value(text), Some(19.05));
    }

    #[test]
    fn test_change_missing_or_malformed() {
        assert_eq!(VixResponseParser::extract_change("||VIX_VALUE: 18.00||"), "N/A");
        assert_eq!(VixResponseParser::extract_change("||VIX_CHANGE: up||"), "N/A");
        assert_eq!(VixResponseParser::extract_change("||VIX_CHANGE: -0.75%||"), "-0.75%");
        assert_eq!(VixResponseParser::extract_change("||VIX_CHANGE: 4%||"), "4%");
    }

    #[test]
    fn test_fullwidth_digits_are_skipped() {
        let text = "VIX 指数报 ２２.１０ 点（即 22.10），较前一交易日上升。";
        assert_eq!(VixResponseParser::extract_value(text), Some(22.10));
        assert_eq!(VixResponseParser::extract_value("||VIX_VALUE: １８.４５||"), None);
    }

    #[test]
    fn test_fullwidth_change_is_rejected() {
        assert_eq!(VixResponseParser::extract_change("||VIX_CHANGE: +２.３%||"), "N/A");
        assert_eq!(VixResponseParser::extract_change("||VIX_CHANGE: −2.3%||"), "−2.3%");
    }

    #[test]
    fn test_summary_strips_every_marker() {
        let text = "||VIX_VALUE: 18.45|| 开头\n中间 ||VIX_CHANGE: bad value|| 结尾 ||VIX_VALUE: 18.45||";
        assert_eq!(VixResponseParser::clean_summary(text), "开头\n中间  结尾");
    }

    #[test]
    fn test_citations_keep_web_entries_in_order() {
        let raw = vec![
            RawCitation::web("cboe.com", "https://www.cboe.com/"),
            RawCitation::default(),
            RawCitation {
                title: None,
                uri: Some("https://www.wsj.com/markets".to_string()),
            },
            RawCitation {
                title: Some("empty".to_string()),
                uri: Some("  ".to_string()),
            },
            RawCitation::web("cboe.com", "https://www.cboe.com/"),
        ];

        let sources = VixResponseParser::extract_citations(&raw);

        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].title, "cboe.com");
        assert_eq!(sources[1].title, "https://www.wsj.com/markets");
        assert_eq!(sources[2], sources[0]);
    }
}
