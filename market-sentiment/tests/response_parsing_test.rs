/// Response Parsing Integration Tests
///
/// Checks the parsers against answers shaped like real model output:
/// 1. The VIX trailer round trip and the loose fallback
/// 2. Ticker roster projection for every coverage level
/// 3. Prompt and parser agreeing on the same markers and ids
use market_core::{default_roster, SentimentLevel};
use market_sentiment::{
    MarketPromptFormatter, ParseError, RawCitation, TickerResponseParser, VixResponseParser,
};

#[test]
fn test_vix_sentinel_round_trip() {
    let text = "今日 VIX 指数上涨，主要受科技股抛售和地缘政治紧张影响。\n\n||VIX_VALUE: 18.45||\n||VIX_CHANGE: +2.3%||\n";
    let citations = vec![
        RawCitation::web("Cboe Global Markets", "https://www.cboe.com/tradable_products/vix/"),
        RawCitation::web("Reuters", "https://www.reuters.com/markets/us/"),
    ];

    let reading = VixResponseParser::parse(text, &citations).unwrap();

    assert_eq!(reading.value, 18.45);
    assert_eq!(reading.change, "+2.3%");
    assert!(!reading.summary.contains("||VIX_VALUE:"));
    assert!(!reading.summary.contains("||VIX_CHANGE:"));
    assert!(reading.summary.starts_with("今日 VIX 指数上涨"));
    assert_eq!(reading.sources.len(), 2);
    assert_eq!(reading.sources[1].title, "Reuters");
    assert_eq!(SentimentLevel::classify(reading.value), SentimentLevel::Calm);
}

#[test]
fn test_vix_loose_fallback() {
    let reading =
        VixResponseParser::parse("VIX is currently at 22.10 amid renewed rate fears.", &[]).unwrap();
    assert_eq!(reading.value, 22.10);
    assert_eq!(reading.change, "N/A");
    assert!(reading.sources.is_empty());
}

#[test]
fn test_vix_unparseable() {
    let result = VixResponseParser::parse("Markets were quiet; VIX data is delayed.", &[]);
    assert_eq!(result.unwrap_err(), ParseError::ValueNotFound);
}

#[test]
fn test_vix_prompt_example_parses() {
    // The example the prompt shows must itself be parseable
    let prompt = MarketPromptFormatter::format_vix();
    let example = prompt.split("Example:").nth(1).unwrap();

    let reading = VixResponseParser::parse(example, &[]).unwrap();
    assert_eq!(reading.value, 18.45);
    assert_eq!(reading.change, "+2.3%");
}

#[test]
fn test_ticker_projection_for_every_coverage_level() {
    let roster = default_roster();
    let lines = [
        "spx|5430.20|+0.52%",
        "ndx|19200.50|-0.12%",
        "nvda|135.20|+2.1%",
        "googl|178.35|+0.40%",
        "tsla|248.50|-1.20%",
    ];

    for covered in 0..=lines.len() {
        // Reverse so the input order never matches roster order
        let text: Vec<&str> = lines[..covered].iter().rev().copied().collect();
        let quotes = TickerResponseParser::parse(&text.join("\n"), &roster);

        assert_eq!(quotes.len(), 5, "coverage {}", covered);
        for (i, (quote, entry)) in quotes.iter().zip(&roster).enumerate() {
            assert_eq!(quote.id, entry.id);
            if i < covered {
                assert!(!quote.is_placeholder(), "coverage {} index {}", covered, i);
            } else {
                assert_eq!(quote.price, "0.00");
                assert_eq!(quote.change_percent, "0.00%");
                assert!(quote.is_positive);
            }
        }
    }
}

#[test]
fn test_ticker_prompt_example_parses() {
    let roster = default_roster();
    let prompt = MarketPromptFormatter::format_ticker(&roster);
    let example = prompt.split("Example output:").nth(1).unwrap();

    let quotes = TickerResponseParser::parse(example, &roster);
    assert_eq!(quotes[0].change_percent, "+0.52%");
    assert!(!quotes[1].is_positive);
    assert!(quotes[2].is_placeholder());
}
