use market_core::RosterEntry;

/// Opening marker of the VIX value trailer line
pub const VIX_VALUE_SENTINEL: &str = "||VIX_VALUE:";

/// Opening marker of the VIX change trailer line
pub const VIX_CHANGE_SENTINEL: &str = "||VIX_CHANGE:";

/// Separator of the ticker reply lines
pub const TICKER_FIELD_DELIMITER: char = '|';

/// Builds the instruction text sent to the model
///
/// Prompts carry their own output-format rules; the parsers in this module
/// rely on exactly those rules.
pub struct MarketPromptFormatter;

impl MarketPromptFormatter {
    /// Prompt for the VIX level, daily change and a Chinese market summary
    pub fn format_vix() -> String {
        let mut prompt = String::new();

        prompt.push_str("Using the Google Search tool, find the current real-time CBOE VIX Index value, ");
        prompt.push_str("the daily percentage change, and a brief summary of what is driving market volatility today.\n\n");
        prompt.push_str("Please write the summary in Chinese (Simplified).\n\n");
        prompt.push_str("After your natural language summary, strictly append a new line with this exact format:\n");
        prompt.push_str(&format!("{} <number>||\n", VIX_VALUE_SENTINEL));
        prompt.push_str(&format!("{} <string_with_sign>||\n\n", VIX_CHANGE_SENTINEL));
        prompt.push_str("Example:\n");
        prompt.push_str(&format!("{} 18.45||\n", VIX_VALUE_SENTINEL));
        prompt.push_str(&format!("{} +2.3%||\n", VIX_CHANGE_SENTINEL));

        prompt
    }

    /// Prompt for price and daily change of every roster entry
    ///
    /// The id mapping is generated from the roster so that the ids the model
    /// answers with always match the ids the ticker parser looks for.
    pub fn format_ticker(roster: &[RosterEntry]) -> String {
        let queries: Vec<&str> = roster.iter().map(|e| e.query.as_str()).collect();

        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Find the current real-time price and daily percentage change for the following: {}.\n\n",
            queries.join(", ")
        ));
        prompt.push_str("Strictly output the data in this specific line-by-line format for each item (no markdown tables):\n");
        prompt.push_str("ID|PRICE|CHANGE_PERCENT\n\n");

        prompt.push_str("Map the IDs as follows:\n");
        for entry in roster {
            prompt.push_str(&format!("{} -> {}\n", entry.query, entry.id));
        }

        if !roster.is_empty() {
            prompt.push_str("\nExample output:\n");
            for (i, entry) in roster.iter().take(2).enumerate() {
                let (price, change) = if i == 0 {
                    ("5430.20", "+0.52%")
                } else {
                    ("19200.50", "-0.12%")
                };
                prompt.push_str(&format!(
                    "{}{}{}{}{}\n",
                    entry.id, TICKER_FIELD_DELIMITER, price, TICKER_FIELD_DELIMITER, change
                ));
            }
        }

        prompt.push_str("\nEnsure the change percent includes the + or - sign.\n");

        prompt
    }
}
