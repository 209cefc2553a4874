use market_core::{RosterEntry, TickerQuote};

use super::prompt_formatter::TICKER_FIELD_DELIMITER;

/// Parser for the `id|price|change` answer to the ticker prompt
///
/// Never fails: lines that do not fit are dropped and roster entries the
/// model skipped are filled with placeholder quotes.
pub struct TickerResponseParser;

impl TickerResponseParser {
    /// Parse `text` into one quote per roster entry, in roster order
    pub fn parse(text: &str, roster: &[RosterEntry]) -> Vec<TickerQuote> {
        let mut found: Vec<Option<TickerQuote>> = vec![None; roster.len()];
        let mut accepted = 0usize;

        for line in text.lines() {
            let Some((id, price, change)) = split_line(line) else {
                continue;
            };

            let Some(index) = roster.iter().position(|e| e.id.eq_ignore_ascii_case(id)) else {
                tracing::debug!("Dropping ticker line with unknown id '{}'", id);
                continue;
            };

            // First line for an id wins
            if found[index].is_none() {
                found[index] = Some(TickerQuote::new(&roster[index], price, change));
                accepted += 1;
            }
        }

        if accepted < roster.len() {
            tracing::warn!(
                "Ticker response covered {}/{} roster entries, filling the rest with placeholders",
                accepted,
                roster.len()
            );
        }

        roster
            .iter()
            .zip(found)
            .map(|(entry, quote)| quote.unwrap_or_else(|| TickerQuote::placeholder(entry)))
            .collect()
    }
}

/// Exactly three non-empty fields, or nothing
fn split_line(line: &str) -> Option<(&str, &str, &str)> {
    let mut fields = line.trim().split(TICKER_FIELD_DELIMITER).map(str::trim);

    let id = fields.next()?;
    let price = fields.next()?;
    let change = fields.next()?;

    if fields.next().is_some() || id.is_empty() || price.is_empty() || change.is_empty() {
        return None;
    }

    Some((id, price, change))
}
