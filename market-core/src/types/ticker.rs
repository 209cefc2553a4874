use crate::types::SymbolKey;
use serde::{Deserialize, Serialize};

/// One fixed entry of the ticker roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Lowercase key the model is told to reply with
    pub id: SymbolKey,
    pub display_name: String,
    /// Search query handed to the model for this entry
    pub query: String,
}

impl RosterEntry {
    pub fn new(id: &str, display_name: &str, query: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            query: query.to_string(),
        }
    }

    /// Short symbol shown next to the display name (first word of the query)
    pub fn symbol(&self) -> &str {
        self.query.split_whitespace().next().unwrap_or(&self.id)
    }
}

/// The five instruments the dashboard always reports on, in display order
pub fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("spx", "标普 500 (S&P 500)", "S&P 500 index price"),
        RosterEntry::new("ndx", "纳斯达克 100 (Nasdaq 100)", "Nasdaq 100 index price"),
        RosterEntry::new("nvda", "英伟达 (NVIDIA)", "NVIDIA stock price"),
        RosterEntry::new("googl", "谷歌 (Alphabet)", "Alphabet Inc Class A stock price"),
        RosterEntry::new("tsla", "特斯拉 (Tesla)", "Tesla stock price"),
    ]
}

/// Quote for a single roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerQuote {
    pub id: SymbolKey,
    pub display_name: String,
    pub symbol: String,
    pub price: String,
    pub change_percent: String,
    pub is_positive: bool,
}

impl TickerQuote {
    /// Build a quote for `entry` from already-validated fields
    ///
    /// The sign is read lexically: any '-' in the change marks the quote negative.
    pub fn new(entry: &RosterEntry, price: &str, change_percent: &str) -> Self {
        Self {
            id: entry.id.clone(),
            display_name: entry.display_name.clone(),
            symbol: entry.symbol().to_string(),
            price: price.to_string(),
            change_percent: change_percent.to_string(),
            is_positive: !change_percent.contains('-'),
        }
    }

    /// Neutral quote substituted when the model omitted an entry
    pub fn placeholder(entry: &RosterEntry) -> Self {
        Self::new(entry, "0.00", "0.00%")
    }

    pub fn is_placeholder(&self) -> bool {
        self.price == "0.00" && self.change_percent == "0.00%"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_order() {
        let ids: Vec<String> = default_roster().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["spx", "ndx", "nvda", "googl", "tsla"]);
    }

    #[test]
    fn test_symbol_is_first_query_word() {
        let roster = default_roster();
        let symbols: Vec<&str> = roster.iter().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["S&P", "Nasdaq", "NVIDIA", "Alphabet", "Tesla"]);
    }

    #[test]
    fn test_symbol_falls_back_to_id() {
        let entry = RosterEntry::new("vt", "全球股票 (VT)", "   ");
        assert_eq!(entry.symbol(), "vt");
    }

    #[test]
    fn test_lexical_sign() {
        let entry = &default_roster()[1];
        assert!(!TickerQuote::new(entry, "19200.50", "-0.12%").is_positive);
        assert!(TickerQuote::new(entry, "19200.50", "+0.52%").is_positive);
        assert!(TickerQuote::new(entry, "19200.50", "0.52%").is_positive);
    }

    #[test]
    fn test_placeholder() {
        let entry = &default_roster()[4];
        let quote = TickerQuote::placeholder(entry);
        assert_eq!(quote.id, "tsla");
        assert_eq!(quote.price, "0.00");
        assert_eq!(quote.change_percent, "0.00%");
        assert!(quote.is_positive);
        assert!(quote.is_placeholder());
    }
}
