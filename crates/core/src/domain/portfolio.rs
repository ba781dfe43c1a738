use crate::domain::stock::normalize_ticker;
use serde::{Deserialize, Serialize};

/// A `(ticker, weight)` pair as supplied by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub ticker: String,
    pub weight: f64,
}

/// Tabular form of a portfolio handed to the engine. Row order is the
/// order the client sent; tickers are canonical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTable {
    rows: Vec<PortfolioEntry>,
}

impl PortfolioTable {
    pub fn from_entries(entries: Vec<PortfolioEntry>) -> anyhow::Result<Self> {
        let mut rows = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let ticker = normalize_ticker(&entry.ticker);
            anyhow::ensure!(
                !ticker.is_empty(),
                "portfolio entry {idx} has an empty ticker"
            );
            rows.push(PortfolioEntry {
                ticker,
                weight: entry.weight,
            });
        }
        Ok(Self { rows })
    }

    pub fn push(&mut self, entry: PortfolioEntry) {
        self.rows.push(PortfolioEntry {
            ticker: normalize_ticker(&entry.ticker),
            weight: entry.weight,
        });
    }

    pub fn rows(&self) -> &[PortfolioEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ticker: &str, weight: f64) -> PortfolioEntry {
        PortfolioEntry {
            ticker: ticker.to_string(),
            weight,
        }
    }

    #[test]
    fn canonicalizes_tickers_and_keeps_order() {
        let table =
            PortfolioTable::from_entries(vec![entry("msft", 0.4), entry(" aapl", 0.6)]).unwrap();
        let tickers: Vec<_> = table.rows().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["MSFT", "AAPL"]);
        assert_eq!(table.rows()[1].weight, 0.6);
    }

    #[test]
    fn rejects_blank_ticker() {
        let err = PortfolioTable::from_entries(vec![entry("AAPL", 1.0), entry("  ", 1.0)])
            .unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }
}
