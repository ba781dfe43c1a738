use serde::{Deserialize, Serialize};

/// Canonical form of a ticker: trimmed and upper-cased.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One row of the stock table. Every metric may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub ticker: String,
    pub company_name: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub roe: Option<f64>,
    pub esg_score: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub sharpe_ratio: Option<f64>,
}

impl StockRecord {
    /// A record with only the ticker set.
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            company_name: None,
            price: None,
            market_cap: None,
            pe_ratio: None,
            beta: None,
            roe: None,
            esg_score: None,
            dividend_yield: None,
            sharpe_ratio: None,
        }
    }

    pub fn company_or_na(&self) -> &str {
        self.company_name.as_deref().unwrap_or("N/A")
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Price => self.price,
            Metric::MarketCap => self.market_cap,
            Metric::PeRatio => self.pe_ratio,
            Metric::Beta => self.beta,
            Metric::Roe => self.roe,
            Metric::EsgScore => self.esg_score,
            Metric::DividendYield => self.dividend_yield,
            Metric::SharpeRatio => self.sharpe_ratio,
        }
    }

    /// Value used when ranking two stocks against each other: missing reads as 0.
    pub fn metric_or_zero(&self, metric: Metric) -> f64 {
        self.metric(metric).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Price,
    MarketCap,
    PeRatio,
    Beta,
    Roe,
    EsgScore,
    DividendYield,
    SharpeRatio,
}
