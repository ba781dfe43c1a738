use serde::{Deserialize, Serialize};

/// Raw row of the stock table. Columns not listed here are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRow {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub esg_score: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
}

/// Raw row of the stored user portfolio table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub user_id: String,
    pub ticker: String,
    pub weight: f64,
}
