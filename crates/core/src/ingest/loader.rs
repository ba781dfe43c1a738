use crate::domain::portfolio::{PortfolioEntry, PortfolioTable};
use crate::domain::stock::{normalize_ticker, StockRecord};
use crate::ingest::types::{PortfolioRow, StockRow};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Stored portfolios keyed by user id.
pub type UserPortfolios = BTreeMap<String, PortfolioTable>;

pub fn load_stocks(path: &Path) -> Result<Vec<StockRecord>> {
    let file = File::open(path).with_context(|| format!("open {} failed", path.display()))?;
    read_stocks(file).with_context(|| format!("failed to load stocks from {}", path.display()))
}

pub fn load_portfolios(path: &Path) -> Result<UserPortfolios> {
    let file = File::open(path).with_context(|| format!("open {} failed", path.display()))?;
    read_portfolios(file)
        .with_context(|| format!("failed to load portfolios from {}", path.display()))
}

pub fn read_stocks<R: Read>(reader: R) -> Result<Vec<StockRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<StockRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = row.with_context(|| format!("invalid stock row at line {line}"))?;
        let record = into_record(row);
        anyhow::ensure!(!record.ticker.is_empty(), "empty ticker at line {line}");
        anyhow::ensure!(
            seen.insert(record.ticker.clone()),
            "duplicate ticker {} at line {line}",
            record.ticker
        );
        out.push(record);
    }

    tracing::debug!(stocks = out.len(), "stock table parsed");
    Ok(out)
}

pub fn read_portfolios<R: Read>(reader: R) -> Result<UserPortfolios> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut out = UserPortfolios::new();
    for (idx, row) in rdr.deserialize::<PortfolioRow>().enumerate() {
        let line = idx + 2;
        let row = row.with_context(|| format!("invalid portfolio row at line {line}"))?;
        let user_id = row.user_id.trim().to_string();
        anyhow::ensure!(!user_id.is_empty(), "empty user_id at line {line}");
        anyhow::ensure!(!row.ticker.trim().is_empty(), "empty ticker at line {line}");

        out.entry(user_id).or_default().push(PortfolioEntry {
            ticker: row.ticker,
            weight: row.weight,
        });
    }

    tracing::debug!(users = out.len(), "portfolio table parsed");
    Ok(out)
}

fn into_record(row: StockRow) -> StockRecord {
    StockRecord {
        ticker: normalize_ticker(&row.ticker),
        company_name: row
            .company_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        price: finite(row.price),
        market_cap: finite(row.market_cap),
        pe_ratio: finite(row.pe_ratio),
        beta: finite(row.beta),
        roe: finite(row.roe),
        esg_score: finite(row.esg_score),
        dividend_yield: finite(row.dividend_yield),
        sharpe_ratio: finite(row.sharpe_ratio),
    }
}

/// NaN and infinities in the dataset are treated as missing.
fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STOCKS: &str = "\
ticker,company_name,sector,price,market_cap,pe_ratio,beta,roe,esg_score,dividend_yield,sharpe_ratio
aapl,Apple Inc.,Tech,190.5,2.9e12,29.1,1.1,0.3,70,0.005,1.2
MSFT , Microsoft ,Tech,410,3.1e12,35,0.9,,80,0.007,1.0
XOM,,Energy,NaN,4.5e11,12,0.8,0.2,40,0.034,inf
";

    #[test]
    fn parses_stock_rows_with_missing_values() {
        let stocks = read_stocks(STOCKS.as_bytes()).unwrap();
        assert_eq!(stocks.len(), 3);

        assert_eq!(stocks[0].ticker, "AAPL");
        assert_eq!(stocks[0].company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(stocks[0].sharpe_ratio, Some(1.2));

        assert_eq!(stocks[1].ticker, "MSFT");
        assert_eq!(stocks[1].company_name.as_deref(), Some("Microsoft"));
        assert_eq!(stocks[1].roe, None);

        assert_eq!(stocks[2].company_name, None);
        assert_eq!(stocks[2].price, None);
        assert_eq!(stocks[2].sharpe_ratio, None);
        assert_eq!(stocks[2].dividend_yield, Some(0.034));
    }

    #[test]
    fn tolerates_absent_metric_columns() {
        let stocks = read_stocks("ticker,beta\nAAPL,1.1\n".as_bytes()).unwrap();
        assert_eq!(stocks[0].beta, Some(1.1));
        assert_eq!(stocks[0].roe, None);
    }

    #[test]
    fn rejects_duplicate_tickers() {
        let err = read_stocks("ticker,beta\nAAPL,1\naapl,2\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate ticker AAPL at line 3"));
    }

    #[test]
    fn rejects_non_numeric_metric() {
        let err = read_stocks("ticker,beta\nAAPL,high\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn groups_portfolios_by_user() {
        let csv = "user_id,ticker,weight\nu1,aapl,0.6\nu2,XOM,1\nu1,MSFT,0.4\n";
        let users = read_portfolios(csv.as_bytes()).unwrap();
        assert_eq!(users.len(), 2);

        let u1 = &users["u1"];
        let tickers: Vec<_> = u1.rows().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["AAPL", "MSFT"]);
        assert_eq!(users["u2"].rows()[0].weight, 1.0);
    }

    #[test]
    fn rejects_blank_user_id() {
        let csv = "user_id,ticker,weight\n ,AAPL,1\n";
        assert!(read_portfolios(csv.as_bytes()).is_err());
    }

    #[test]
    fn loads_from_disk_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks_data.csv");
        let mut f = File::create(&path).unwrap();
        f.write_all(STOCKS.as_bytes()).unwrap();

        assert_eq!(load_stocks(&path).unwrap().len(), 3);

        let missing = dir.path().join("nope.csv");
        let err = load_portfolios(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nope.csv"));
    }
}
