//! Content-based reference engine.
//!
//! Each stock becomes a vector of z-scored fundamentals; two stocks are as
//! similar as the cosine of their vectors. A portfolio is scored against every
//! stock it does not hold by weighting each holding's similarity.

use crate::catalog::{SimilarityMatrix, StockCatalog};
use crate::compare::round3;
use crate::domain::portfolio::PortfolioTable;
use crate::domain::recommendation::{Holding, RecommendationItem, RecommendationResult};
use crate::domain::stock::{Metric, StockRecord};
use crate::engine::{EngineError, EngineInput, RecommendationEngine};
use crate::ingest::{self, UserPortfolios};
use std::path::Path;
use std::sync::Arc;

const FEATURES: [Metric; 7] = [
    Metric::MarketCap,
    Metric::PeRatio,
    Metric::Beta,
    Metric::Roe,
    Metric::EsgScore,
    Metric::DividendYield,
    Metric::SharpeRatio,
];

const MIN_SPREAD: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SimilarityRecommender {
    top_n: usize,
    stocks: Option<Vec<StockRecord>>,
    portfolios: UserPortfolios,
    catalog: Option<Arc<StockCatalog>>,
}

impl SimilarityRecommender {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n: top_n.max(1),
            stocks: None,
            portfolios: UserPortfolios::new(),
            catalog: None,
        }
    }

    /// Engine over data that is already in memory, ready for `prepare_features`.
    pub fn from_parts(stocks: Vec<StockRecord>, portfolios: UserPortfolios, top_n: usize) -> Self {
        Self {
            stocks: Some(stocks),
            portfolios,
            ..Self::new(top_n)
        }
    }

    pub fn user_count(&self) -> usize {
        self.portfolios.len()
    }

    fn holdings_for(
        &self,
        catalog: &StockCatalog,
        table: &PortfolioTable,
    ) -> Result<Vec<(usize, f64)>, EngineError> {
        let mut holdings: Vec<(usize, f64)> = Vec::with_capacity(table.len());
        for row in table.rows() {
            if !row.weight.is_finite() || row.weight < 0.0 {
                return Err(EngineError::BadInput(format!(
                    "Invalid weight {} for {}.",
                    row.weight, row.ticker
                )));
            }
            let Some(pos) = catalog.position(&row.ticker) else {
                tracing::warn!(ticker = %row.ticker, "portfolio ticker not in dataset; skipped");
                continue;
            };
            match holdings.iter_mut().find(|(p, _)| *p == pos) {
                Some((_, w)) => *w += row.weight,
                None => holdings.push((pos, row.weight)),
            }
        }

        if holdings.is_empty() {
            return Err(EngineError::BadInput(
                "None of the portfolio tickers are in the dataset.".to_string(),
            ));
        }

        let total: f64 = holdings.iter().map(|(_, w)| w).sum();
        if !total.is_finite() {
            return Err(EngineError::BadInput(
                "Portfolio weights are too large to normalize.".to_string(),
            ));
        }
        if total <= 0.0 {
            return Err(EngineError::BadInput(
                "Portfolio weights must sum to a positive number.".to_string(),
            ));
        }
        for (_, w) in holdings.iter_mut() {
            *w /= total;
        }
        Ok(holdings)
    }
}

#[async_trait::async_trait]
impl RecommendationEngine for SimilarityRecommender {
    fn name(&self) -> &'static str {
        "similarity"
    }

    fn load(&mut self, stocks_path: &Path, portfolios_path: &Path) -> Result<(), EngineError> {
        if !stocks_path.is_file() || !portfolios_path.is_file() {
            return Err(EngineError::Data(format!(
                "Required data files not found (stocks={}, portfolios={})",
                stocks_path.display(),
                portfolios_path.display()
            )));
        }

        let stocks = ingest::load_stocks(stocks_path).map_err(EngineError::data)?;
        let portfolios = ingest::load_portfolios(portfolios_path).map_err(EngineError::data)?;

        tracing::info!(
            stocks = stocks.len(),
            users = portfolios.len(),
            "dataset loaded"
        );

        self.stocks = Some(stocks);
        self.portfolios = portfolios;
        self.catalog = None;
        Ok(())
    }

    fn prepare_features(&mut self) -> Result<(), EngineError> {
        if self.catalog.is_some() {
            return Ok(());
        }
        let stocks = self
            .stocks
            .clone()
            .ok_or(EngineError::NotReady("load must run before prepare_features"))?;

        let features = feature_vectors(&stocks);
        let matrix = SimilarityMatrix::from_upper_triangle(stocks.len(), |i, j| {
            if i == j {
                1.0
            } else {
                cosine(&features[i], &features[j])
            }
        })
        .map_err(|e| EngineError::Fault(e.to_string()))?;

        let catalog =
            StockCatalog::new(stocks, matrix).map_err(|e| EngineError::Fault(e.to_string()))?;
        tracing::info!(stocks = catalog.len(), "similarity matrix prepared");
        self.catalog = Some(Arc::new(catalog));
        Ok(())
    }

    fn catalog(&self) -> Result<Arc<StockCatalog>, EngineError> {
        self.catalog
            .clone()
            .ok_or(EngineError::NotReady("prepare_features has not run"))
    }

    async fn generate_recommendations(
        &self,
        input: EngineInput,
    ) -> Result<RecommendationResult, EngineError> {
        let catalog = self.catalog()?;
        let mode = input.mode();

        let (user_id, table) = match input {
            EngineInput::User(id) => {
                let table = self
                    .portfolios
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| EngineError::BadInput(format!("User '{id}' not found.")))?;
                (Some(id), table)
            }
            EngineInput::Portfolio(table) => (None, table),
        };

        let holdings = self.holdings_for(&catalog, &table)?;
        let sim = |i: usize, j: usize| {
            catalog
                .similarity_at(i, j)
                .map_err(|e| EngineError::Fault(e.to_string()))
        };

        let mut scored: Vec<(f64, usize, usize)> = Vec::with_capacity(catalog.len());
        for candidate in 0..catalog.len() {
            if holdings.iter().any(|(pos, _)| *pos == candidate) {
                continue;
            }
            let mut score = 0.0;
            let mut closest = (f64::NEG_INFINITY, holdings[0].0);
            for &(pos, weight) in &holdings {
                let s = sim(pos, candidate)?;
                score += weight * s;
                if s > closest.0 {
                    closest = (s, pos);
                }
            }
            scored.push((score, candidate, closest.1));
        }

        let records = catalog.records();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| records[a.1].ticker.cmp(&records[b.1].ticker))
        });

        let recommendations = scored
            .into_iter()
            .take(self.top_n)
            .enumerate()
            .map(|(idx, (score, pos, closest))| RecommendationItem {
                rank: idx as u32 + 1,
                ticker: records[pos].ticker.clone(),
                company_name: records[pos].company_or_na().to_string(),
                score: round3(score),
                closest_holding: records[closest].ticker.clone(),
            })
            .collect();

        Ok(RecommendationResult {
            generated_at: chrono::Utc::now(),
            engine: self.name().to_string(),
            mode,
            user_id,
            holdings: holdings
                .iter()
                .map(|&(pos, weight)| Holding {
                    ticker: records[pos].ticker.clone(),
                    weight,
                })
                .collect(),
            recommendations,
        })
    }
}

/// Z-scored feature vectors, one per stock, in catalog order.
fn feature_vectors(stocks: &[StockRecord]) -> Vec<Vec<f64>> {
    let mut out = vec![Vec::with_capacity(FEATURES.len()); stocks.len()];

    for metric in FEATURES {
        let raw: Vec<Option<f64>> = stocks.iter().map(|s| feature_value(s, metric)).collect();

        let present: Vec<f64> = raw.iter().flatten().copied().collect();
        let mean = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        let filled: Vec<f64> = raw.iter().map(|v| v.unwrap_or(mean)).collect();

        let n = filled.len().max(1) as f64;
        let var = filled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let spread = var.sqrt();

        for (row, v) in out.iter_mut().zip(filled) {
            row.push(if spread < MIN_SPREAD {
                0.0
            } else {
                (v - mean) / spread
            });
        }
    }

    out
}

fn feature_value(stock: &StockRecord, metric: Metric) -> Option<f64> {
    let v = stock.metric(metric)?;
    match metric {
        // Market caps span orders of magnitude.
        Metric::MarketCap => (v > 0.0).then(|| v.log10()),
        _ => Some(v),
    }
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}
