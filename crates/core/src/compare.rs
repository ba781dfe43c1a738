use crate::catalog::{CatalogError, StockCatalog};
use crate::domain::stock::{normalize_ticker, Metric, StockRecord};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

pub const SIMILAR_VERDICT: &str = "Both stocks perform similarly across key factors.";

/// Both stocks' value for one metric, in request order.
pub type MetricPair = [Option<f64>; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub price: MetricPair,
    pub market_cap: MetricPair,
    pub pe_ratio: MetricPair,
    pub beta: MetricPair,
    pub roe: MetricPair,
    pub esg_score: MetricPair,
    pub dividend_yield: MetricPair,
    pub sharpe_ratio: MetricPair,
}

impl ComparisonMetrics {
    fn from_records(a: &StockRecord, b: &StockRecord) -> Self {
        let pair = |m: Metric| [a.metric(m), b.metric(m)];
        Self {
            price: pair(Metric::Price),
            market_cap: pair(Metric::MarketCap),
            pe_ratio: pair(Metric::PeRatio),
            beta: pair(Metric::Beta),
            roe: pair(Metric::Roe),
            esg_score: pair(Metric::EsgScore),
            dividend_yield: pair(Metric::DividendYield),
            sharpe_ratio: pair(Metric::SharpeRatio),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub ticker1: String,
    pub company1: String,
    pub ticker2: String,
    pub company2: String,
    pub similarity_score: f64,
    pub metrics: ComparisonMetrics,
    pub verdict: String,
}

/// Which way a metric has to move for a stock to win that dimension.
#[derive(Debug, Clone, Copy)]
enum Better {
    Higher,
    Lower,
}

/// One verdict dimension and the sentence credited to its winner.
struct VerdictRule {
    metric: Metric,
    better: Better,
    sentence: fn(&str, &str) -> String,
}

const VERDICT_RULES: [VerdictRule; 4] = [
    VerdictRule {
        metric: Metric::SharpeRatio,
        better: Better::Higher,
        sentence: |winner, _| {
            format!("{winner} gives better performance for the amount of risk it takes.")
        },
    },
    VerdictRule {
        metric: Metric::Beta,
        better: Better::Lower,
        sentence: |winner, loser| format!("{winner} tends to have a more stable price than {loser}."),
    },
    VerdictRule {
        metric: Metric::EsgScore,
        better: Better::Higher,
        sentence: |winner, _| {
            format!("{winner} scores better on environmental and social responsibility.")
        },
    },
    VerdictRule {
        metric: Metric::Roe,
        better: Better::Higher,
        sentence: |winner, loser| format!("{winner} uses investor money more efficiently than {loser}."),
    },
];

/// Builds the verdict for `a` against `b`. Missing metrics count as 0 and a
/// tied dimension says nothing.
pub fn verdict(a: &StockRecord, b: &StockRecord) -> String {
    let mut sentences = Vec::with_capacity(VERDICT_RULES.len());
    for rule in &VERDICT_RULES {
        let va = a.metric_or_zero(rule.metric);
        let vb = b.metric_or_zero(rule.metric);
        let ordering = match rule.better {
            Better::Higher => va.partial_cmp(&vb),
            Better::Lower => vb.partial_cmp(&va),
        };
        match ordering {
            Some(Ordering::Greater) => sentences.push((rule.sentence)(&a.ticker, &b.ticker)),
            Some(Ordering::Less) => sentences.push((rule.sentence)(&b.ticker, &a.ticker)),
            Some(Ordering::Equal) | None => {}
        }
    }

    if sentences.is_empty() {
        SIMILAR_VERDICT.to_string()
    } else {
        sentences.join(" ")
    }
}

/// Rounds to 3 decimals from the exact binary value, ties to even.
pub fn round3(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.3}").parse().unwrap_or(value)
}

/// Maps a similarity lookup for two tickers that already resolved. Any
/// failure here is a catalog defect, never a missing ticker.
fn resolved_similarity(
    lookup: Result<f64, CatalogError>,
    t1: &str,
    t2: &str,
) -> CoreResult<f64> {
    let similarity = lookup.map_err(|e| match e {
        CatalogError::NotFound(t) => {
            CoreError::Internal(format!("{t} resolved but has no similarity row"))
        }
        CatalogError::Invalid(detail) => CoreError::Internal(detail),
    })?;
    if !similarity.is_finite() {
        return Err(CoreError::Internal(format!(
            "similarity for {t1}/{t2} is not finite"
        )));
    }
    Ok(similarity)
}

/// Head-to-head comparison over a shared catalog.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    catalog: Arc<StockCatalog>,
}

impl ComparisonEngine {
    pub fn new(catalog: Arc<StockCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StockCatalog {
        &self.catalog
    }

    pub fn compare(&self, ticker_a: &str, ticker_b: &str) -> CoreResult<ComparisonResult> {
        let t1 = normalize_ticker(ticker_a);
        let t2 = normalize_ticker(ticker_b);

        let a = self.catalog.get(&t1)?;
        let b = self.catalog.get(&t2)?;
        let similarity = resolved_similarity(self.catalog.similarity(&t1, &t2), &t1, &t2)?;

        tracing::debug!(ticker1 = %t1, ticker2 = %t2, similarity, "compared stocks");

        Ok(ComparisonResult {
            company1: a.company_or_na().to_string(),
            company2: b.company_or_na().to_string(),
            similarity_score: round3(similarity),
            metrics: ComparisonMetrics::from_records(a, b),
            verdict: verdict(a, b),
            ticker1: t1,
            ticker2: t2,
        })
    }
}
