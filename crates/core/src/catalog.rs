use crate::domain::stock::{normalize_ticker, StockRecord};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("ticker not found: {0}")]
    NotFound(String),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// Square, symmetric matrix of pairwise similarity scores, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, CatalogError> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(CatalogError::Invalid(format!(
                    "similarity row {i} has {} columns, expected {dim}",
                    row.len()
                )));
            }
            values.extend(row);
        }
        let matrix = Self { dim, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Builds a matrix from the upper triangle; `f(i, j)` is called for `i <= j` only
    /// and mirrored, so the result is symmetric by construction.
    pub fn from_upper_triangle(
        dim: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, CatalogError> {
        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in i..dim {
                let v = f(i, j);
                values[i * dim + j] = v;
                values[j * dim + i] = v;
            }
        }
        let matrix = Self { dim, values };
        matrix.validate()?;
        Ok(matrix)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.dim || j >= self.dim {
            return None;
        }
        self.values.get(i * self.dim + j).copied()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let max = self
            .values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        for i in 0..self.dim {
            for j in 0..self.dim {
                let v = self.values[i * self.dim + j];
                if !v.is_finite() {
                    return Err(CatalogError::Invalid(format!(
                        "similarity ({i},{j}) is not finite"
                    )));
                }
                if v != self.values[j * self.dim + i] {
                    return Err(CatalogError::Invalid(format!(
                        "similarity ({i},{j}) is not symmetric"
                    )));
                }
            }
            // Self-similarity must be the top score.
            if self.values[i * self.dim + i] != max {
                return Err(CatalogError::Invalid(format!(
                    "self-similarity of row {i} is below the matrix maximum"
                )));
            }
        }
        Ok(())
    }
}

/// Read-only table of stock records plus the similarity matrix aligned to
/// the same ordering.
#[derive(Debug, Clone)]
pub struct StockCatalog {
    records: Vec<StockRecord>,
    index: HashMap<String, usize>,
    similarity: SimilarityMatrix,
}

impl StockCatalog {
    pub fn new(records: Vec<StockRecord>, similarity: SimilarityMatrix) -> Result<Self, CatalogError> {
        if similarity.dim() != records.len() {
            return Err(CatalogError::Invalid(format!(
                "similarity matrix is {0}x{0} but catalog has {1} stocks",
                similarity.dim(),
                records.len()
            )));
        }

        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if record.ticker.is_empty() || record.ticker != normalize_ticker(&record.ticker) {
                return Err(CatalogError::Invalid(format!(
                    "ticker at position {pos} is not canonical: {:?}",
                    record.ticker
                )));
            }
            if index.insert(record.ticker.clone(), pos).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate ticker {}",
                    record.ticker
                )));
            }
        }

        Ok(Self {
            records,
            index,
            similarity,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.ticker.as_str())
    }

    pub fn position(&self, ticker: &str) -> Option<usize> {
        self.index.get(&normalize_ticker(ticker)).copied()
    }

    pub fn get(&self, ticker: &str) -> Result<&StockRecord, CatalogError> {
        self.position(ticker)
            .and_then(|pos| self.records.get(pos))
            .ok_or_else(|| CatalogError::NotFound(normalize_ticker(ticker)))
    }

    pub fn similarity(&self, a: &str, b: &str) -> Result<f64, CatalogError> {
        let i = self
            .position(a)
            .ok_or_else(|| CatalogError::NotFound(normalize_ticker(a)))?;
        let j = self
            .position(b)
            .ok_or_else(|| CatalogError::NotFound(normalize_ticker(b)))?;
        self.similarity_at(i, j)
    }

    pub fn similarity_at(&self, i: usize, j: usize) -> Result<f64, CatalogError> {
        self.similarity
            .get(i, j)
            .ok_or_else(|| CatalogError::Invalid(format!("no similarity entry at ({i},{j})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StockCatalog {
        let records = vec![
            StockRecord::new("AAPL"),
            StockRecord::new("MSFT"),
            StockRecord::new("XOM"),
        ];
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.812, -0.2],
            vec![0.812, 1.0, 0.1],
            vec![-0.2, 0.1, 1.0],
        ])
        .unwrap();
        StockCatalog::new(records, matrix).unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive_and_returns_canonical_ticker() {
        let cat = catalog();
        assert_eq!(cat.get("aapl").unwrap().ticker, "AAPL");
        assert_eq!(cat.get(" Msft ").unwrap().ticker, "MSFT");
        assert_eq!(cat.position("xom"), Some(2));
    }

    #[test]
    fn unknown_ticker_is_not_found() {
        let cat = catalog();
        assert_eq!(
            cat.get("TSLA").unwrap_err(),
            CatalogError::NotFound("TSLA".to_string())
        );
        assert!(matches!(
            cat.similarity("AAPL", "tsla"),
            Err(CatalogError::NotFound(t)) if t == "TSLA"
        ));
        assert!(matches!(cat.get(""), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn similarity_is_symmetric_with_max_on_diagonal() {
        let cat = catalog();
        let tickers: Vec<String> = cat.tickers().map(str::to_string).collect();
        for a in &tickers {
            assert_eq!(cat.similarity(a, a).unwrap(), 1.0);
            for b in &tickers {
                assert_eq!(cat.similarity(a, b).unwrap(), cat.similarity(b, a).unwrap());
                assert!(cat.similarity(a, b).unwrap() <= cat.similarity(a, a).unwrap());
            }
        }
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let err = StockCatalog::new(
            vec![StockRecord::new("AAPL"), StockRecord::new("MSFT")],
            matrix,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_tickers() {
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        let err = StockCatalog::new(
            vec![StockRecord::new("AAPL"), StockRecord::new("aapl")],
            matrix,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate ticker AAPL"));
    }

    #[test]
    fn rejects_malformed_matrices() {
        assert!(SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.4, 1.0]]).is_err());
        assert!(SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]).is_err());
        assert!(SimilarityMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![f64::NAN, 1.0]]).is_err());
        assert!(SimilarityMatrix::from_rows(vec![vec![0.5, 0.9], vec![0.9, 1.0]]).is_err());
    }

    #[test]
    fn upper_triangle_builder_mirrors_entries() {
        let m = SimilarityMatrix::from_upper_triangle(3, |i, j| if i == j { 1.0 } else { 0.25 })
            .unwrap();
        assert_eq!(m.get(2, 0), Some(0.25));
        assert_eq!(m.get(0, 2), Some(0.25));
        assert_eq!(m.get(3, 0), None);
    }
}
