pub mod similarity;

use crate::catalog::StockCatalog;
use crate::domain::portfolio::PortfolioTable;
use crate::domain::recommendation::{RecommendationMode, RecommendationResult};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineInput {
    User(String),
    Portfolio(PortfolioTable),
}

impl EngineInput {
    pub fn mode(&self) -> RecommendationMode {
        match self {
            EngineInput::User(_) => RecommendationMode::User,
            EngineInput::Portfolio(_) => RecommendationMode::Portfolio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The caller asked for something the engine cannot answer.
    BadInput,
    /// The engine itself failed.
    Fault,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    BadInput(String),

    #[error("recommendation engine is not ready: {0}")]
    NotReady(&'static str),

    #[error("dataset error: {0}")]
    Data(String),

    #[error("recommendation engine failed: {0}")]
    Fault(String),
}

impl EngineError {
    pub fn kind(&self) -> EngineErrorKind {
        match self {
            EngineError::BadInput(_) => EngineErrorKind::BadInput,
            EngineError::NotReady(_) | EngineError::Data(_) | EngineError::Fault(_) => {
                EngineErrorKind::Fault
            }
        }
    }

    /// Wraps an anyhow chain from the loader, keeping every context line.
    pub fn data(err: anyhow::Error) -> Self {
        EngineError::Data(format!("{err:#}"))
    }
}

/// The recommendation capability consumed by the dispatcher.
///
/// Lifecycle: `load` once, `prepare_features` once, then any number of
/// concurrent `generate_recommendations` calls through a shared reference.
#[async_trait::async_trait]
pub trait RecommendationEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bulk-loads the stock table and the stored user portfolios.
    fn load(&mut self, stocks_path: &Path, portfolios_path: &Path) -> Result<(), EngineError>;

    /// Computes derived features and the similarity matrix. Idempotent.
    fn prepare_features(&mut self) -> Result<(), EngineError>;

    /// The catalog built by `prepare_features`.
    fn catalog(&self) -> Result<Arc<StockCatalog>, EngineError>;

    async fn generate_recommendations(
        &self,
        input: EngineInput,
    ) -> Result<RecommendationResult, EngineError>;
}
