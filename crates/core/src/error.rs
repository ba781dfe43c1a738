use crate::catalog::CatalogError;
use crate::engine::EngineError;
use thiserror::Error;

/// Message returned when a recommend request names neither a user nor a portfolio.
pub const MISSING_RECOMMEND_INPUT: &str = "Provide either user_id or portfolio.";

/// Message returned when a comparison names an unknown ticker.
pub const TICKERS_NOT_FOUND: &str = "One or both tickers not found.";

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or underspecified client input.
    #[error("{0}")]
    InvalidRequest(String),

    /// A referenced ticker is absent from the catalog.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Unexpected failure. The message is for logs, not for clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => CoreError::NotFound(TICKERS_NOT_FOUND.to_string()),
            CatalogError::Invalid(detail) => CoreError::Internal(detail),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
