use crate::domain::portfolio::{PortfolioEntry, PortfolioTable};
use crate::engine::EngineInput;
use crate::error::{CoreError, MISSING_RECOMMEND_INPUT};
use serde::{Deserialize, Serialize};

/// Body of a recommend request. At least one of the two fields must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub portfolio: Option<Vec<PortfolioEntry>>,
}

/// Body of a compare request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub ticker1: String,
    pub ticker2: String,
}

impl RecommendRequest {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            portfolio: None,
        }
    }

    pub fn for_portfolio(portfolio: Vec<PortfolioEntry>) -> Self {
        Self {
            user_id: None,
            portfolio: Some(portfolio),
        }
    }

    /// Picks the engine mode. A non-empty portfolio wins over a user id.
    pub fn validate_and_into_input(self) -> Result<EngineInput, CoreError> {
        if let Some(entries) = self.portfolio.filter(|p| !p.is_empty()) {
            let table = PortfolioTable::from_entries(entries)
                .map_err(|e| CoreError::InvalidRequest(e.to_string()))?;
            return Ok(EngineInput::Portfolio(table));
        }

        match self.user_id.map(|s| s.trim().to_string()) {
            Some(user_id) if !user_id.is_empty() => Ok(EngineInput::User(user_id)),
            _ => Err(CoreError::InvalidRequest(MISSING_RECOMMEND_INPUT.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_either_shape() {
        let req: RecommendRequest = serde_json::from_value(json!({"user_id": "u1"})).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("u1"));
        assert!(req.portfolio.is_none());

        let req: RecommendRequest = serde_json::from_value(json!({
            "portfolio": [{"ticker": "AAPL", "weight": 0.5}]
        }))
        .unwrap();
        assert_eq!(req.portfolio.unwrap()[0].ticker, "AAPL");

        let req: RecommendRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.user_id.is_none() && req.portfolio.is_none());
    }

    #[test]
    fn portfolio_takes_precedence_over_user() {
        let req = RecommendRequest {
            user_id: Some("u1".to_string()),
            portfolio: Some(vec![PortfolioEntry {
                ticker: "aapl".to_string(),
                weight: 1.0,
            }]),
        };
        match req.validate_and_into_input().unwrap() {
            EngineInput::Portfolio(table) => assert_eq!(table.rows()[0].ticker, "AAPL"),
            other => panic!("expected portfolio mode, got {other:?}"),
        }
    }

    #[test]
    fn empty_portfolio_falls_back_to_user() {
        let req = RecommendRequest {
            user_id: Some(" u1 ".to_string()),
            portfolio: Some(vec![]),
        };
        assert_eq!(
            req.validate_and_into_input().unwrap(),
            EngineInput::User("u1".to_string())
        );
    }

    #[test]
    fn neither_input_is_invalid() {
        for req in [
            RecommendRequest::default(),
            RecommendRequest::for_user("   "),
            RecommendRequest::for_portfolio(vec![]),
        ] {
            match req.validate_and_into_input() {
                Err(CoreError::InvalidRequest(msg)) => assert_eq!(msg, MISSING_RECOMMEND_INPUT),
                other => panic!("expected InvalidRequest, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_portfolio_ticker_is_invalid() {
        let req = RecommendRequest::for_portfolio(vec![PortfolioEntry {
            ticker: "".to_string(),
            weight: 1.0,
        }]);
        assert!(matches!(
            req.validate_and_into_input(),
            Err(CoreError::InvalidRequest(_))
        ));
    }
}
