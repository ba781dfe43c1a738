use crate::domain::contract::RecommendRequest;
use crate::domain::recommendation::RecommendationResult;
use crate::engine::{EngineErrorKind, RecommendationEngine};
use crate::error::CoreResult;
use std::sync::Arc;

/// Validates recommend requests and routes them to the engine.
#[derive(Clone)]
pub struct RequestDispatcher {
    engine: Arc<dyn RecommendationEngine>,
}

impl RequestDispatcher {
    pub fn new(engine: Arc<dyn RecommendationEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Portfolio mode when a non-empty portfolio is given, else user mode.
    /// The engine's result is returned untouched.
    pub async fn recommend(&self, request: RecommendRequest) -> CoreResult<RecommendationResult> {
        let input = request.validate_and_into_input()?;
        let mode = input.mode();

        match self.engine.generate_recommendations(input).await {
            Ok(result) => {
                tracing::info!(
                    engine = self.engine.name(),
                    ?mode,
                    count = result.recommendations.len(),
                    "recommendations generated"
                );
                Ok(result)
            }
            Err(err) => {
                match err.kind() {
                    EngineErrorKind::BadInput => {
                        tracing::info!(engine = self.engine.name(), ?mode, error = %err, "engine rejected input")
                    }
                    EngineErrorKind::Fault => {
                        tracing::error!(engine = self.engine.name(), ?mode, error = %err, "engine failed")
                    }
                }
                Err(err.into())
            }
        }
    }
}
