pub mod error;

use anyhow::Context;
use axum::{extract::State, routing::get, routing::post, Json, Router};
use fingenius_core::compare::{ComparisonEngine, ComparisonResult};
use fingenius_core::config::Settings;
use fingenius_core::dispatch::RequestDispatcher;
use fingenius_core::domain::contract::{CompareRequest, RecommendRequest};
use fingenius_core::domain::recommendation::RecommendationResult;
use fingenius_core::engine::similarity::SimilarityRecommender;
use fingenius_core::engine::{EngineError, RecommendationEngine};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    dispatcher: RequestDispatcher,
    comparison: ComparisonEngine,
}

impl AppState {
    /// State over an engine that has already been loaded and prepared.
    pub fn new(engine: Arc<dyn RecommendationEngine>) -> Result<Self, EngineError> {
        let catalog = engine.catalog()?;
        Ok(Self {
            dispatcher: RequestDispatcher::new(engine),
            comparison: ComparisonEngine::new(catalog),
        })
    }

    /// Loads the dataset and prepares the reference engine. Any failure is fatal.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.require_data_files()?;

        let mut engine = SimilarityRecommender::new(settings.top_n);
        engine
            .load(&settings.stocks_csv, &settings.portfolios_csv)
            .context("dataset load failed")?;
        engine
            .prepare_features()
            .context("feature preparation failed")?;

        let state = Self::new(Arc::new(engine)).context("engine produced no catalog")?;
        tracing::info!(
            engine = state.dispatcher.engine_name(),
            stocks = state.comparison.catalog().len(),
            "recommender is ready"
        );
        Ok(state)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/recommend", post(recommend))
        .route("/compare", post(compare))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the FinGenius Recommender API" }))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendationResult>, ApiError> {
    tracing::info!(
        user_id = request.user_id.as_deref(),
        portfolio_len = request.portfolio.as_ref().map(Vec::len),
        "recommend request"
    );
    let result = state.dispatcher.recommend(request).await?;
    Ok(Json(result))
}

async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ComparisonResult>, ApiError> {
    tracing::info!(ticker1 = %request.ticker1, ticker2 = %request.ticker2, "compare request");
    let result = state
        .comparison
        .compare(&request.ticker1, &request.ticker2)?;
    Ok(Json(result))
}
