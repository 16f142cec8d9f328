use axum::{
    extract::{Query, State},
    Json,
};
use common::catalog::types::search_response::SearchResponse;
use query_pipeline::SearchOptions;
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub max_results: Option<u32>,
    #[serde(default)]
    pub debug: bool,
    pub confidence_threshold: Option<f64>,
}

pub async fn search_post(
    State(state): State<ApiState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(state, request).await
}

/// GET variant accepting the same fields as query parameters.
pub async fn search_get(
    State(state): State<ApiState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(state, request).await
}

async fn run_search(
    state: ApiState,
    request: SearchRequest,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if query.is_empty() {
        return Err(ApiError::ValidationError("query is required".to_string()));
    }

    let max_results = request.max_results.unwrap_or(20);
    if !(1..=100).contains(&max_results) {
        return Err(ApiError::ValidationError(
            "max_results must be between 1 and 100".to_string(),
        ));
    }

    let confidence_threshold = request
        .confidence_threshold
        .unwrap_or(state.config.confidence_threshold);
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(ApiError::ValidationError(
            "confidence_threshold must be between 0 and 1".to_string(),
        ));
    }

    info!(
        query = %query,
        max_results,
        debug = request.debug,
        confidence_threshold,
        "received search request"
    );

    let options = SearchOptions {
        max_results,
        debug: request.debug,
        confidence_threshold,
    };
    let response = state.pipeline.search(&query, &options).await?;

    Ok(Json(response))
}
