//! HTTP handlers.
//!
//! - `GET  /api/health`           liveness + configured model
//! - `POST /api/drugs`            single-drug label lookup
//! - `POST /api/drugs/interaction` batch interaction analysis
//! - `GET  /api/drugs/local`      full local catalog
//! - `GET  /api/drugs/suggest`    autocomplete over the catalog
//!
//! Pipeline calls block on network I/O and run on the blocking pool.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{
    ApiContext, HealthResponse, InteractionRequest, SearchRequest, SuggestQuery, SuggestResponse,
};
use crate::catalog::DEFAULT_SUGGESTION_LIMIT;
use crate::pipeline::labels::LabelRecord;
use crate::pipeline::InteractionAnalysis;

/// Upper bound on the `limit` query parameter.
const MAX_SUGGESTION_LIMIT: usize = 50;

/// `GET /api/health`
pub async fn health(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.pipeline.model_name().to_string(),
    })
}

/// `POST /api/drugs`
pub async fn search_drug(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<LabelRecord>, ApiError> {
    let Json(request) = payload?;
    let pipeline = ctx.pipeline.clone();

    let record =
        tokio::task::spawn_blocking(move || pipeline.search(&request.drug_name)).await??;

    Ok(Json(record))
}

/// `POST /api/drugs/interaction`
pub async fn analyze_interactions(
    State(ctx): State<ApiContext>,
    payload: Result<Json<InteractionRequest>, JsonRejection>,
) -> Result<Json<InteractionAnalysis>, ApiError> {
    let Json(request) = payload?;
    let pipeline = ctx.pipeline.clone();

    let analysis =
        tokio::task::spawn_blocking(move || pipeline.analyze(&request.drug_name)).await??;

    Ok(Json(analysis))
}

/// `GET /api/drugs/local`
pub async fn local_drugs(State(ctx): State<ApiContext>) -> Json<Vec<String>> {
    Json(ctx.catalog.names().to_vec())
}

/// `GET /api/drugs/suggest?q=...&limit=...`
pub async fn suggest(
    State(ctx): State<ApiContext>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
        .clamp(1, MAX_SUGGESTION_LIMIT);

    let suggestions = ctx
        .catalog
        .suggest(&query.q, limit)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Json(SuggestResponse { suggestions }))
}
