//! Shared state and wire bodies for the HTTP API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::DrugCatalog;
use crate::pipeline::InteractionPipeline;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<InteractionPipeline>,
    pub catalog: Arc<DrugCatalog>,
}

impl ApiContext {
    pub fn new(pipeline: Arc<InteractionPipeline>, catalog: Arc<DrugCatalog>) -> Self {
        Self { pipeline, catalog }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

/// `POST /api/drugs`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub drug_name: String,
}

/// `POST /api/drugs/interaction`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub drug_name: Vec<String>,
}

/// `GET /api/drugs/suggest`
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
}
