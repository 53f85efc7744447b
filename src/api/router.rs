//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Layers (outermost first): CORS, request tracing.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::catalog::DrugCatalog;
use crate::pipeline::InteractionPipeline;

/// Build the API router.
pub fn api_router(pipeline: Arc<InteractionPipeline>, catalog: Arc<DrugCatalog>) -> Router {
    build_router(ApiContext::new(pipeline, catalog))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health))
        .route("/drugs", post(endpoints::search_drug))
        .route("/drugs/interaction", post(endpoints::analyze_interactions))
        .route("/drugs/local", get(endpoints::local_drugs))
        .route("/drugs/suggest", get(endpoints::suggest))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::trace_request))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::pipeline::interactions::{InteractionClassifier, MockReasoningEngine};
    use crate::pipeline::labels::MockLabelSource;
    use crate::pipeline::UnknownDrugPolicy;

    const REPORT: &str = r#"{
        "highRisk": [{"drugA": "WARFARIN", "drugB": "IBUPROFEN", "reason": "Bleeding"}],
        "moderateRisk": [],
        "lowRisk": [{"drugA": "IBUPROFEN", "drugB": "warfarin", "reason": "dup"}]
    }"#;

    fn app_with(source: MockLabelSource, engine: MockReasoningEngine) -> Router {
        let classifier = InteractionClassifier::new(Arc::new(engine), "medgemma");
        let pipeline = InteractionPipeline::new(
            Arc::new(source),
            classifier,
            UnknownDrugPolicy::Exclude,
        );
        let catalog = DrugCatalog::new(["Advil", "Aleve", "Tylenol", "Warfarin"]);
        api_router(Arc::new(pipeline), Arc::new(catalog))
    }

    fn app() -> Router {
        app_with(
            MockLabelSource::new()
                .with_label("Warfarin", "WARFARIN", &["NSAIDs"], &["Bleeding"])
                .with_label("Advil", "IBUPROFEN", &["Anticoagulants"], &[]),
            MockReasoningEngine::new(REPORT),
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_model() {
        let response = app().oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "medgemma");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn search_returns_label_record() {
        let response = app()
            .oneshot(post_json("/api/drugs", r#"{"drugName": "Advil"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["name"], "IBUPROFEN");
        assert_eq!(json["query"], "Advil");
        assert_eq!(json["interactionsText"][0], "Anticoagulants");
    }

    #[tokio::test]
    async fn search_unknown_drug_returns_empty_record() {
        let response = app()
            .oneshot(post_json("/api/drugs", r#"{"drugName": "Tylenol"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["name"], "Tylenol");
        assert_eq!(json["genericName"], "");
    }

    #[tokio::test]
    async fn search_missing_field_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/drugs", r#"{"name": "Advil"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn search_blank_name_is_invalid_input() {
        let response = app()
            .oneshot(post_json("/api/drugs", r#"{"drugName": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn interaction_returns_aggregated_report() {
        let response = app()
            .oneshot(post_json(
                "/api/drugs/interaction",
                r#"{"drugName": ["Warfarin", "Advil"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["interactions"]["highRisk"].as_array().unwrap().len(), 1);
        assert!(json["interactions"]["lowRisk"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["drugs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn interaction_over_batch_limit_is_rejected() {
        let names: Vec<String> = (0..11).map(|i| format!("\"Drug{i}\"")).collect();
        let body = format!(r#"{{"drugName": [{}]}}"#, names.join(","));
        let response = app()
            .oneshot(post_json("/api/drugs/interaction", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BATCH_SIZE_EXCEEDED");
    }

    #[tokio::test]
    async fn interaction_with_single_drug_is_insufficient() {
        let response = app()
            .oneshot(post_json("/api/drugs/interaction", r#"{"drugName": ["Warfarin"]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "INSUFFICIENT_INPUT");
    }

    #[tokio::test]
    async fn label_outage_returns_503() {
        let app = app_with(
            MockLabelSource::new()
                .with_label("Warfarin", "WARFARIN", &[], &[])
                .with_outage("Advil"),
            MockReasoningEngine::new(REPORT),
        );
        let response = app
            .oneshot(post_json(
                "/api/drugs/interaction",
                r#"{"drugName": ["Warfarin", "Advil"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "5");
    }

    #[tokio::test]
    async fn engine_outage_returns_503() {
        let app = app_with(
            MockLabelSource::new()
                .with_label("Warfarin", "WARFARIN", &[], &[])
                .with_label("Advil", "IBUPROFEN", &[], &[]),
            MockReasoningEngine::unavailable(),
        );
        let response = app
            .oneshot(post_json(
                "/api/drugs/interaction",
                r#"{"drugName": ["Warfarin", "Advil"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = response_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Reasoning engine"));
    }

    #[tokio::test]
    async fn unusable_engine_answer_returns_502() {
        let app = app_with(
            MockLabelSource::new()
                .with_label("Warfarin", "WARFARIN", &[], &[])
                .with_label("Advil", "IBUPROFEN", &[], &[]),
            MockReasoningEngine::new(r#"{"highRisk": "none"}"#),
        );
        let response = app
            .oneshot(post_json(
                "/api/drugs/interaction",
                r#"{"drugName": ["Warfarin", "Advil"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn local_drugs_lists_catalog() {
        let response = app().oneshot(get_request("/api/drugs/local")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[0], "Advil");
    }

    #[tokio::test]
    async fn suggest_completes_last_entry() {
        let response = app()
            .oneshot(get_request("/api/drugs/suggest?q=Warfarin,%20al"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["suggestions"], serde_json::json!(["Aleve"]));
    }

    #[tokio::test]
    async fn suggest_without_query_is_empty() {
        let response = app().oneshot(get_request("/api/drugs/suggest")).await.unwrap();
        let json = response_json(response).await;
        assert!(json["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_id_is_echoed_or_generated() {
        let request = Request::builder()
            .uri("/api/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");

        let response = app().oneshot(get_request("/api/health")).await.unwrap();
        let generated = response.headers().get("x-request-id").unwrap();
        assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let response = app().oneshot(get_request("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
