use axum::{Router, middleware, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::types::{Json, ServiceInfo};
use crate::domain::LayerKind;
use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router};

/// Create the full router; `/metrics` is mounted when a recorder is installed
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let metrics_path = state.config.metrics.path.clone();

    let app = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api", handlers::create_api_router())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive());

    match metrics {
        Some(metrics) => app.merge(create_metrics_router(metrics, &metrics_path)),
        None => app,
    }
}

/// GET /
async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "pmp-cache-hierarchy",
        version: env!("CARGO_PKG_VERSION"),
        layers: LayerKind::ALL.iter().map(|k| k.to_string()).collect(),
        endpoints: vec![
            "POST /api/query",
            "POST /api/documents",
            "POST /api/documents/batch",
            "DELETE /api/cache",
            "GET /api/health",
            "GET /api/providers",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::AppConfig;

    fn app() -> Router {
        let state = crate::create_app_state(&AppConfig::offline()).unwrap();
        create_router(state, None)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_service_info() {
        let (status, body) = send(&app(), get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "pmp-cache-hierarchy");
        assert_eq!(body["layers"][0], "Layer 0 (Exact Cache)");
    }

    #[tokio::test]
    async fn test_liveness() {
        let app = app();

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(&app, get("/live")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app().oneshot(get("/live")).await.unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_query_miss_then_exact_hit() {
        let app = app();

        let (status, first) = send(&app, post("/api/query", json!({"query": "What is Python?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["cache_hit"], false);
        assert_eq!(first["llm_called"], true);
        assert_eq!(first["llm_provider"], "dummy");

        let (status, second) = send(&app, post("/api/query", json!({"query": "What is Python?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cache_hit"], true);
        assert_eq!(second["cache_layer"], "exact");
        assert_eq!(second["llm_called"], false);
        assert_eq!(second["response"], first["response"]);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let (status, body) = send(&app(), post("/api/query", json!({"query": "   "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let (status, body) = send(&app(), post("/api/query", json!({"text": "hi"}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let (status, body) = send(
            &app(),
            post("/api/query", json!({"query": "hello", "llm_provider": "nope"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "provider_not_found");
        assert!(body["error"]["message"].as_str().unwrap().contains("dummy"));
    }

    #[tokio::test]
    async fn test_add_documents() {
        let app = app();

        let (status, body) = send(
            &app,
            post(
                "/api/documents",
                json!({"content": "Rust is a systems programming language.", "metadata": {"source": "docs"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["document_id"].as_str().is_some_and(|id| !id.is_empty()));

        let (status, _) = send(&app, post("/api/documents", json!({"content": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post(
                "/api/documents/batch",
                json!({"documents": [{"content": "First doc."}, {"content": "Second doc."}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["document_ids"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let app = app();

        let (status, body) = send(&app, delete("/api/cache?layer=0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], json!(["exact"]));

        let (status, body) = send(&app, delete("/api/cache")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], json!(["exact", "semantic", "retrieval"]));

        let (status, _) = send(&app, delete("/api/cache?layer=7")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_hierarchy_health() {
        let (status, body) = send(&app(), get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["exact_cache"], "up");
        assert_eq!(body["providers"], json!(["dummy"]));
        assert_eq!(body["write_back_failures"], 0);
    }

    #[tokio::test]
    async fn test_list_providers() {
        let (status, body) = send(&app(), get("/api/providers")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default"], "dummy");
        assert_eq!(body["providers"][0]["name"], "dummy");
    }
}
