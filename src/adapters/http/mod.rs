//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the full application: the study endpoints under
//! `/api/study`, a liveness probe, request tracing and CORS.

pub mod study;

use axum::{routing::get, Json, Router};
use http::{header, HeaderValue, Method};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use study::{study_routes, StudyHandlers};

/// Builds the application router.
///
/// An empty `cors_origins` list allows any origin.
pub fn app_router(handlers: StudyHandlers, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/study", study_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(cors_origins)),
        )
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}
