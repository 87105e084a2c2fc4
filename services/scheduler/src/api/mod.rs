//! HTTP API handlers and routing.

pub mod error;
mod health;
pub mod request_context;
mod schedule;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use request_context::MakeRequestUlid;

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The browser client runs on another origin.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .merge(health::routes())
        .nest("/scheduler", schedule::routes())
        // Middleware
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUlid))
        .layer(cors)
        // Application state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ScheduleStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(ScheduleStore::default(), "window"))
    }

    #[tokio::test]
    async fn test_health_routes_mounted() {
        for path in ["/healthz", "/readyz", "/livez"] {
            let request = Request::builder().uri(path).body(Body::empty()).unwrap();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let request = Request::builder()
            .uri("/scheduler")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get("x-request-id").unwrap();
        assert!(id.to_str().unwrap().starts_with("req_"));
    }

    #[tokio::test]
    async fn test_malformed_task_id_is_bad_request() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/scheduler/not-a-task")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
