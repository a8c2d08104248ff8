use crate::http::handlers;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::warn;

#[derive(Clone)]
struct Cors {
    allow_origin: HeaderValue,
}

pub fn build_router(state: AppState) -> Router {
    let allow_origin = HeaderValue::from_str(&state.config.cors_allow_origin).unwrap_or_else(|_| {
        warn!(origin = %state.config.cors_allow_origin, "invalid CORS origin, allowing any");
        HeaderValue::from_static("*")
    });
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/api/body-language/start-session", post(handlers::start_session))
        .route("/api/body-language/analyze-frame", post(handlers::analyze_frame))
        .route("/api/body-language/stop-session", post(handlers::stop_session))
        .route("/api/health", get(handlers::health))
        .layer(middleware::from_fn_with_state(Cors { allow_origin }, cors))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Answers preflight requests and stamps CORS headers on every response
async fn cors(State(cors): State<Cors>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, cors.allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}
