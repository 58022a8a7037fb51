pub mod chat;
pub mod conversations;
pub mod documents;
pub mod health;
pub mod tickets;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method, StatusCode};
use axum::{routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware;
use crate::api::state::AppState;
use crate::domain::DomainError;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let body_limit = state.config.config.upload.max_bytes;

    let api = api_v1_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::api_key_auth,
    ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api)
        .layer(axum::middleware::from_fn(middleware::logging::request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat_handler))
        .route("/chat/jobs/{job_id}", get(chat::get_job_status))
        .route(
            "/conversations/{id}",
            get(conversations::get_conversation)
                .delete(conversations::delete_conversation),
        )
        .route("/documents", post(documents::create_document))
        .route("/documents", get(documents::list_documents))
        .route("/documents/upload", post(documents::upload_document))
        .route("/documents/search", post(documents::search_documents))
        .route("/documents/stats", get(documents::document_stats))
        .route("/documents/{id}", get(documents::get_document))
        .route(
            "/documents/{id}",
            axum::routing::delete(documents::delete_document),
        )
        .route("/tickets/analyze", post(tickets::analyze_ticket))
}

/// Maps the error taxonomy onto response codes: invalid input is the
/// caller's fault, missing resources are 404, upstream trouble is 5xx.
pub(crate) fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DomainError::ExternalService(_) | DomainError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
