use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;

/// Rejects requests whose `X-API-Key` header does not match the configured
/// key. With no key configured the API is open, which is the default for
/// local single-user deployments.
pub async fn api_key_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = &state.config.config.api_key {
        let provided = request
            .headers()
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}
