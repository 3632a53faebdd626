//! Favicon suppression.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Answer browser favicon probes with 404 instead of bothering the backend.
pub async fn suppress_favicon(request: Request<Body>, next: Next) -> Response {
    if request.uri().path().starts_with("/favicon") {
        return StatusCode::NOT_FOUND.into_response();
    }

    next.run(request).await
}
