//! Per-request logging.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::X_REQUEST_ID;

/// Log a start event before the wrapped handler runs and an end event with
/// the elapsed duration after it returns. Never short-circuits.
///
/// The duration is measured strictly around the wrapped call so it reflects
/// backend latency, not this decorator's own overhead.
pub async fn log_request(
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();
    let path = request.uri().path().to_owned();

    tracing::info!(
        request_id = %request_id,
        path = %path,
        remote_addr = %remote,
        "request start"
    );

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    tracing::info!(
        request_id = %request_id,
        path = %path,
        status = %response.status(),
        duration = ?elapsed,
        "request end"
    );

    response
}
