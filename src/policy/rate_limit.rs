//! Rate limiting middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;
use crate::policy::token_bucket::TokenBucket;

/// Throttle admission by delaying, never by rejecting.
///
/// The innermost decorator: a request reaching it has already passed every
/// validation, so the delay is only ever charged to admitted requests.
pub async fn throttle(
    State(bucket): State<Arc<TokenBucket>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let delay = bucket.take(1);
    if delay > Duration::ZERO {
        tracing::info!(delay = ?delay, "rate limiting");
        metrics::record_rate_limited(delay);
        tokio::time::sleep(delay).await;
    }

    next.run(request).await
}
