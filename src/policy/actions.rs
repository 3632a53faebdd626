//! Action allow-listing.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::ArgumentSet;
use crate::observability::metrics;
use crate::policy::first_segment;

/// Allow-set of actions, where an action is the first path segment of the
/// request (e.g. `resize` for `/resize/a.jpg`).
///
/// Only installed when the configured set is non-empty.
pub struct ActionFilter {
    actions: HashSet<String>,
    allowed: String,
}

impl ActionFilter {
    pub fn new(allowed_actions: &ArgumentSet) -> Self {
        Self {
            actions: allowed_actions.allow_set(),
            allowed: allowed_actions.to_string(),
        }
    }

    fn is_registered(&self, path: &str) -> bool {
        self.actions.contains(first_segment(path))
    }
}

/// Reject requests whose action is not registered.
pub async fn enforce_allowed_actions(
    State(policy): State<Arc<ActionFilter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !policy.is_registered(path) {
        tracing::warn!(
            action = first_segment(path),
            allowed = %policy.allowed,
            "action is not allow-listed"
        );
        metrics::record_rejected("action");
        return (StatusCode::NOT_ACCEPTABLE, "Unregistered action").into_response();
    }

    next.run(request).await
}
