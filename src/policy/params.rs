//! Query parameter allow-listing.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

use crate::config::ArgumentSet;
use crate::observability::metrics;

/// Allow-set of query parameter names permitted upstream.
///
/// Only installed when the configured set is non-empty; absence of
/// configuration means the check is disabled, not "allow nothing".
pub struct ParamFilter {
    params: HashSet<String>,
    allowed: String,
}

impl ParamFilter {
    pub fn new(allowed_params: &ArgumentSet) -> Self {
        Self {
            params: allowed_params.allow_set(),
            allowed: allowed_params.to_string(),
        }
    }

    /// The first query parameter name that is not allow-listed, if any.
    fn first_unregistered(&self, query: &str) -> Option<String> {
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| !self.params.contains(name.as_ref()))
            .map(|(name, _)| name.into_owned())
    }
}

/// Reject requests carrying any query parameter outside the allow-set.
/// Requests with no query parameters always pass.
pub async fn enforce_allowed_params(
    State(policy): State<Arc<ParamFilter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(query) = request.uri().query() {
        if let Some(parameter) = policy.first_unregistered(query) {
            tracing::warn!(
                parameter = %parameter,
                allowed = %policy.allowed,
                "query parameter is not allow-listed"
            );
            metrics::record_rejected("parameter");
            return (StatusCode::NOT_ACCEPTABLE, "Unregistered parameter").into_response();
        }
    }

    next.run(request).await
}
