//! Path prefix stripping.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    middleware::Next,
    response::Response,
};

/// Prefix removed from the front of request paths before forwarding.
///
/// Only installed when a prefix is configured. Never short-circuits; the
/// rewritten path is visible to every decorator downstream.
pub struct PathStrip {
    prefix: String,
}

impl PathStrip {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The request URI with the prefix removed from the path, or `None`
    /// when the path does not start with it. The prefix is removed at most
    /// once and the query string is preserved.
    fn rewritten_uri(&self, uri: &Uri) -> Option<Uri> {
        let stripped = uri.path().strip_prefix(self.prefix.as_str())?;
        let path = if stripped.is_empty() { "/" } else { stripped };

        let path_and_query = match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_owned(),
        };

        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(path_and_query.parse().ok()?);
        Uri::from_parts(parts).ok()
    }
}

/// Rewrite the request path, removing the configured prefix when present.
pub async fn strip_path_prefix(
    State(policy): State<Arc<PathStrip>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(rewritten) = policy.rewritten_uri(request.uri()) {
        *request.uri_mut() = rewritten;
    }

    next.run(request).await
}
