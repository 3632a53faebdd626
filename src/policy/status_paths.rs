//! Fixed-status responses for well-known paths.

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
use crate::policy::first_segment;

/// Paths answered directly with a configured status code, without touching
/// the backend. Used for health checks and other probes.
///
/// Only installed when the configured set is non-empty.
pub struct StatusPaths {
    paths: HashSet<String>,
    status: StatusCode,
}

impl StatusPaths {
    pub fn new(status_paths: &ArgumentSet, status_code: u16) -> Self {
        Self {
            paths: status_paths.allow_set(),
            status: StatusCode::from_u16(status_code).unwrap_or(StatusCode::OK),
        }
    }

    /// The configured status when the request's first path segment matches.
    fn matched(&self, path: &str) -> Option<StatusCode> {
        let segment = first_segment(path);
        (!segment.is_empty() && self.paths.contains(segment)).then_some(self.status)
    }
}

/// Answer matching paths directly; everything else passes through untouched.
pub async fn respond_with_status(
    State(policy): State<Arc<StatusPaths>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(status) = policy.matched(request.uri().path()) {
        return status.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_path_gets_configured_status() {
        let policy = StatusPaths::new(&ArgumentSet::from_occurrences(["health,ready"]), 200);

        assert_eq!(policy.matched("/health"), Some(StatusCode::OK));
        assert_eq!(policy.matched("/ready"), Some(StatusCode::OK));
        assert_eq!(policy.matched("/health/live"), Some(StatusCode::OK));
        assert_eq!(policy.matched("/resize"), None);
    }

    #[test]
    fn test_root_path_never_matches() {
        // Even a stray empty entry in the configuration must not turn `/`
        // into a status path.
        let policy = StatusPaths::new(&ArgumentSet::from_occurrences(["health,"]), 204);
        assert_eq!(policy.matched("/"), None);
    }

    #[test]
    fn test_custom_status_code() {
        let policy = StatusPaths::new(&ArgumentSet::from_occurrences(["teapot"]), 418);
        assert_eq!(policy.matched("/teapot"), Some(StatusCode::IM_A_TEAPOT));
    }
}
