//! `url` query parameter validation.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::{form_urlencoded, Url};

use crate::config::ArgumentSet;
use crate::observability::metrics;

/// Upper bound on the `url` parameter; anything longer is rejected unparsed.
const MAX_TARGET_URL_LEN: usize = 2048;

/// Allow-set of upstream hosts the `url` parameter may point at.
///
/// This decorator is installed unconditionally: with an empty allow-set,
/// every request carrying a non-empty `url` parameter fails closed.
pub struct HostFilter {
    hosts: HashSet<String>,
    allowed: String,
}

impl HostFilter {
    pub fn new(allowed_hosts: &ArgumentSet) -> Self {
        Self {
            hosts: allowed_hosts.allow_set(),
            allowed: allowed_hosts.to_string(),
        }
    }

    /// A target is acceptable when it is a syntactically valid URL of at
    /// most [`MAX_TARGET_URL_LEN`] characters whose host is allow-listed.
    fn is_allowed_target(&self, raw: &str) -> bool {
        if raw.is_empty() || raw.len() > MAX_TARGET_URL_LEN {
            return false;
        }

        match Url::parse(raw) {
            Ok(target) => target
                .host_str()
                .is_some_and(|host| self.hosts.contains(host)),
            Err(_) => false,
        }
    }
}

/// Reject requests whose `url` query parameter points at a host that is not
/// allow-listed. Requests without the parameter, or with an empty one,
/// always pass.
pub async fn validate_url_param(
    State(policy): State<Arc<HostFilter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let target = request.uri().query().and_then(|query| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == "url")
            .map(|(_, value)| value.into_owned())
    });

    if let Some(target) = target {
        if !target.is_empty() && !policy.is_allowed_target(&target) {
            tracing::warn!(
                url = %target,
                allowed = %policy.allowed,
                "upstream target is not allow-listed"
            );
            metrics::record_rejected("host");
            return (StatusCode::NOT_ACCEPTABLE, "Unregistered upstream host").into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(hosts: &[&str]) -> HostFilter {
        HostFilter::new(&ArgumentSet::from_occurrences(hosts))
    }

    #[test]
    fn test_allow_listed_host_is_accepted() {
        let filter = filter(&["images.example.com"]);
        assert!(filter.is_allowed_target("https://images.example.com/a.jpg"));
        assert!(!filter.is_allowed_target("https://evil.example.com/a.jpg"));
    }

    #[test]
    fn test_unparsable_target_is_rejected() {
        let filter = filter(&["images.example.com"]);
        assert!(!filter.is_allowed_target("images.example.com/a.jpg")); // relative
        assert!(!filter.is_allowed_target("http://"));
        assert!(!filter.is_allowed_target(""));
    }

    #[test]
    fn test_oversized_target_is_rejected() {
        let filter = filter(&["images.example.com"]);
        let long = format!(
            "https://images.example.com/{}",
            "a".repeat(MAX_TARGET_URL_LEN)
        );
        assert!(!filter.is_allowed_target(&long));
    }

    #[test]
    fn test_empty_allow_set_fails_closed() {
        let filter = filter(&[]);
        assert!(!filter.is_allowed_target("https://images.example.com/a.jpg"));
    }

    #[test]
    fn test_empty_list_entries_never_match() {
        // A trailing comma in configuration must not open the door to
        // relative or hostless URLs.
        let filter = HostFilter::new(&ArgumentSet::from_occurrences(["images.example.com,"]));
        assert!(filter.is_allowed_target("https://images.example.com/a.jpg"));
        assert!(!filter.is_allowed_target("file:///etc/passwd"));
    }
}
