//! Decorator chain assembly.
//!
//! # Responsibilities
//! - Select which decorators to install from the active configuration
//! - Compose them in a fixed, deliberate order around the forwarding handler
//! - Own the process-wide token bucket shared by all request tasks
//!
//! # Design Decisions
//! - Decorators governed by empty configuration are omitted entirely, not
//!   installed as permissive no-ops; the host validator is the exception
//!   and fails closed with an empty allow-set
//! - Composition happens once at startup and never changes at runtime

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;

use crate::config::GatewayConfig;
use crate::policy::actions::{self, ActionFilter};
use crate::policy::favicon;
use crate::policy::host_filter::{self, HostFilter};
use crate::policy::params::{self, ParamFilter};
use crate::policy::path_strip::{self, PathStrip};
use crate::policy::rate_limit;
use crate::policy::request_log;
use crate::policy::status_paths::{self, StatusPaths};
use crate::policy::token_bucket::TokenBucket;

/// Wrap `router` in the admission decorator chain.
///
/// Evaluated order, outermost first:
///
/// 1. host validation (the security-critical check runs before anything else)
/// 2. parameter allow-list
/// 3. action allow-list
/// 4. path stripping (rewrites the path for everything downstream)
/// 5. status paths and favicon (cheap answers that never touch the backend)
/// 6. request logging (measures true backend latency)
/// 7. rate limiting (throttling delay is charged only to admitted requests)
///
/// `Router::layer` makes the last-added layer outermost, so decorators are
/// added here innermost first.
pub fn install(router: Router, config: &GatewayConfig, bucket: Arc<TokenBucket>) -> Router {
    let policy = &config.policy;

    let mut router = router
        .layer(from_fn_with_state(bucket, rate_limit::throttle))
        .layer(from_fn(request_log::log_request))
        .layer(from_fn(favicon::suppress_favicon));

    if !policy.status_paths.is_empty() {
        let status = Arc::new(StatusPaths::new(&policy.status_paths, policy.status_code));
        router = router.layer(from_fn_with_state(status, status_paths::respond_with_status));
    }

    if !policy.strip_path.is_empty() {
        let strip = Arc::new(PathStrip::new(policy.strip_path.clone()));
        router = router.layer(from_fn_with_state(strip, path_strip::strip_path_prefix));
    }

    if !policy.allowed_actions.is_empty() {
        let filter = Arc::new(ActionFilter::new(&policy.allowed_actions));
        router = router.layer(from_fn_with_state(filter, actions::enforce_allowed_actions));
    }

    if !policy.allowed_params.is_empty() {
        let filter = Arc::new(ParamFilter::new(&policy.allowed_params));
        router = router.layer(from_fn_with_state(filter, params::enforce_allowed_params));
    }

    // Installed even with an empty allow-set: `url`-parameter requests then
    // fail closed.
    let filter = Arc::new(HostFilter::new(&policy.allowed_hosts));
    router.layer(from_fn_with_state(filter, host_filter::validate_url_param))
}
