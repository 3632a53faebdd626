//! Admission policy subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → host_filter.rs (validate the `url` query parameter)
//!     → params.rs (query parameter allow-list)
//!     → actions.rs (action allow-list)
//!     → path_strip.rs (remove configured prefix)
//!     → status_paths.rs / favicon.rs (answer probes directly)
//!     → request_log.rs (start/end events around everything below)
//!     → rate_limit.rs (token bucket delay)
//!     → Pass to the forwarding handler
//! ```
//!
//! # Design Decisions
//! - Every decorator is an axum middleware fn wrapping the rest of the
//!   chain; it either passes the request on unchanged (path stripping
//!   excepted) or answers it directly without invoking the chain below
//! - Decorators are stateless beyond configuration captured at startup;
//!   the token bucket is the single piece of shared mutable state
//! - Rejections carry terse bodies; the offending value and the configured
//!   allow-list go to the server log only

pub mod actions;
pub mod favicon;
pub mod host_filter;
pub mod params;
pub mod path_strip;
pub mod pipeline;
pub mod rate_limit;
pub mod request_log;
pub mod status_paths;
pub mod token_bucket;

pub use token_bucket::TokenBucket;

/// First path segment, without the leading slash: the "action" of a request.
pub(crate) fn first_segment(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.find('/') {
        Some(end) => &path[..end],
        None => path,
    }
}
