//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::config::args::ArgumentSet;

/// Root configuration for the admission gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The image-processing backend requests are forwarded to.
    pub backend: BackendConfig,

    /// Admission policy: allow-lists, path rewriting, status paths.
    pub policy: PolicyConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the image-processing service.
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9000".to_string(),
        }
    }
}

/// Admission policy configuration.
///
/// An empty allow-list disables its decorator entirely rather than denying
/// everything. The one exception is `allowed_hosts`: the `url`-parameter
/// validator is always installed, so with an empty host set every request
/// carrying a `url` parameter is rejected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hosts permitted in the `url` query parameter.
    pub allowed_hosts: ArgumentSet,

    /// Query parameter names permitted upstream. Empty allows everything.
    pub allowed_params: ArgumentSet,

    /// Actions (first path segment) permitted upstream. Empty allows
    /// everything.
    pub allowed_actions: ArgumentSet,

    /// Path prefix stripped from incoming requests. Must begin with `/`;
    /// empty disables stripping.
    pub strip_path: String,

    /// Paths (first segment, no leading slash) answered directly with
    /// `status_code`, without touching the backend.
    pub status_paths: ArgumentSet,

    /// Status code served for `status_paths`.
    #[serde(default = "default_status_code")]
    pub status_code: u16,
}

fn default_status_code() -> u16 {
    200
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: ArgumentSet::default(),
            allowed_params: ArgumentSet::default(),
            allowed_actions: ArgumentSet::default(),
            strip_path: String::new(),
            status_paths: ArgumentSet::default(),
            status_code: default_status_code(),
        }
    }
}

/// Rate limiting configuration.
///
/// The limiter is always active; it throttles by delaying requests, never by
/// rejecting them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket fill rate in tokens per second.
    pub fill_rate: f64,

    /// Bucket size (burst capacity).
    pub burst_size: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            fill_rate: 20.0,
            burst_size: 500,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Idle timeout for pooled upstream connections in seconds.
    pub upstream_idle_secs: u64,

    /// Maximum idle upstream connections kept per host.
    pub upstream_max_idle_per_host: usize,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 10,
            upstream_idle_secs: 300,
            upstream_max_idle_per_host: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.backend.url, "http://localhost:9000");
        assert_eq!(config.rate_limit.fill_rate, 20.0);
        assert_eq!(config.rate_limit.burst_size, 500);
        assert_eq!(config.policy.status_code, 200);
        assert!(config.policy.allowed_hosts.is_empty());
    }

    #[test]
    fn test_parse_minimal_config_file() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [backend]
            url = "http://imaginary.internal:9000"

            [policy]
            allowed_hosts = "cdn.example.com,static.example.com"
            allowed_params = ["url", "width", "height"]
            strip_path = "/img"
            status_paths = "health"

            [rate_limit]
            fill_rate = 5.0
            burst_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "http://imaginary.internal:9000");
        assert_eq!(config.policy.allowed_hosts.len(), 2);
        assert_eq!(config.policy.allowed_params.len(), 3);
        assert_eq!(config.policy.strip_path, "/img");
        assert_eq!(config.policy.status_code, 200);
        assert_eq!(config.rate_limit.burst_size, 10);
        // Untouched sections fall back to defaults.
        assert_eq!(config.timeouts.request_secs, 10);
    }
}
