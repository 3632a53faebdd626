//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the backend URL before the process starts serving
//! - Validate value ranges (rate > 0, burst >= 1, status code valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bind address {address:?} is invalid: {reason}")]
    BindAddress { address: String, reason: String },

    #[error("backend url {url:?} is invalid: {reason}")]
    BackendUrl { url: String, reason: String },

    #[error("backend url scheme {0:?} is unsupported, only \"http\" is")]
    BackendScheme(String),

    #[error("backend url {0:?} has no host")]
    BackendHost(String),

    #[error("strip_path {0:?} must begin with '/'")]
    StripPath(String),

    #[error("status_code {0} is not a valid HTTP status code")]
    StatusCode(u16),

    #[error("rate limiter fill_rate must be a positive number, got {0}")]
    FillRate(f64),

    #[error("rate limiter burst_size must be at least 1")]
    BurstSize,
}

/// Check a configuration for semantic errors, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(error) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::BindAddress {
            address: config.listener.bind_address.clone(),
            reason: error.to_string(),
        });
    }

    match Url::parse(&config.backend.url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::BackendScheme(url.scheme().to_string()));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::BackendHost(config.backend.url.clone()));
            }
        }
        Err(error) => errors.push(ValidationError::BackendUrl {
            url: config.backend.url.clone(),
            reason: error.to_string(),
        }),
    }

    if !config.policy.strip_path.is_empty() && !config.policy.strip_path.starts_with('/') {
        errors.push(ValidationError::StripPath(config.policy.strip_path.clone()));
    }

    if StatusCode::from_u16(config.policy.status_code).is_err() {
        errors.push(ValidationError::StatusCode(config.policy.status_code));
    }

    if !(config.rate_limit.fill_rate.is_finite() && config.rate_limit.fill_rate > 0.0) {
        errors.push(ValidationError::FillRate(config.rate_limit.fill_rate));
    }

    if config.rate_limit.burst_size == 0 {
        errors.push(ValidationError::BurstSize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
