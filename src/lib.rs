//! Admission gateway for an image-processing backend.
//!
//! A reverse proxy that enforces request admission policy before any
//! traffic reaches the backend. Policy is a chain of independent
//! decorators composed in a fixed order around the forwarding handler:
//!
//! ```text
//!                ┌──────────────────────────────────────────────────┐
//!                │                  ADMISSION GATEWAY               │
//!                │                                                  │
//! Client ────────┼─▶ host filter ─▶ param filter ─▶ action filter   │
//!                │        │              │               │          │
//!                │       406            406             406         │
//!                │                                                  │
//!                │   ─▶ path strip ─▶ status paths / favicon        │
//!                │                        │                         │
//!                │                   200 / 404                      │
//!                │                                                  │
//!                │   ─▶ request log ─▶ rate limit ─▶ forward ───────┼──▶ Backend
//!                │                     (delays,                     │
//!                │                      never rejects)              │
//!                └──────────────────────────────────────────────────┘
//! ```
//!
//! Decorators whose configuration is empty are left out of the chain
//! entirely; the host filter is the deliberate exception and fails closed.

pub mod config;
pub mod http;
pub mod observability;
pub mod policy;

pub use config::{ArgumentSet, ConfigError, GatewayConfig};
pub use http::HttpServer;
pub use policy::TokenBucket;
