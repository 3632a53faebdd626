//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags appended/overridden (main.rs)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → passed into the pipeline composer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the decorator chain built from it is
//!   fixed for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::ArgumentSet;
pub use loader::ConfigError;
pub use schema::GatewayConfig;
pub use schema::PolicyConfig;
pub use validation::{validate_config, ValidationError};
