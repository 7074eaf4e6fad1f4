//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → command-line overrides (main.rs), validated again
//!     → SignerConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the batch starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets never live in the config file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BatchConfig, NetworkConfig, ObservabilityConfig, RetryConfig, SignerConfig};
