//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed submission attempt:
//!     → policy.rs (classify error: retry with backoff, or terminal)
//!     → retries.rs (would another attempt cross max_attempts / deadline?)
//!     → submission engine waits, retries, or stops
//! ```
//!
//! # Design Decisions
//! - Classification is a data table, configurable from TOML
//! - Backoff is fixed per error category, not exponential
//! - Only content-based rules make an error terminal; limits are opt-in

pub mod policy;
pub mod retries;

pub use policy::{RetryAction, RetryCondition, RetryPolicy, RetryRule, Verdict};
pub use retries::RetryLimits;
