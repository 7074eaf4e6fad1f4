//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Batch driver / submission engine produce:
//!     → logging.rs (structured tracing events on stderr)
//!     → metrics.rs (counters, rendered to a Prometheus text file)
//! ```
//!
//! # Design Decisions
//! - stdout is reserved for preview lines
//! - Each run gets a UUID carried on the `batch` span
//! - Metrics are optional; without a recorder the counters are no-ops

pub mod logging;
pub mod metrics;
