//! Submission subsystem.
//!
//! # Data Flow
//! ```text
//! SignedTransaction
//!     → engine.rs (preview, attempt, classify via resilience::policy)
//!     → RetryWait (fixed backoff, cancellable) → attempt again
//!     → TerminalOutcome (Succeeded | TerminallyFailed)
//! ```

pub mod engine;
pub mod outcome;

pub use engine::SubmissionEngine;
pub use outcome::{Cancelled, SubmissionOutcome, TerminalOutcome};
