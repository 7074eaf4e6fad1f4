//! Batch pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! io.rs (input file, one envelope per line)
//!     → driver.rs (decode → validator.rs → preview.rs | sign)
//!     → io.rs (output file) or submission engine (network)
//!     → report.rs (per-line outcome, summary)
//! ```

pub mod driver;
pub mod io;
pub mod preview;
pub mod report;
pub mod validator;

pub use driver::{BatchDriver, BatchError, FailurePolicy, LineError, RunMode, Target};
pub use io::{open_batch_files, FileLineSink, FileLineSource, LineSink, LineSource, OpenError};
pub use report::{BatchReport, BatchSummary, LineOutcome, LineReport};
