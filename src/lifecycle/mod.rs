//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse flags → Load config → Validate → Build wallet → Open files → Run batch
//!
//! Cancellation (shutdown.rs, signals.rs):
//!     Ctrl-C → Shutdown::trigger → engine leaves its backoff wait → batch stops
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
