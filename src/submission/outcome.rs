//! Submission results.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::ledger::types::Receipt;

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success(Receipt),
    RetryableFailure { reason: String, backoff: Duration },
    TerminalFailure { reason: String },
}

/// Final state of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    Succeeded { receipt: Receipt, attempts: u32 },
    TerminallyFailed { reason: String, attempts: u32 },
}

impl TerminalOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            TerminalOutcome::Succeeded { attempts, .. } => *attempts,
            TerminalOutcome::TerminallyFailed { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TerminalOutcome::Succeeded { .. })
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalOutcome::Succeeded { receipt, attempts } => match &receipt.hash {
                Some(hash) => write!(f, "succeeded with hash {} after {} attempt(s)", hash, attempts),
                None => write!(f, "succeeded after {} attempt(s)", attempts),
            },
            TerminalOutcome::TerminallyFailed { reason, attempts } => {
                write!(f, "failed after {} attempt(s): {}", attempts, reason)
            }
        }
    }
}

/// The wait before a retry was interrupted by the cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("submission cancelled after {attempts} attempt(s)")]
pub struct Cancelled {
    pub attempts: u32,
}
