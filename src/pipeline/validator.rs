//! Envelope validation.
//!
//! A payout envelope must carry a hash or return memo binding it to the
//! external payout record, and exactly one payment operation.

use thiserror::Error;

use crate::ledger::transaction::{Memo, Operation, ParsedTransaction};

/// Reason a parsed envelope was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing or wrong memo type: expected hash or return memo, found {0}")]
    WrongMemoType(&'static str),

    #[error("wrong operation count: expected exactly one operation, found {0}")]
    WrongOperationCount(usize),

    #[error("wrong operation type: expected payment, found {0}")]
    WrongOperationType(&'static str),
}

/// Check the structural invariants of a payout transaction.
pub fn validate(tx: &ParsedTransaction) -> Result<(), ValidationError> {
    match tx.memo() {
        Memo::Hash(_) | Memo::Return(_) => {}
        other => return Err(ValidationError::WrongMemoType(other.kind())),
    }

    match tx.operations() {
        [Operation::Payment(_)] => Ok(()),
        [other] => Err(ValidationError::WrongOperationType(other.kind())),
        ops => Err(ValidationError::WrongOperationCount(ops.len())),
    }
}
