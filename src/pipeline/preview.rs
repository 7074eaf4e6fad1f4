//! Human-readable one-line summary of a payout transaction.

use thiserror::Error;

use crate::ledger::transaction::{Memo, Operation, ParsedTransaction};

/// Transaction shapes that cannot be summarized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("cannot preview a transaction with a {0} memo")]
    UnsupportedMemo(&'static str),

    #[error("cannot preview a transaction whose first operation is not a payment")]
    NotAPayment,
}

/// Format the preview line for a validated payout.
///
/// ```text
/// Sending 10.0000000 native to GDEST with memo 0a0b… (1 signatures, 42 seqno)
/// ```
pub fn render(tx: &ParsedTransaction) -> Result<String, PreviewError> {
    let memo = match tx.memo() {
        Memo::Hash(hash) => format!("memo {}", hex::encode(hash)),
        Memo::Return(hash) => format!("return memo {}", hex::encode(hash)),
        other => return Err(PreviewError::UnsupportedMemo(other.kind())),
    };
    let Some(Operation::Payment(payment)) = tx.operations().first() else {
        return Err(PreviewError::NotAPayment);
    };

    Ok(format!(
        "Sending {} {} to {} with {} ({} signatures, {} seqno)",
        payment.amount,
        payment.asset,
        payment.destination,
        memo,
        tx.signatures().len(),
        tx.sequence_number()
    ))
}
