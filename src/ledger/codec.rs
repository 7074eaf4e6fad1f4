//! Envelope text codec.
//!
//! An envelope line is standard base64 over the canonical binary form of a
//! [`ParsedTransaction`]. The canonical form is bincode with fixed-width
//! integers, a size limit, and no trailing bytes, so the same transaction
//! always maps to the same bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bincode::Options;
use serde::Serialize;

use crate::ledger::transaction::ParsedTransaction;
use crate::ledger::types::{DecodeError, EncodeError};

/// Upper bound on a decoded envelope.
pub const MAX_ENVELOPE_BYTES: u64 = 64 * 1024;

/// Converts between envelope text and [`ParsedTransaction`].
pub trait TransactionCodec: Send + Sync {
    fn decode(&self, text: &str) -> Result<ParsedTransaction, DecodeError>;
    fn encode(&self, tx: &ParsedTransaction) -> Result<String, EncodeError>;
}

/// The codec used by this tool's envelope files.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec;

impl TransactionCodec for EnvelopeCodec {
    fn decode(&self, text: &str) -> Result<ParsedTransaction, DecodeError> {
        let bytes = STANDARD.decode(text.trim())?;
        canonical()
            .deserialize(&bytes)
            .map_err(DecodeError::Malformed)
    }

    fn encode(&self, tx: &ParsedTransaction) -> Result<String, EncodeError> {
        let bytes = to_canonical_bytes(tx).map_err(EncodeError)?;
        Ok(STANDARD.encode(bytes))
    }
}

/// Canonical binary form of any ledger value.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, bincode::Error> {
    canonical().serialize(value)
}

fn canonical() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_ENVELOPE_BYTES)
        .reject_trailing_bytes()
}
