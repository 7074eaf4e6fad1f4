//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Envelope text (one input line)
//!     → codec.rs (base64 → canonical binary → ParsedTransaction)
//!     → wallet.rs (sign for a network, append one signature)
//!     → codec.rs (ParsedTransaction → envelope text)
//!     → client.rs (submit to the ledger's HTTP endpoint)
//! ```
//!
//! # Security Constraints
//! - Wallet secrets come from the command line or the environment, never the config file
//! - Secrets are never logged or serialized
//! - Signatures are bound to a network id so they cannot be replayed elsewhere

pub mod client;
pub mod codec;
pub mod network;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{HorizonClient, LedgerClient};
pub use codec::{EnvelopeCodec, TransactionCodec};
pub use network::Network;
pub use transaction::{Amount, Asset, DecoratedSignature, Memo, Operation, ParsedTransaction, Payment, SignedTransaction, Transaction};
pub use types::{DecodeError, EncodeError, NetworkError, Receipt, SigningError, WalletError};
pub use wallet::Wallet;
