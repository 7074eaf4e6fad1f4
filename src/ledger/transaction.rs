//! Transaction model shared by the codec, the wallet and the submission engine.
//!
//! # Responsibilities
//! - Represent a decoded envelope (transaction body plus signatures)
//! - Provide read accessors used by validation and preview
//! - Pair a signed transaction with its encoded envelope for submission

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of stroops in one unit of an asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Fixed-point amount with seven decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = STROOPS_PER_UNIT as u64;
        write!(f, "{}{}.{:07}", sign, abs / unit, abs % unit)
    }
}

/// Asset being paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asset {
    /// The ledger's native asset.
    Native,
    /// An issued asset identified by code and issuing account.
    Credit { code: String, issuer: String },
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

/// Memo attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Memo {
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// Short name of the memo variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Memo::None => "none",
            Memo::Text(_) => "text",
            Memo::Id(_) => "id",
            Memo::Hash(_) => "hash",
            Memo::Return(_) => "return",
        }
    }
}

/// A payment from the source account to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub destination: String,
    pub asset: Asset,
    pub amount: Amount,
}

/// A single ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Payment(Payment),
    CreateAccount {
        destination: String,
        starting_balance: Amount,
    },
    AccountMerge {
        destination: String,
    },
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
}

impl Operation {
    /// Short name of the operation variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Payment(_) => "payment",
            Operation::CreateAccount { .. } => "create_account",
            Operation::AccountMerge { .. } => "account_merge",
            Operation::ManageData { .. } => "manage_data",
        }
    }
}

/// The signed portion of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source_account: String,
    pub fee: u32,
    pub sequence_number: i64,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

/// A signature together with the last four bytes of the signer's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl ParsedTransaction {
    /// Wrap an unsigned transaction body.
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }

    pub fn memo(&self) -> &Memo {
        &self.transaction.memo
    }

    pub fn operations(&self) -> &[Operation] {
        &self.transaction.operations
    }

    pub fn sequence_number(&self) -> i64 {
        self.transaction.sequence_number
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }
}

/// A signed transaction and the envelope text that is sent to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: ParsedTransaction,
    pub envelope: String,
}
