//! Ledger error definitions and wire-level response types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while building a wallet from a secret.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No secret was supplied at all.
    #[error("wallet secret is required")]
    MissingSecret,

    /// The secret is not valid hex.
    #[error("wallet secret is not valid hex: {0}")]
    InvalidEncoding(#[from] hex::FromHexError),

    /// The secret decoded to the wrong number of bytes.
    #[error("wallet secret must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Errors raised while signing a transaction.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The canonical signing payload could not be produced.
    #[error("could not build signing payload: {0}")]
    Payload(#[source] bincode::Error),

    /// The wallet key already signed this transaction.
    #[error("transaction already carries a signature from {0}")]
    AlreadySigned(String),
}

/// Errors raised while decoding an envelope line.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The line is not valid base64.
    #[error("envelope is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The bytes do not form a valid envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] bincode::Error),
}

/// Errors raised while encoding an envelope.
#[derive(Debug, Error)]
#[error("could not encode envelope: {0}")]
pub struct EncodeError(#[source] pub bincode::Error);

/// Receipt returned by the ledger for an accepted transaction.
///
/// Both fields are best effort: any 2xx answer means the transaction landed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction hash as reported by the ledger.
    #[serde(default)]
    pub hash: Option<String>,
    /// Ledger sequence the transaction was included in, when reported.
    #[serde(default)]
    pub ledger: Option<u64>,
}

/// Problem document returned with non-success HTTP responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Problem {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub extras: ProblemExtras,
}

/// Extra structured data attached to a problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProblemExtras {
    /// Result codes keyed by category (`transaction`, `operations`, ...).
    #[serde(default, deserialize_with = "deserialize_result_codes")]
    pub result_codes: BTreeMap<String, String>,
}

impl Problem {
    /// Result code string recorded for a category, if any.
    pub fn result_code(&self, category: &str) -> Option<&str> {
        self.extras.result_codes.get(category).map(String::as_str)
    }
}

/// Accepts both `"code"` and `["code_a", "code_b"]`; arrays are joined with `,`.
fn deserialize_result_codes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    let mut codes = BTreeMap::new();
    for (category, value) in raw.unwrap_or_default() {
        let joined = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(","),
            _ => continue,
        };
        codes.insert(category, joined);
    }
    Ok(codes)
}

/// Error returned by a ledger network client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The endpoint answered with a non-success HTTP status.
    Http {
        status: u16,
        problem: Option<Problem>,
    },

    /// The request never produced an HTTP response.
    Transport(String),
}

impl NetworkError {
    /// HTTP status, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Http { status, .. } => Some(*status),
            NetworkError::Transport(_) => None,
        }
    }

    /// Result code string for a category, if the endpoint sent one.
    pub fn result_code(&self, category: &str) -> Option<&str> {
        match self {
            NetworkError::Http { problem: Some(problem), .. } => problem.result_code(category),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (status, problem) = match self {
            NetworkError::Transport(msg) => return write!(f, "transport error: {}", msg),
            NetworkError::Http { status, problem } => (status, problem),
        };
        write!(f, "ledger returned HTTP {}", status)?;
        if let Some(problem) = problem {
            if !problem.title.is_empty() {
                write!(f, ": {}", problem.title)?;
            }
            if !problem.extras.result_codes.is_empty() {
                let codes: Vec<String> = problem
                    .extras
                    .result_codes
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                write!(f, " ({})", codes.join("; "))?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for NetworkError {}
