//! Ledger network client.
//!
//! # Responsibilities
//! - Submit signed envelopes to a Horizon-style HTTP endpoint
//! - Translate HTTP statuses and problem documents into [`NetworkError`]
//! - Bound every request with the configured timeout
//!
//! Retrying is not done here; the submission engine decides what to do with
//! each error.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::ledger::transaction::SignedTransaction;
use crate::ledger::types::{NetworkError, Problem, Receipt};

/// Submits signed transactions to a ledger network.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<Receipt, NetworkError>;
}

/// HTTP client for the `/transactions` endpoint.
#[derive(Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    submit_url: Url,
}

impl HorizonClient {
    /// Create a client for the server rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let mut base: Url = base_url.parse().map_err(|e| {
            NetworkError::Transport(format!("Invalid ledger URL '{}': {}", base_url, e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let submit_url = base
            .join("transactions")
            .map_err(|e| NetworkError::Transport(format!("Invalid ledger URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("payout-signer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        tracing::debug!(url = %submit_url, timeout_secs = timeout.as_secs(), "Ledger client initialized");

        Ok(Self { http, submit_url })
    }

    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<Receipt, NetworkError> {
        let response = self
            .http
            .post(self.submit_url.clone())
            .form(&[("tx", tx.envelope.as_str())])
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        if !status.is_success() {
            let problem = serde_json::from_str::<Problem>(&body).ok();
            return Err(NetworkError::Http {
                status: status.as_u16(),
                problem,
            });
        }

        match serde_json::from_str::<Receipt>(&body) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "Accepted without a readable receipt");
                Ok(Receipt::default())
            }
        }
    }
}

impl std::fmt::Debug for HorizonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonClient")
            .field("submit_url", &self.submit_url.as_str())
            .finish()
    }
}
