//! Configuration schema definitions.
//!
//! Every field has a default, so an absent or empty config file yields a
//! working signer for the public network. The wallet secret is deliberately
//! absent here; it only comes from the command line or the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ledger::network::{Network, PUBLIC_NETWORK_PASSPHRASE};
use crate::pipeline::{FailurePolicy, RunMode};
use crate::resilience::policy::{default_rules, DEFAULT_FALLBACK_BACKOFF_SECS};
use crate::resilience::{RetryLimits, RetryPolicy, RetryRule};

/// Root configuration for the signer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignerConfig {
    /// Input/output files and run mode.
    pub batch: BatchConfig,

    /// Ledger endpoint and network identity.
    pub network: NetworkConfig,

    /// Submission retry table and limits.
    pub retry: RetryConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Batch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File of unsigned envelopes, one per line.
    pub input_file: PathBuf,

    /// File that receives signed envelopes in sign mode.
    pub output_file: PathBuf,

    pub mode: RunMode,

    /// Handling of lines that fail decoding, validation, or signing.
    pub on_invalid: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("payouts_to_sign.txt"),
            output_file: PathBuf::from("payouts_signed.txt"),
            mode: RunMode::default(),
            on_invalid: FailurePolicy::default(),
        }
    }
}

/// Ledger network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL of the Horizon-style endpoint.
    pub horizon_url: String,

    /// Network passphrase that signatures are bound to.
    pub passphrase: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon.stellar.org".to_string(),
            passphrase: PUBLIC_NETWORK_PASSPHRASE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl NetworkConfig {
    pub fn network(&self) -> Network {
        Network::new(&self.passphrase)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Backoff for errors no rule matches.
    pub fallback_backoff_secs: u64,

    /// Stop after this many attempts per transaction. Unbounded when absent.
    pub max_attempts: Option<u32>,

    /// Stop when the next retry would start later than this. Unbounded when absent.
    pub deadline_secs: Option<u64>,

    /// Classification table, checked in order. Replaces the built-in table when set.
    pub rules: Vec<RetryRule>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            fallback_backoff_secs: DEFAULT_FALLBACK_BACKOFF_SECS,
            max_attempts: None,
            deadline_secs: None,
            rules: default_rules(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.rules.clone(), Duration::from_secs(self.fallback_backoff_secs))
    }

    pub fn limits(&self) -> RetryLimits {
        RetryLimits {
            max_attempts: self.max_attempts,
            deadline: self.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level for this crate; `RUST_LOG` overrides it.
    pub log_level: String,

    /// Write Prometheus text exposition here at the end of the run.
    pub metrics_file: Option<PathBuf>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_file: None,
        }
    }
}
