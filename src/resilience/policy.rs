//! Submission error classification.
//!
//! The table is an ordered list of rules; the first rule whose condition
//! matches a [`NetworkError`] decides the action. Errors no rule matches are
//! retried after the fallback backoff.
//!
//! # Default Table
//! ```text
//! HTTP 504                                  → retry after 15s
//! HTTP 404                                  → terminal (account does not exist)
//! operations code ∋ "tx_insufficient_fee"   → retry after 30s
//! operations code ∋ "op_no_destination"     → terminal (destination does not exist)
//! anything else                             → retry after 60s
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ledger::types::NetworkError;

/// Backoff applied when no rule matches.
pub const DEFAULT_FALLBACK_BACKOFF_SECS: u64 = 60;

/// Condition a rule matches against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryCondition {
    /// The endpoint answered with this HTTP status.
    Status(u16),
    /// The result code string for `category` contains `contains`.
    ResultCode { category: String, contains: String },
    /// No HTTP response was received.
    Transport,
}

impl RetryCondition {
    pub fn matches(&self, err: &NetworkError) -> bool {
        match self {
            RetryCondition::Status(status) => err.status() == Some(*status),
            RetryCondition::ResultCode { category, contains } => err
                .result_code(category)
                .is_some_and(|code| code.contains(contains.as_str())),
            RetryCondition::Transport => matches!(err, NetworkError::Transport(_)),
        }
    }
}

/// What to do when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    RetryAfterSecs(u64),
    Terminal,
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryRule {
    pub name: String,
    pub when: RetryCondition,
    pub then: RetryAction,
    /// Operator-facing explanation logged when the rule fires.
    #[serde(default)]
    pub reason: Option<String>,
}

impl RetryRule {
    fn new(name: &str, when: RetryCondition, then: RetryAction, reason: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            when,
            then,
            reason: reason.map(str::to_string),
        }
    }
}

/// The built-in classification table.
pub fn default_rules() -> Vec<RetryRule> {
    let operations = |code: &str| RetryCondition::ResultCode {
        category: "operations".to_string(),
        contains: code.to_string(),
    };
    vec![
        RetryRule::new(
            "gateway_timeout",
            RetryCondition::Status(504),
            RetryAction::RetryAfterSecs(15),
            Some("ledger gateway timeout"),
        ),
        RetryRule::new(
            "account_missing",
            RetryCondition::Status(404),
            RetryAction::Terminal,
            Some("account does not exist"),
        ),
        RetryRule::new(
            "insufficient_fee",
            operations("tx_insufficient_fee"),
            RetryAction::RetryAfterSecs(30),
            Some("transaction fee too low for current network load"),
        ),
        RetryRule::new(
            "no_destination",
            operations("op_no_destination"),
            RetryAction::Terminal,
            Some("destination account does not exist"),
        ),
    ]
}

/// Decision for one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Retry { rule: String, reason: String, backoff: Duration },
    Terminal { rule: String, reason: String },
}

/// Ordered classification table plus fallback backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    rules: Vec<RetryRule>,
    fallback_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(default_rules(), Duration::from_secs(DEFAULT_FALLBACK_BACKOFF_SECS))
    }
}

impl RetryPolicy {
    pub fn new(rules: Vec<RetryRule>, fallback_backoff: Duration) -> Self {
        Self {
            rules,
            fallback_backoff,
        }
    }

    pub fn rules(&self) -> &[RetryRule] {
        &self.rules
    }

    /// Classify a failed attempt.
    pub fn classify(&self, err: &NetworkError) -> Verdict {
        let Some(rule) = self.rules.iter().find(|rule| rule.when.matches(err)) else {
            return Verdict::Retry {
                rule: "fallback".to_string(),
                reason: err.to_string(),
                backoff: self.fallback_backoff,
            };
        };

        let reason = match &rule.reason {
            Some(reason) => format!("{}: {}", reason, err),
            None => err.to_string(),
        };
        match rule.then {
            RetryAction::RetryAfterSecs(secs) => Verdict::Retry {
                rule: rule.name.clone(),
                reason,
                backoff: Duration::from_secs(secs),
            },
            RetryAction::Terminal => Verdict::Terminal {
                rule: rule.name.clone(),
                reason,
            },
        }
    }
}
