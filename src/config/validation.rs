//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backoffs > 0, attempt caps > 0)
//! - Check the endpoint URL and network passphrase
//! - Reject an output file that would overwrite the input
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SignerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::SignerConfig;
use crate::pipeline::RunMode;
use crate::resilience::{RetryAction, RetryCondition};

/// One semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("network.horizon_url: {0}")]
    InvalidUrl(String),

    #[error("network.passphrase must not be empty")]
    EmptyPassphrase,

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("retry rule #{index} has an empty name")]
    UnnamedRule { index: usize },

    #[error("retry rule '{name}' is defined more than once")]
    DuplicateRule { name: String },

    #[error("retry rule '{name}': {problem}")]
    InvalidRule { name: String, problem: String },

    #[error("batch.output_file must differ from batch.input_file")]
    OutputOverwritesInput,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &SignerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.batch.input_file == config.batch.output_file {
        errors.push(ValidationError::OutputOverwritesInput);
    }

    match Url::parse(&config.network.horizon_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::InvalidUrl(e.to_string())),
    }
    if config.network.passphrase.trim().is_empty() {
        errors.push(ValidationError::EmptyPassphrase);
    }
    if config.network.request_timeout_secs == 0 {
        errors.push(zero("network.request_timeout_secs"));
    }

    let retry = &config.retry;
    if retry.fallback_backoff_secs == 0 {
        errors.push(zero("retry.fallback_backoff_secs"));
    }
    if retry.max_attempts == Some(0) {
        errors.push(zero("retry.max_attempts"));
    }
    if retry.deadline_secs == Some(0) {
        errors.push(zero("retry.deadline_secs"));
    }

    let mut seen = HashSet::new();
    for (index, rule) in retry.rules.iter().enumerate() {
        if rule.name.trim().is_empty() {
            errors.push(ValidationError::UnnamedRule { index });
            continue;
        }
        if !seen.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRule { name: rule.name.clone() });
        }
        if let RetryCondition::ResultCode { category, contains } = &rule.when {
            if category.is_empty() || contains.is_empty() {
                errors.push(ValidationError::InvalidRule {
                    name: rule.name.clone(),
                    problem: "result_code needs a category and a non-empty code".to_string(),
                });
            }
        }
        if rule.then == RetryAction::RetryAfterSecs(0) {
            errors.push(ValidationError::InvalidRule {
                name: rule.name.clone(),
                problem: "retry_after_secs must be greater than zero".to_string(),
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn zero(field: &str) -> ValidationError {
    ValidationError::Zero {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::resilience::RetryRule;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&SignerConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = SignerConfig::default();
        config.network.horizon_url = "not a url".into();
        config.network.passphrase = "  ".into();
        config.network.request_timeout_secs = 0;
        config.retry.max_attempts = Some(0);
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ValidationError::InvalidUrl(_)));
        assert_eq!(errors[1], ValidationError::EmptyPassphrase);
        assert_eq!(errors[2], zero("network.request_timeout_secs"));
        assert_eq!(errors[3], zero("retry.max_attempts"));
        assert_eq!(errors[4], ValidationError::UnknownLogLevel("loud".into()));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = SignerConfig::default();
        config.network.horizon_url = "ftp://horizon.example".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidUrl("unsupported scheme 'ftp'".into())]);
    }

    #[test]
    fn test_output_must_not_overwrite_input() {
        let mut config = SignerConfig::default();
        config.batch.output_file = PathBuf::from("payouts_to_sign.txt");
        assert_eq!(validate_config(&config), Err(vec![ValidationError::OutputOverwritesInput]));

        for mode in [RunMode::Preview, RunMode::Submit] {
            config.batch.mode = mode;
            assert_eq!(validate_config(&config), Err(vec![ValidationError::OutputOverwritesInput]));
        }
    }

    #[test]
    fn test_rule_checks() {
        let mut config = SignerConfig::default();
        config.retry.rules = vec![
            RetryRule {
                name: "".into(),
                when: RetryCondition::Transport,
                then: RetryAction::Terminal,
                reason: None,
            },
            RetryRule {
                name: "timeout".into(),
                when: RetryCondition::Status(504),
                then: RetryAction::RetryAfterSecs(0),
                reason: None,
            },
            RetryRule {
                name: "timeout".into(),
                when: RetryCondition::ResultCode { category: "operations".into(), contains: "".into() },
                then: RetryAction::Terminal,
                reason: None,
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::UnnamedRule { index: 0 });
        assert!(matches!(&errors[1], ValidationError::InvalidRule { name, .. } if name == "timeout"));
        assert_eq!(errors[2], ValidationError::DuplicateRule { name: "timeout".into() });
        assert!(matches!(&errors[3], ValidationError::InvalidRule { name, .. } if name == "timeout"));
    }
}
