//! Submission retry state machine.
//!
//! # States
//! ```text
//! Submitting → Succeeded                 (no error)
//! Submitting → TerminallyFailed          (terminal rule, or a retry limit reached)
//! Submitting → RetryWait → Submitting    (retryable rule, after its backoff)
//! ```
//!
//! The loop has no built-in attempt cap; [`RetryLimits`] adds one when
//! configured. The cancellation signal is checked before every attempt and
//! raced against every in-flight request and backoff wait.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::ledger::client::LedgerClient;
use crate::ledger::transaction::SignedTransaction;
use crate::lifecycle::shutdown::{cancelled, is_cancelled};
use crate::observability::metrics;
use crate::pipeline::preview;
use crate::resilience::{RetryLimits, RetryPolicy, Verdict};
use crate::submission::outcome::{Cancelled, SubmissionOutcome, TerminalOutcome};

/// Drives one signed transaction at a time to a terminal outcome.
pub struct SubmissionEngine {
    client: Arc<dyn LedgerClient>,
    policy: RetryPolicy,
    limits: RetryLimits,
}

impl SubmissionEngine {
    pub fn new(client: Arc<dyn LedgerClient>, policy: RetryPolicy, limits: RetryLimits) -> Self {
        Self {
            client,
            policy,
            limits,
        }
    }

    /// Submit `tx` until it succeeds or fails terminally.
    ///
    /// The preview line is written to `console` before every attempt.
    pub async fn submit<W: Write>(
        &self,
        tx: &SignedTransaction,
        console: &mut W,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<TerminalOutcome, Cancelled> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if is_cancelled(cancel) {
                return Err(Cancelled { attempts });
            }

            announce(tx, console);
            attempts += 1;

            let outcome = tokio::select! {
                outcome = self.attempt(tx) => outcome,
                _ = cancelled(cancel) => {
                    tracing::warn!(attempts, "Submission cancelled while awaiting the ledger");
                    return Err(Cancelled { attempts });
                }
            };

            match outcome {
                SubmissionOutcome::Success(receipt) => {
                    tracing::info!(hash = ?receipt.hash, ledger = ?receipt.ledger, attempts, "Transaction accepted");
                    metrics::record_submission("succeeded");
                    return Ok(TerminalOutcome::Succeeded { receipt, attempts });
                }
                SubmissionOutcome::TerminalFailure { reason } => {
                    tracing::error!(%reason, attempts, "Transaction failed permanently");
                    metrics::record_submission("failed");
                    return Ok(TerminalOutcome::TerminallyFailed { reason, attempts });
                }
                SubmissionOutcome::RetryableFailure { reason, backoff } => {
                    if let Some(limit) = self.limits.exhausted(attempts, started.elapsed(), backoff) {
                        tracing::error!(%reason, %limit, attempts, "Giving up on transaction");
                        metrics::record_submission("abandoned");
                        return Ok(TerminalOutcome::TerminallyFailed {
                            reason: format!("{}; last error: {}", limit, reason),
                            attempts,
                        });
                    }

                    tracing::warn!(
                        %reason,
                        attempt = attempts,
                        retry_in_secs = backoff.as_secs(),
                        "Submission failed, retrying"
                    );
                    metrics::record_backoff(backoff);

                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = cancelled(cancel) => {
                            tracing::warn!(attempts, "Retry wait cancelled");
                            return Err(Cancelled { attempts });
                        }
                    }
                }
            }
        }
    }

    /// Make one attempt and classify its result.
    pub async fn attempt(&self, tx: &SignedTransaction) -> SubmissionOutcome {
        let err = match self.client.submit_transaction(tx).await {
            Ok(receipt) => {
                metrics::record_attempt("success");
                return SubmissionOutcome::Success(receipt);
            }
            Err(err) => err,
        };

        match self.policy.classify(&err) {
            Verdict::Retry { rule, reason, backoff } => {
                tracing::debug!(%rule, error = %err, "Attempt classified as retryable");
                metrics::record_attempt(&rule);
                SubmissionOutcome::RetryableFailure { reason, backoff }
            }
            Verdict::Terminal { rule, reason } => {
                tracing::debug!(%rule, error = %err, "Attempt classified as terminal");
                metrics::record_attempt(&rule);
                SubmissionOutcome::TerminalFailure { reason }
            }
        }
    }
}

fn announce<W: Write>(tx: &SignedTransaction, console: &mut W) {
    match preview::render(&tx.transaction) {
        Ok(line) => {
            if let Err(e) = writeln!(console, "{}", line) {
                tracing::warn!(error = %e, "Failed to write preview line");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Cannot preview transaction"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::ledger::transaction::{Amount, Asset, Memo, Operation, ParsedTransaction, Payment, Transaction};
    use crate::ledger::types::{NetworkError, Problem, Receipt};
    use crate::lifecycle::Shutdown;

    /// Replays a script of responses; the last one repeats forever.
    struct ScriptedClient {
        script: Mutex<VecDeque<Result<Receipt, NetworkError>>>,
        calls: AtomicU32,
        trigger_on_call: Option<Shutdown>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<Receipt, NetworkError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                trigger_on_call: None,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedClient {
        async fn submit_transaction(&self, _tx: &SignedTransaction) -> Result<Receipt, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(shutdown) = &self.trigger_on_call {
                shutdown.trigger();
            }
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    fn ok() -> Result<Receipt, NetworkError> {
        Ok(Receipt { hash: Some("abc123".into()), ledger: Some(7) })
    }

    fn status(code: u16) -> Result<Receipt, NetworkError> {
        Err(NetworkError::Http { status: code, problem: None })
    }

    fn op_code(code: &str) -> Result<Receipt, NetworkError> {
        let mut problem = Problem::default();
        problem.extras.result_codes.insert("operations".into(), code.into());
        Err(NetworkError::Http { status: 400, problem: Some(problem) })
    }

    fn signed() -> SignedTransaction {
        let mut tx = ParsedTransaction::new(Transaction {
            source_account: "GSOURCE".into(),
            fee: 100,
            sequence_number: 99,
            memo: Memo::Hash([0x11; 32]),
            operations: vec![Operation::Payment(Payment {
                destination: "GDEST".into(),
                asset: Asset::Native,
                amount: Amount::from_stroops(10_000_000),
            })],
        });
        tx.signatures.push(crate::ledger::DecoratedSignature { hint: [0; 4], signature: vec![0; 64] });
        SignedTransaction { transaction: tx, envelope: "ENVELOPE".into() }
    }

    fn engine(client: Arc<ScriptedClient>, limits: RetryLimits) -> SubmissionEngine {
        SubmissionEngine::new(client, RetryPolicy::default(), limits)
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_timeout_then_success() {
        let client = ScriptedClient::new(vec![status(504), ok()]);
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();
        let mut console = Vec::new();

        let started = Instant::now();
        let outcome = engine.submit(&signed(), &mut console, &mut cancel).await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(client.calls(), 2);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(15) && waited < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_destination_is_terminal_without_wait() {
        let client = ScriptedClient::new(vec![op_code("op_no_destination")]);
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let started = Instant::now();
        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();

        assert!(matches!(outcome, TerminalOutcome::TerminallyFailed { attempts: 1, .. }));
        assert_eq!(client.calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insufficient_fee_three_times_then_success() {
        let client = ScriptedClient::new(vec![
            op_code("tx_insufficient_fee"),
            op_code("tx_insufficient_fee"),
            op_code("tx_insufficient_fee"),
            ok(),
        ]);
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let started = Instant::now();
        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();

        assert_eq!(outcome.attempts(), 4);
        assert_eq!(client.calls(), 4);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(90) && waited < Duration::from_secs(91));
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_missing_is_terminal() {
        let client = ScriptedClient::new(vec![status(404)]);
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();
        match outcome {
            TerminalOutcome::TerminallyFailed { reason, attempts } => {
                assert_eq!(attempts, 1);
                assert!(reason.contains("account does not exist"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_error_waits_sixty_seconds() {
        let client = ScriptedClient::new(vec![
            Err(NetworkError::Transport("connection reset".into())),
            ok(),
        ]);
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let started = Instant::now();
        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();
        assert!(outcome.is_success());
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_written_before_every_attempt() {
        let client = ScriptedClient::new(vec![status(504), status(504), ok()]);
        let engine = engine(client, RetryLimits::unbounded());
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();
        let mut console = Vec::new();

        engine.submit(&signed(), &mut console, &mut cancel).await.unwrap();

        let output = String::from_utf8(console).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.starts_with("Sending 1.0000000 native to GDEST")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_turns_into_terminal_failure() {
        let client = ScriptedClient::new(vec![status(504)]);
        let limits = RetryLimits { max_attempts: Some(2), deadline: None };
        let engine = engine(client.clone(), limits);
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();
        match outcome {
            TerminalOutcome::TerminallyFailed { reason, attempts } => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("retry limit reached"));
                assert!(reason.contains("HTTP 504"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_retrying() {
        let client = ScriptedClient::new(vec![status(504)]);
        let limits = RetryLimits { max_attempts: None, deadline: Some(Duration::from_secs(40)) };
        let engine = engine(client.clone(), limits);
        let shutdown = Shutdown::new();
        let mut cancel = shutdown.subscribe();

        let outcome = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap();
        // Waits at 0s and 15s fit; a third wait would end at 45s.
        assert_eq!(outcome.attempts(), 3);
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let shutdown = Shutdown::new();
        let client = Arc::new(ScriptedClient {
            script: Mutex::new(vec![status(504)].into()),
            calls: AtomicU32::new(0),
            trigger_on_call: Some(shutdown.clone()),
        });
        let engine = engine(client.clone(), RetryLimits::unbounded());
        let mut cancel = shutdown.subscribe();

        let started = Instant::now();
        let err = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap_err();

        assert_eq!(err, Cancelled { attempts: 1 });
        assert_eq!(client.calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(15));
    }

    /// Never answers; fires the shutdown once the request is in flight.
    struct StalledClient {
        shutdown: Shutdown,
    }

    #[async_trait]
    impl LedgerClient for StalledClient {
        async fn submit_transaction(&self, _tx: &SignedTransaction) -> Result<Receipt, NetworkError> {
            self.shutdown.trigger();
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_in_flight_request() {
        let shutdown = Shutdown::new();
        let client = Arc::new(StalledClient { shutdown: shutdown.clone() });
        let engine = SubmissionEngine::new(client, RetryPolicy::default(), RetryLimits::unbounded());
        let mut cancel = shutdown.subscribe();

        let err = engine.submit(&signed(), &mut Vec::new(), &mut cancel).await.unwrap_err();
        assert_eq!(err, Cancelled { attempts: 1 });
    }
}
