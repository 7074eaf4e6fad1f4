//! Batch driver.
//!
//! # Responsibilities
//! - Read envelopes one line at a time, in order
//! - Decode, validate, and either preview or sign each one
//! - Send signed envelopes to exactly one destination: the output file or the network
//! - Apply the failure policy to lines that are rejected locally
//!
//! One line is fully resolved, including all submission retries, before the
//! next line is read.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::ledger::codec::TransactionCodec;
use crate::ledger::transaction::{ParsedTransaction, SignedTransaction};
use crate::ledger::types::{DecodeError, EncodeError, SigningError};
use crate::ledger::wallet::Wallet;
use crate::lifecycle::shutdown::is_cancelled;
use crate::observability::metrics;
use crate::pipeline::io::{LineSink, LineSource};
use crate::pipeline::preview::{self, PreviewError};
use crate::pipeline::report::{BatchReport, LineOutcome};
use crate::pipeline::validator::{self, ValidationError};
use crate::submission::SubmissionEngine;

/// What the run does with each valid envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Print a preview line; do not sign.
    Preview,
    /// Sign and write to the output file.
    #[default]
    Sign,
    /// Sign and submit to the ledger.
    Submit,
}

/// How to treat a line that fails decoding, validation, or signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the batch at the first bad line.
    #[default]
    Abort,
    /// Record the line as skipped and continue.
    Skip,
}

/// Destination for signed envelopes.
pub enum Target<'a> {
    Preview,
    File,
    Network(&'a SubmissionEngine),
}

/// A line rejected before it reached its destination.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("could not decode envelope: {0}")]
    Decode(#[from] DecodeError),

    #[error("transaction validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not preview transaction: {0}")]
    Preview(#[from] PreviewError),

    #[error("could not sign transaction: {0}")]
    Signing(#[from] SigningError),

    #[error("could not encode signed transaction: {0}")]
    Encode(#[from] EncodeError),
}

/// Errors that stop a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read input line {line}: {source}")]
    Read { line: usize, source: io::Error },

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    #[error("line {line}: {source}")]
    Line { line: usize, source: LineError },

    #[error("batch cancelled at line {line}")]
    Cancelled { line: usize },
}

/// Sequential pipeline over a line source.
pub struct BatchDriver<'a> {
    codec: &'a dyn TransactionCodec,
    wallet: &'a Wallet,
    target: Target<'a>,
    on_invalid: FailurePolicy,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        codec: &'a dyn TransactionCodec,
        wallet: &'a Wallet,
        target: Target<'a>,
        on_invalid: FailurePolicy,
    ) -> Self {
        Self {
            codec,
            wallet,
            target,
            on_invalid,
        }
    }

    /// Process every line of `source`.
    ///
    /// The sink is flushed and synced before returning, also when the batch
    /// stops early.
    pub async fn run<S, K, W>(
        &self,
        source: &mut S,
        sink: &mut K,
        console: &mut W,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<BatchReport, BatchError>
    where
        S: LineSource,
        K: LineSink,
        W: Write,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", run_id = %run_id);

        let result = self
            .run_lines(run_id, source, sink, console, cancel)
            .instrument(span)
            .await;

        match (result, sink.finish().await) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(BatchError::Write(e)),
            (Err(e), finish) => {
                if let Err(flush_err) = finish {
                    tracing::error!(error = %flush_err, "Failed to flush output after batch error");
                }
                Err(e)
            }
        }
    }

    async fn run_lines<S, K, W>(
        &self,
        run_id: Uuid,
        source: &mut S,
        sink: &mut K,
        console: &mut W,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<BatchReport, BatchError>
    where
        S: LineSource,
        K: LineSink,
        W: Write,
    {
        let mut report = BatchReport::new(run_id);
        let mut line = 0usize;

        loop {
            let text = match source.next_line().await {
                Ok(Some(text)) => text,
                Ok(None) => break,
                Err(source) => return Err(BatchError::Read { line: line + 1, source }),
            };
            line += 1;

            if is_cancelled(cancel) {
                tracing::warn!(line, "Batch cancelled before line was processed");
                return Err(BatchError::Cancelled { line });
            }

            let envelope = text.trim();
            if envelope.is_empty() {
                tracing::warn!(line, "Skipping blank line");
                continue;
            }

            let outcome = match self.process(envelope, line, sink, console, cancel).await {
                Ok(outcome) => outcome,
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Rejected(e)) => match self.on_invalid {
                    FailurePolicy::Abort => {
                        tracing::error!(line, error = %e, "Rejected line, aborting batch");
                        metrics::record_line("rejected");
                        return Err(BatchError::Line { line, source: e });
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!(line, error = %e, "Rejected line, skipping");
                        metrics::record_line("skipped");
                        LineOutcome::Skipped(e)
                    }
                },
            };
            report.push(line, outcome);
        }

        tracing::info!(lines = report.lines.len(), summary = %report.summary(), "Batch complete");
        Ok(report)
    }

    async fn process<K, W>(
        &self,
        envelope: &str,
        line: usize,
        sink: &mut K,
        console: &mut W,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<LineOutcome, Failure>
    where
        K: LineSink,
        W: Write,
    {
        let tx = self.parse(envelope)?;

        match self.target {
            Target::Preview => {
                let rendered = preview::render(&tx).map_err(LineError::from)?;
                writeln!(console, "{}", rendered).map_err(|e| Failure::Fatal(BatchError::Write(e)))?;
                metrics::record_line("previewed");
                Ok(LineOutcome::Previewed)
            }
            Target::File => {
                let signed = self.sign(&tx, line)?;
                sink.write_line(&signed.envelope)
                    .await
                    .map_err(|e| Failure::Fatal(BatchError::Write(e)))?;
                metrics::record_line("written");
                Ok(LineOutcome::Written)
            }
            Target::Network(engine) => {
                let signed = self.sign(&tx, line)?;
                let outcome = engine
                    .submit(&signed, console, cancel)
                    .await
                    .map_err(|_| Failure::Fatal(BatchError::Cancelled { line }))?;
                match &outcome {
                    o if o.is_success() => tracing::info!(line, outcome = %o, "Submission finished"),
                    o => tracing::error!(line, outcome = %o, "Submission finished"),
                }
                metrics::record_line("submitted");
                Ok(LineOutcome::Submitted(outcome))
            }
        }
    }

    fn parse(&self, envelope: &str) -> Result<ParsedTransaction, LineError> {
        let tx = self.codec.decode(envelope)?;
        validator::validate(&tx)?;
        Ok(tx)
    }

    fn sign(&self, tx: &ParsedTransaction, line: usize) -> Result<SignedTransaction, LineError> {
        let signed = self.wallet.sign(tx)?;
        let envelope = self.codec.encode(&signed)?;
        tracing::debug!(line, signatures = signed.signatures().len(), "Transaction signed");
        Ok(SignedTransaction {
            transaction: signed,
            envelope,
        })
    }
}

enum Failure {
    Rejected(LineError),
    Fatal(BatchError),
}

impl From<LineError> for Failure {
    fn from(e: LineError) -> Self {
        Failure::Rejected(e)
    }
}
