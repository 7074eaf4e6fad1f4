//! Payout batch signer.
//!
//! Reads pre-built payout transactions from a file, checks that each one is a
//! single payment carrying a hash memo, signs it with one wallet, and either
//! writes it to an output file or submits it to the ledger with per-error
//! retry rules.
//!
//! # Architecture Overview
//!
//! ```text
//!   input file ──▶ pipeline::io ──▶ pipeline::driver ──▶ pipeline::io ──▶ output file
//!                                        │
//!                          decode ◀──────┤  ledger::codec
//!                          validate ◀────┤  pipeline::validator
//!                          preview ◀─────┤  pipeline::preview ──▶ stdout
//!                          sign ◀────────┤  ledger::wallet
//!                                        ▼
//!                               submission::engine ──▶ ledger::client ──▶ ledger
//!                                        │
//!                               resilience::policy (classify, back off)
//!
//!   Cross-cutting: config, observability (tracing + metrics), lifecycle (Ctrl-C)
//! ```

// Core subsystems
pub mod config;
pub mod ledger;
pub mod pipeline;
pub mod submission;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::SignerConfig;
pub use lifecycle::Shutdown;
pub use pipeline::BatchDriver;
