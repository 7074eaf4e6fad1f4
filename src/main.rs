use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use payout_signer::config::validation::validate_config;
use payout_signer::config::{load_config, ConfigError, SignerConfig};
use payout_signer::ledger::network::TEST_NETWORK_PASSPHRASE;
use payout_signer::ledger::{EnvelopeCodec, HorizonClient, Wallet};
use payout_signer::lifecycle::signals::spawn_ctrl_c_handler;
use payout_signer::lifecycle::Shutdown;
use payout_signer::observability::logging::init_logging;
use payout_signer::observability::metrics;
use payout_signer::pipeline::{open_batch_files, BatchDriver, BatchSummary, FailurePolicy, RunMode, Target};
use payout_signer::submission::SubmissionEngine;

const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";

#[derive(Parser, Debug)]
#[command(name = "payout-signer", version)]
#[command(about = "Sign payout transactions and write or submit them", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, env = "PAYOUT_SIGNER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// File with transactions to sign
    #[arg(long, value_name = "PATH")]
    inputfile: Option<PathBuf>,

    /// File to place signed transactions
    #[arg(long, value_name = "PATH")]
    outputfile: Option<PathBuf>,

    /// Print transactions instead of signing them
    #[arg(long, conflicts_with = "submit")]
    preview: bool,

    /// Submit transactions to the network after signing
    #[arg(long)]
    submit: bool,

    /// Hex ed25519 seed of the signing wallet (falls back to PAYOUT_WALLET_SECRET)
    #[arg(long, value_name = "HEX")]
    wallet_secret: Option<String>,

    /// Ledger endpoint base URL
    #[arg(long, value_name = "URL")]
    horizon_url: Option<String>,

    /// Network passphrase signatures are bound to
    #[arg(long, conflicts_with = "testnet")]
    network_passphrase: Option<String>,

    /// Use the test network passphrase and endpoint
    #[arg(long)]
    testnet: bool,

    /// Give up on a transaction after this many attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Skip invalid lines instead of stopping the batch
    #[arg(long)]
    skip_invalid: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "payout-signer starting");

    match run(cli.wallet_secret, &config).await {
        Ok(summary) => {
            tracing::info!(%summary, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the optional config file with command-line overrides.
fn resolve_config(cli: &Cli) -> Result<SignerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SignerConfig::default(),
    };

    if let Some(path) = &cli.inputfile {
        config.batch.input_file = path.clone();
    }
    if let Some(path) = &cli.outputfile {
        config.batch.output_file = path.clone();
    }
    if cli.preview {
        config.batch.mode = RunMode::Preview;
    } else if cli.submit {
        config.batch.mode = RunMode::Submit;
    }
    if cli.skip_invalid {
        config.batch.on_invalid = FailurePolicy::Skip;
    }
    if cli.testnet {
        config.network.passphrase = TEST_NETWORK_PASSPHRASE.to_string();
        config.network.horizon_url = TESTNET_HORIZON_URL.to_string();
    }
    if let Some(passphrase) = &cli.network_passphrase {
        config.network.passphrase = passphrase.clone();
    }
    if let Some(url) = &cli.horizon_url {
        config.network.horizon_url = url.clone();
    }
    if let Some(max) = cli.max_attempts {
        config.retry.max_attempts = Some(max);
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(wallet_secret: Option<String>, config: &SignerConfig) -> Result<BatchSummary, Box<dyn Error>> {
    let recorder = match &config.observability.metrics_file {
        Some(_) => Some(metrics::init_metrics()?),
        None => None,
    };

    let network = config.network.network();
    let wallet = match wallet_secret {
        Some(secret) => Wallet::from_secret(&secret, network)?,
        None => Wallet::from_env(network)?,
    };

    let engine = match config.batch.mode {
        RunMode::Submit => {
            let client = HorizonClient::new(&config.network.horizon_url, config.network.request_timeout())?;
            tracing::info!(endpoint = %client.submit_url(), "Submitting to ledger");
            Some(SubmissionEngine::new(
                Arc::new(client),
                config.retry.policy(),
                config.retry.limits(),
            ))
        }
        RunMode::Preview | RunMode::Sign => None,
    };
    let target = match (&config.batch.mode, &engine) {
        (RunMode::Preview, _) => Target::Preview,
        (_, Some(engine)) => Target::Network(engine),
        (_, None) => Target::File,
    };

    let input = &config.batch.input_file;
    let output = &config.batch.output_file;
    let (mut source, mut sink) = open_batch_files(input, output).await?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        mode = ?config.batch.mode,
        on_invalid = ?config.batch.on_invalid,
        "Starting batch"
    );

    let shutdown = Shutdown::new();
    let mut cancel = shutdown.subscribe();
    spawn_ctrl_c_handler(shutdown);

    let codec = EnvelopeCodec;
    let driver = BatchDriver::new(&codec, &wallet, target, config.batch.on_invalid);
    let mut stdout = std::io::stdout();
    let result = driver.run(&mut source, &mut sink, &mut stdout, &mut cancel).await;

    if let (Some(handle), Some(path)) = (&recorder, &config.observability.metrics_file) {
        if let Err(e) = metrics::write_exposition(handle, path) {
            tracing::error!(path = %path.display(), error = %e, "Failed to write metrics file");
        }
    }

    let report = result?;
    for problem in report.problems() {
        tracing::warn!(line = problem.line, outcome = ?problem.outcome, "Line needs attention");
    }
    Ok(report.summary())
}
