//! # docchain CLI entry point
//!
//! Parses command-line arguments, installs logging, wires the content store
//! and ledger from the environment, and dispatches to subcommand handlers.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docchain_attest::{Attestor, AttestorOptions};
use docchain_cli::attest::{run_connect, run_store, run_verify, store_options, StoreArgs, VerifyArgs};
use docchain_cli::content::{run_locate, run_probe, LocateArgs, ProbeArgs};
use docchain_cli::hash::{run_hash, HashArgs};
use docchain_cli::{ledger_from_env, pinning_from_env, EXIT_FAILURE};

/// DocChain: document attestation on a public ledger.
///
/// Fingerprints a document, pins it to a content-addressed store, and
/// records the fingerprint on the ledger so anyone can later verify it.
#[derive(Parser, Debug)]
#[command(name = "docchain", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a document's fingerprint.
    Hash(HashArgs),

    /// Check that the content store is reachable and the credential accepted.
    Probe(ProbeArgs),

    /// Print the retrieval URL for a content id.
    Locate(LocateArgs),

    /// Connect the wallet and print the session identity.
    Connect,

    /// Pin a document and anchor its fingerprint on the ledger.
    Store(StoreArgs),

    /// Look a document's fingerprint up on the ledger.
    Verify(VerifyArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("docchain CLI v{} starting", env!("CARGO_PKG_VERSION"));

    match dispatch(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn dispatch(command: Commands) -> Result<u8> {
    match command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Probe(args) => run_probe(&args, &pinning_from_env()?).await,
        Commands::Locate(args) => run_locate(&args, &pinning_from_env()?),
        Commands::Connect => {
            let mut attestor =
                Attestor::new(pinning_from_env()?, ledger_from_env()?, AttestorOptions::default());
            run_connect(&mut attestor).await
        }
        Commands::Store(args) => {
            let mut attestor =
                Attestor::new(pinning_from_env()?, ledger_from_env()?, store_options(&args));
            run_store(&args, &mut attestor).await
        }
        Commands::Verify(args) => {
            let mut attestor =
                Attestor::new(pinning_from_env()?, ledger_from_env()?, AttestorOptions::default());
            run_verify(&args, &mut attestor).await
        }
    }
}
