//! # Attestation Subcommands
//!
//! `connect`, `store`, and `verify`, each a single orchestrator run.
//!
//! A store whose anchoring stage fails reports the content id that was
//! already pinned. Passing it back with `--pinned` retries the ledger write
//! without uploading again.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use docchain_attest::{Attestor, AttestorOptions, Document};
use docchain_core::ContentId;
use docchain_ledger::Ledger;
use docchain_pinning::ContentStore;

/// Arguments for `docchain store`.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Document to attest.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Document-type label recorded with the attestation.
    #[arg(long)]
    pub label: String,

    /// Also pin a JSON manifest describing the document.
    #[arg(long)]
    pub manifest: bool,

    /// Content id pinned by an earlier run; skips the upload.
    #[arg(long, value_name = "CID")]
    pub pinned: Option<String>,

    /// Deadline in seconds for each network call.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `docchain verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Candidate document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the verification view as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `docchain connect`.
pub async fn run_connect<S: ContentStore, L: Ledger>(
    attestor: &mut Attestor<S, L>,
) -> Result<u8> {
    let session = attestor.connect().await.context("wallet connection failed")?;
    println!(
        "OK: connected address={} chain_id={}",
        session.address, session.chain_id
    );
    Ok(crate::EXIT_OK)
}

/// Options for a store run.
pub fn store_options(args: &StoreArgs) -> AttestorOptions {
    AttestorOptions {
        stage_deadline: args.deadline.map(Duration::from_secs),
        pin_manifest: args.manifest,
    }
}

/// Execute `docchain store` on an attestor built with [`store_options`].
pub async fn run_store<S: ContentStore, L: Ledger>(
    args: &StoreArgs,
    attestor: &mut Attestor<S, L>,
) -> Result<u8> {
    attestor.connect().await.context("wallet connection failed")?;

    let document = Document::from_path(&args.file);
    match &args.pinned {
        Some(cid) => {
            let cid = ContentId::new(cid.as_str()).context("invalid --pinned content id")?;
            attestor.select_pinned(document, cid);
        }
        None => attestor.select(document),
    }

    let outcome = match attestor.store(&args.label).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let (true, Some(cid)) = (e.is_anchor_failure(), attestor.pinned()) {
                eprintln!("note: document is pinned as {cid}; retry with --pinned {cid}");
            }
            return Err(e).context(format!("store failed for {}", args.file.display()));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "OK: attested fingerprint={} content_id={} tx={} block={}",
            outcome.fingerprint,
            outcome.content_id,
            outcome.receipt.tx_hash,
            outcome.receipt.block_number
        );
        println!("  url: {}", outcome.url);
        if let Some(manifest) = &outcome.manifest_id {
            println!("  manifest: {manifest}");
        }
    }
    Ok(crate::EXIT_OK)
}

/// Execute `docchain verify`. Exits 1 when the document is not attested.
pub async fn run_verify<S: ContentStore, L: Ledger>(
    args: &VerifyArgs,
    attestor: &mut Attestor<S, L>,
) -> Result<u8> {
    attestor.select(Document::from_path(&args.file));
    let outcome = attestor
        .verify()
        .await
        .with_context(|| format!("verify failed for {}", args.file.display()))?;

    let view = outcome.resolution.to_view(&outcome.fingerprint);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if let Some(record) = outcome.resolution.record() {
        println!(
            "VERIFIED: fingerprint={} owner={} timestamp={} label={}",
            outcome.fingerprint,
            record.owner,
            record.timestamp.to_rfc3339(),
            record.label
        );
        if let Some(url) = &outcome.url {
            println!("  url: {url}");
        }
    } else {
        println!("NOT FOUND: fingerprint={}", outcome.fingerprint);
    }

    Ok(if view.exists {
        crate::EXIT_OK
    } else {
        crate::EXIT_NOT_FOUND
    })
}
