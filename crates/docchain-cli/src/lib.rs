//! # docchain-cli — DocChain command line
//!
//! Provides the `docchain` binary.
//!
//! ## Subcommands
//!
//! - `docchain hash <FILE>`: print a document's fingerprint.
//! - `docchain probe [--details]`: content store health check.
//! - `docchain locate <CID>`: print the retrieval URL for a content id.
//! - `docchain connect`: connect the wallet and print the session.
//! - `docchain store <FILE> --label <LABEL>`: pin and anchor a document.
//! - `docchain verify <FILE>`: look a document up on the ledger.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success, or document verified |
//! | 1 | document not attested |
//! | 2 | workflow or configuration failure |
//!
//! Configuration is read from `DOCCHAIN_*` environment variables; see
//! [`PinningConfig::from_env`] and [`LedgerConfig::from_env`]. With
//! `DOCCHAIN_LEDGER_RPC_URL` set, records go to the deployed contract;
//! otherwise to the local reference ledger under `DOCCHAIN_LEDGER_DIR`.

pub mod attest;
pub mod content;
pub mod hash;

use std::time::Duration;

use anyhow::{Context, Result};
use docchain_core::{Address, ChainId, TransactionReceipt};
use docchain_ledger::{
    EvmContract, JsonRpcWallet, LedgerClient, LedgerConfig, LedgerContract, LedgerError,
    LocalLedger, RawRecord, StaticWallet, Wallet,
};
use docchain_pinning::{PinningClient, PinningConfig};

pub const EXIT_OK: u8 = 0;
pub const EXIT_NOT_FOUND: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

/// The wallet selected by configuration.
#[derive(Debug)]
pub enum CliWallet {
    Rpc(JsonRpcWallet),
    Static(StaticWallet),
}

impl Wallet for CliWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        match self {
            Self::Rpc(w) => w.request_accounts().await,
            Self::Static(w) => w.request_accounts().await,
        }
    }

    async fn chain_id(&self) -> Result<ChainId, LedgerError> {
        match self {
            Self::Rpc(w) => w.chain_id().await,
            Self::Static(w) => w.chain_id().await,
        }
    }
}

/// The contract selected by configuration.
#[derive(Debug)]
pub enum CliContract {
    Evm(EvmContract),
    Local(LocalLedger),
}

impl LedgerContract for CliContract {
    fn address(&self) -> &Address {
        match self {
            Self::Evm(c) => c.address(),
            Self::Local(c) => c.address(),
        }
    }

    async fn store_document(
        &self,
        from: &Address,
        hash: &str,
        content_id: &str,
        doc_type: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        match self {
            Self::Evm(c) => c.store_document(from, hash, content_id, doc_type).await,
            Self::Local(c) => c.store_document(from, hash, content_id, doc_type).await,
        }
    }

    async fn verify_document(&self, hash: &str) -> Result<RawRecord, LedgerError> {
        match self {
            Self::Evm(c) => c.verify_document(hash).await,
            Self::Local(c) => c.verify_document(hash).await,
        }
    }
}

/// Ledger client as wired by the CLI.
pub type CliLedger = LedgerClient<CliWallet, CliContract>;

/// Build the content store client from the environment.
pub fn pinning_from_env() -> Result<PinningClient> {
    let config = PinningConfig::from_env().context("invalid content store configuration")?;
    PinningClient::new(config).context("failed to build content store client")
}

/// Build the ledger client from the environment.
pub fn ledger_from_env() -> Result<CliLedger> {
    let config = LedgerConfig::from_env().context("invalid ledger configuration")?;
    build_ledger(config)
}

/// Wire a wallet and a contract for `config`.
///
/// A JSON-RPC wallet takes precedence over a static one. With neither, the
/// wallet grants no accounts and `connect` fails. A ledger RPC URL selects
/// the deployed contract over the local reference ledger.
pub fn build_ledger(config: LedgerConfig) -> Result<CliLedger> {
    let wallet = match (&config.wallet_rpc_url, &config.wallet_address) {
        (Some(url), _) => CliWallet::Rpc(
            JsonRpcWallet::new(url.clone(), config.timeout_secs)
                .context("failed to build JSON-RPC wallet")?,
        ),
        (None, Some(address)) => CliWallet::Static(StaticWallet::new(
            address.clone(),
            config.wallet_chain_id.unwrap_or(config.required_chain),
        )),
        (None, None) => {
            tracing::warn!(
                "no wallet configured (set DOCCHAIN_WALLET_RPC_URL or DOCCHAIN_WALLET_ADDRESS)"
            );
            CliWallet::Static(StaticWallet::locked(config.required_chain))
        }
    };

    // An unset address still opens a ledger handle; every call is then
    // refused as unconfigured before it reaches the contract.
    let contract_address = config.contract_address.clone().unwrap_or_else(Address::zero);
    let contract = match &config.ledger_rpc_url {
        Some(url) => CliContract::Evm(
            EvmContract::new(url.clone(), contract_address, config.timeout_secs)
                .context("failed to build ledger RPC client")?
                .with_receipt_polling(
                    Duration::from_millis(config.receipt_poll_ms),
                    config.receipt_polls,
                ),
        ),
        None => CliContract::Local(
            LocalLedger::open(&config.ledger_dir, contract_address).with_context(|| {
                format!(
                    "failed to open local ledger under {}",
                    config.ledger_dir.display()
                )
            })?,
        ),
    };

    Ok(LedgerClient::new(wallet, contract, config))
}
