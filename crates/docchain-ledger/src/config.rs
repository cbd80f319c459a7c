//! Ledger client configuration.
//!
//! The required network is fixed per deployment; the default is Sepolia.
//! The contract address may be absent at load time so that read-only tools
//! still start, but every contract call checks it first.

use std::path::PathBuf;

use docchain_core::{Address, ChainId};
use url::Url;

/// Configuration for the ledger client and its wallet.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Address of the attestation record contract.
    pub contract_address: Option<Address>,
    /// The only network writes and connections are accepted on.
    pub required_chain: ChainId,
    /// JSON-RPC wallet endpoint. When absent a static wallet is used.
    pub wallet_rpc_url: Option<Url>,
    /// Account of the static wallet.
    pub wallet_address: Option<Address>,
    /// Chain the static wallet reports. Defaults to `required_chain`.
    pub wallet_chain_id: Option<ChainId>,
    /// Ethereum JSON-RPC endpoint of the deployed contract. When absent the
    /// local reference ledger is used.
    pub ledger_rpc_url: Option<Url>,
    /// Delay between transaction receipt polls, in milliseconds.
    pub receipt_poll_ms: u64,
    /// Receipt polls before a submitted write is reported unavailable.
    pub receipt_polls: u32,
    /// Directory holding local reference ledger records.
    pub ledger_dir: PathBuf,
    /// Request timeout in seconds for JSON-RPC calls.
    pub timeout_secs: u64,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DOCCHAIN_CONTRACT_ADDRESS` (optional here; required for calls)
    /// - `DOCCHAIN_CHAIN_ID` (default: 11155111, Sepolia)
    /// - `DOCCHAIN_WALLET_RPC_URL` (optional)
    /// - `DOCCHAIN_WALLET_ADDRESS` (optional)
    /// - `DOCCHAIN_WALLET_CHAIN_ID` (optional)
    /// - `DOCCHAIN_LEDGER_RPC_URL` (optional; selects the deployed contract)
    /// - `DOCCHAIN_RECEIPT_POLL_MS` (default: 2000)
    /// - `DOCCHAIN_RECEIPT_POLLS` (default: 90)
    /// - `DOCCHAIN_LEDGER_DIR` (default: `.docchain/ledger`)
    /// - `DOCCHAIN_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            contract_address: env_parsed("DOCCHAIN_CONTRACT_ADDRESS", |s| Address::new(s).ok())?,
            required_chain: env_parsed("DOCCHAIN_CHAIN_ID", |s| ChainId::parse(s).ok())?
                .unwrap_or(ChainId::SEPOLIA),
            wallet_rpc_url: env_parsed("DOCCHAIN_WALLET_RPC_URL", |s| Url::parse(s).ok())?,
            wallet_address: env_parsed("DOCCHAIN_WALLET_ADDRESS", |s| Address::new(s).ok())?,
            wallet_chain_id: env_parsed("DOCCHAIN_WALLET_CHAIN_ID", |s| ChainId::parse(s).ok())?,
            ledger_rpc_url: env_parsed("DOCCHAIN_LEDGER_RPC_URL", |s| Url::parse(s).ok())?,
            receipt_poll_ms: env_parsed("DOCCHAIN_RECEIPT_POLL_MS", |s| s.parse::<u64>().ok())?
                .unwrap_or(2000),
            receipt_polls: env_parsed("DOCCHAIN_RECEIPT_POLLS", |s| {
                s.parse::<u32>().ok().filter(|n| *n > 0)
            })?
            .unwrap_or(90),
            ledger_dir: std::env::var("DOCCHAIN_LEDGER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".docchain/ledger")),
            timeout_secs: env_parsed("DOCCHAIN_TIMEOUT_SECS", parse_timeout)?.unwrap_or(30),
        })
    }

    /// A configuration for tests: Sepolia, the given contract, a static
    /// wallet on the same network.
    pub fn for_contract(contract_address: Address, wallet_address: Address) -> Self {
        Self {
            contract_address: Some(contract_address),
            required_chain: ChainId::SEPOLIA,
            wallet_rpc_url: None,
            wallet_address: Some(wallet_address),
            wallet_chain_id: None,
            ledger_rpc_url: None,
            receipt_poll_ms: 10,
            receipt_polls: 5,
            ledger_dir: PathBuf::from(".docchain/ledger"),
            timeout_secs: 5,
        }
    }
}

/// Read an optional variable; present-but-unparseable is an error.
fn env_parsed<T>(var: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse(raw.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidValue(var.to_string(), raw)),
        Err(_) => Ok(None),
    }
}

fn parse_timeout(s: &str) -> Option<u64> {
    s.parse().ok().filter(|secs| *secs > 0)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}
