//! Wallet sessions.
//!
//! A wallet grants access to accounts and reports which network it is
//! connected to. It is the only source of a [`SessionIdentity`](docchain_core::SessionIdentity).

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use docchain_core::{Address, ChainId};
use parking_lot::RwLock;
use serde::Deserialize;
use url::Url;

use crate::error::LedgerError;

/// Account access and network reporting.
pub trait Wallet: Send + Sync {
    /// Ask the wallet for account access. The first account is the active one.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, LedgerError>> + Send;

    /// The network the wallet is currently connected to.
    fn chain_id(&self) -> impl Future<Output = Result<ChainId, LedgerError>> + Send;
}

// ─── Static wallet ───────────────────────────────────────────────────────

/// A wallet with a fixed account.
///
/// The reported chain can be switched at runtime to exercise network
/// enforcement.
#[derive(Debug)]
pub struct StaticWallet {
    accounts: Vec<Address>,
    chain_id: RwLock<ChainId>,
}

impl StaticWallet {
    /// A wallet exposing one account on `chain_id`.
    pub fn new(address: Address, chain_id: ChainId) -> Self {
        Self {
            accounts: vec![address],
            chain_id: RwLock::new(chain_id),
        }
    }

    /// A wallet that grants no accounts.
    pub fn locked(chain_id: ChainId) -> Self {
        Self {
            accounts: Vec::new(),
            chain_id: RwLock::new(chain_id),
        }
    }

    /// Simulate the user switching networks.
    pub fn switch_chain(&self, chain_id: ChainId) {
        *self.chain_id.write() = chain_id;
    }
}

impl Wallet for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<ChainId, LedgerError> {
        Ok(*self.chain_id.read())
    }
}

// ─── JSON-RPC wallet ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// A wallet reached over EIP-1193-style JSON-RPC (`eth_requestAccounts`,
/// `eth_chainId`), e.g. a local signer or a browser-extension bridge.
#[derive(Debug)]
pub struct JsonRpcWallet {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    /// Create a wallet client for the JSON-RPC endpoint at `url`.
    pub fn new(url: Url, timeout_secs: u64) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LedgerError::unavailable("wallet_init", e.to_string()))?;
        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": [],
        });

        tracing::debug!(method, id, "wallet JSON-RPC request");

        let resp = crate::retry::retry_send(method, || {
            self.http.post(self.url.clone()).json(&body).send()
        })
        .await
        .map_err(|e| LedgerError::unavailable(method, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LedgerError::rejected(method, format!("HTTP {status}: {text}")));
        }

        let decoded: RpcResponse<T> = resp
            .json()
            .await
            .map_err(|e| LedgerError::rejected(method, format!("undecodable response: {e}")))?;

        if let Some(err) = decoded.error {
            return Err(LedgerError::rejected(
                method,
                format!("wallet error {}: {}", err.code, err.message),
            ));
        }
        decoded
            .result
            .ok_or_else(|| LedgerError::rejected(method, "response carried no result"))
    }
}

impl Wallet for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        let raw: Vec<String> = self.call("eth_requestAccounts").await?;
        raw.into_iter()
            .map(|a| {
                Address::new(a)
                    .map_err(|e| LedgerError::rejected("eth_requestAccounts", e.to_string()))
            })
            .collect()
    }

    async fn chain_id(&self) -> Result<ChainId, LedgerError> {
        let raw: String = self.call("eth_chainId").await?;
        ChainId::parse(&raw).map_err(|e| LedgerError::rejected("eth_chainId", e.to_string()))
    }
}
