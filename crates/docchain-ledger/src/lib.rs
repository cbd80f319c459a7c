#![deny(missing_docs)]
//! # docchain-ledger — Ledger Client
//!
//! Wraps a wallet session and the attestation record contract behind three
//! operations:
//!
//! - [`Ledger::connect`]: request account access, assert the wallet is on the
//!   required network, return a [`SessionIdentity`](docchain_core::SessionIdentity).
//! - [`Ledger::append`]: write `{fingerprint, content id, label}` from a
//!   session and wait for confirmation.
//! - [`Ledger::resolve`]: read a fingerprint's record. No session needed.
//!
//! ## Seams
//!
//! | Trait | Implementations |
//! |-------|-----------------|
//! | [`Wallet`] | [`JsonRpcWallet`] (EIP-1193 JSON-RPC over HTTP), [`StaticWallet`] |
//! | [`LedgerContract`] | [`EvmContract`] (deployed contract over Ethereum JSON-RPC), [`LocalLedger`] (in-process reference contract) |
//!
//! The contract's read result is a positional 5-tuple
//! `(exists, owner, timestamp, contentId, docType)`. It is decoded once, in
//! [`LedgerClient::resolve`], into a
//! [`Resolution`](docchain_core::Resolution); the `exists` flag is the sole
//! source of truth for presence.

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod evm;
pub mod local;
pub(crate) mod retry;
pub mod wallet;

pub use client::{Ledger, LedgerClient};
pub use config::{ConfigError, LedgerConfig};
pub use contract::{DocumentStored, LedgerContract, RawRecord};
pub use error::LedgerError;
pub use evm::EvmContract;
pub use local::LocalLedger;
pub use wallet::{JsonRpcWallet, StaticWallet, Wallet};
