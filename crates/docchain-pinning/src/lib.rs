#![deny(missing_docs)]
//! # docchain-pinning — Content Store Client
//!
//! Uploads document bytes to a content-addressed pinning service and hands
//! back the retrieval identifier (an IPFS CID) that the ledger record points
//! at. The default endpoints are Pinata's.
//!
//! ## API Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/pinning/pinFileToIPFS` | [`PinningClient::put`] (multipart) |
//! | POST   | `/pinning/pinJSONToIPFS` | [`PinningClient::put_json`] |
//! | GET    | `/data/testAuthentication` | [`PinningClient::probe`], [`PinningClient::check_authentication`] |
//!
//! ## Failure Contract
//!
//! - Missing bearer credential is reported as [`StoreError::Misconfigured`]
//!   before any request is built.
//! - Transport failures (connect, TLS, timeout) are [`StoreError::Unavailable`].
//! - Any non-2xx response, or a 2xx response without an identifier, is
//!   [`StoreError::Rejected`] with the status and body attached.
//! - `put` performs exactly one request. It never retries: a retried upload
//!   of a large document is the caller's decision.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ContentStore, PinningClient};
pub use config::{ConfigError, PinningConfig};
pub use error::StoreError;
