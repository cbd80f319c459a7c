#![deny(missing_docs)]

//! # docchain-core — Foundational Types for DocChain
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies — only `serde`, `serde_json`, `thiserror`, `chrono`, and
//! `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **The fingerprint is the primary key.** [`Fingerprint`] is the lowercase
//!    hex SHA-256 of a document's raw bytes. It is computed on demand and is
//!    bit-identical to fingerprints produced by any other SHA-256 client, so
//!    ledger records created elsewhere remain verifiable.
//!
//! 2. **Newtype wrappers for every identifier.** You cannot pass a
//!    [`ContentId`] where a [`Fingerprint`] is expected, nor an arbitrary
//!    string where an [`Address`] is expected.
//!
//! 3. **Ledger tuples never leave the ledger boundary.** The rest of the
//!    system sees [`Resolution`] — a found [`AttestationRecord`] or an explicit
//!    not-found — never positional values.
//!
//! 4. **Integer seconds until the boundary.** Ledger timestamps stay as epoch
//!    seconds until [`temporal::from_ledger_seconds`] converts them once.

pub mod error;
pub mod fingerprint;
pub mod identity;
pub mod record;
pub mod temporal;

pub use error::{HashError, ValidationError};
pub use fingerprint::{fingerprint, fingerprint_file, fingerprint_reader, Fingerprint};
pub use identity::{Address, ChainId, ContentId, SessionIdentity};
pub use record::{AttestationRecord, Resolution, TransactionReceipt, VerificationView};
