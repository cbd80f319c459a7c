//! The attestation record call contract.
//!
//! Two calls with a fixed signature:
//!
//! ```text
//! storeDocument(string hash, string contentId, string docType)
//! verifyDocument(string hash) view returns (bool, address, uint256, string, string)
//! event DocumentStored(string hash, address owner, string contentId)
//! ```
//!
//! Implementations must reject a second `storeDocument` for the same hash and
//! must only return from `storeDocument` once the write is confirmed.

use std::future::Future;

use docchain_core::{Address, TransactionReceipt};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// The positional read result of `verifyDocument`, field for field.
///
/// Only the ledger client handles this type; everything above it sees
/// [`Resolution`](docchain_core::Resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Whether a record exists. Decides presence on its own.
    pub exists: bool,
    /// Submitter; the zero address when absent.
    pub owner: Address,
    /// `block.timestamp` of the write, epoch seconds.
    pub timestamp: u64,
    /// `ipfsCID` as written; may be empty.
    pub content_id: String,
    /// Document-type label as written.
    pub doc_type: String,
}

impl RawRecord {
    /// What the contract returns for a hash it has never seen.
    pub fn absent() -> Self {
        Self {
            exists: false,
            owner: Address::zero(),
            timestamp: 0,
            content_id: String::new(),
            doc_type: String::new(),
        }
    }
}

/// `DocumentStored` event emitted by every successful write, for off-chain
/// indexers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStored {
    /// Fingerprint hex the record is keyed by.
    pub hash: String,
    /// Submitter.
    pub owner: Address,
    /// Content id written with the record.
    pub content_id: String,
}

/// A deployed attestation record contract.
pub trait LedgerContract: Send + Sync {
    /// The address the contract is deployed at.
    fn address(&self) -> &Address;

    /// `storeDocument`, sent from `from`. Resolves once the write is
    /// confirmed.
    fn store_document(
        &self,
        from: &Address,
        hash: &str,
        content_id: &str,
        doc_type: &str,
    ) -> impl Future<Output = Result<TransactionReceipt, LedgerError>> + Send;

    /// `verifyDocument`. Read-only.
    fn verify_document(
        &self,
        hash: &str,
    ) -> impl Future<Output = Result<RawRecord, LedgerError>> + Send;
}
