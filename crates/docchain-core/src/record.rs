//! # Attestation Records
//!
//! The structured view of a ledger entry. A record is created once per
//! fingerprint and never updated; the submitter recorded at creation is the
//! permanent attestor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::identity::{Address, ContentId};

/// A ledger-resident attestation, decoded from the contract's read result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// The fingerprint the record is keyed by.
    pub fingerprint: Fingerprint,
    /// The identity that submitted the record.
    pub owner: Address,
    /// Block time of the write, converted from epoch seconds.
    pub timestamp: DateTime<Utc>,
    /// Where the attested bytes can be retrieved. `None` when the record
    /// was written without a usable content identifier.
    pub content_id: Option<ContentId>,
    /// Free-form document-type label supplied at submission.
    pub label: String,
}

/// Outcome of resolving a fingerprint against the ledger.
///
/// Not-found is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A record exists for the fingerprint.
    Found(AttestationRecord),
    /// No record exists for the fingerprint.
    NotFound,
}

impl Resolution {
    /// Whether a record was found.
    pub fn exists(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The record, if found.
    pub fn record(&self) -> Option<&AttestationRecord> {
        match self {
            Self::Found(r) => Some(r),
            Self::NotFound => None,
        }
    }

    /// Flatten into the presentation shape used by verifier UIs: an
    /// existence flag with every secondary field empty when absent.
    pub fn to_view(&self, fingerprint: &Fingerprint) -> VerificationView {
        match self {
            Self::Found(r) => VerificationView {
                exists: true,
                fingerprint: fingerprint.to_hex(),
                owner: r.owner.to_string(),
                timestamp: Some(r.timestamp),
                content_id: r
                    .content_id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                label: r.label.clone(),
            },
            Self::NotFound => VerificationView {
                exists: false,
                fingerprint: fingerprint.to_hex(),
                owner: String::new(),
                timestamp: None,
                content_id: String::new(),
                label: String::new(),
            },
        }
    }
}

/// Flat verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    /// Whether the fingerprint is attested.
    pub exists: bool,
    /// The fingerprint that was looked up.
    pub fingerprint: String,
    /// Attestor address, empty when absent.
    pub owner: String,
    /// Attestation time, `None` when absent.
    pub timestamp: Option<DateTime<Utc>>,
    /// Retrieval identifier, empty when absent.
    pub content_id: String,
    /// Document-type label, empty when absent.
    pub label: String,
}

/// Confirmation of a durable ledger write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// `0x`-prefixed transaction hash.
    pub tx_hash: String,
    /// Block the write was included in.
    pub block_number: u64,
    /// The account that sent the write.
    pub from: Address,
}
