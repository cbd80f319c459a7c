//! # Ledger Client
//!
//! Composes a [`Wallet`] and a [`LedgerContract`] and enforces the network
//! identity rule: every connection and every write is checked against the
//! configured chain before anything is sent.

use std::future::Future;

use docchain_core::temporal::from_ledger_seconds;
use docchain_core::{
    Address, AttestationRecord, ContentId, Fingerprint, Resolution, SessionIdentity,
    TransactionReceipt,
};

use crate::config::LedgerConfig;
use crate::contract::{LedgerContract, RawRecord};
use crate::error::LedgerError;
use crate::wallet::Wallet;

/// The three ledger operations the attestation workflow depends on.
pub trait Ledger: Send + Sync {
    /// Request account access and assert the required network. Idempotent.
    fn connect(&self) -> impl Future<Output = Result<SessionIdentity, LedgerError>> + Send;

    /// Write a record keyed by `fingerprint` from `session`. Resolves once
    /// the write is confirmed. A duplicate fingerprint surfaces as
    /// [`LedgerError::Rejected`].
    fn append(
        &self,
        session: &SessionIdentity,
        fingerprint: &Fingerprint,
        content_id: &ContentId,
        label: &str,
    ) -> impl Future<Output = Result<TransactionReceipt, LedgerError>> + Send;

    /// Read a fingerprint's record. Requires no session.
    fn resolve(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl Future<Output = Result<Resolution, LedgerError>> + Send;
}

/// Ledger client over a wallet and a deployed contract.
#[derive(Debug)]
pub struct LedgerClient<W, C> {
    wallet: W,
    contract: C,
    config: LedgerConfig,
}

impl<W: Wallet, C: LedgerContract> LedgerClient<W, C> {
    /// Create a client. The contract address is checked per call, not here.
    pub fn new(wallet: W, contract: C, config: LedgerConfig) -> Self {
        Self {
            wallet,
            contract,
            config,
        }
    }

    /// The wallet this client connects through.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// The contract this client calls.
    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// The active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Resolve the configured contract address and make sure the contract
    /// handle is deployed there.
    fn contract_address(&self, operation: &str) -> Result<&Address, LedgerError> {
        let configured = self
            .config
            .contract_address
            .as_ref()
            .ok_or(LedgerError::Unconfigured)?;
        if configured != self.contract.address() {
            return Err(LedgerError::rejected(
                operation,
                format!("no attestation contract deployed at {configured}"),
            ));
        }
        Ok(configured)
    }

    async fn assert_wallet_network(&self) -> Result<(), LedgerError> {
        let actual = self.wallet.chain_id().await?;
        if actual != self.config.required_chain {
            return Err(LedgerError::NetworkMismatch {
                required: self.config.required_chain,
                actual,
            });
        }
        Ok(())
    }
}

impl<W: Wallet, C: LedgerContract> Ledger for LedgerClient<W, C> {
    async fn connect(&self) -> Result<SessionIdentity, LedgerError> {
        let accounts = self.wallet.request_accounts().await?;
        let address = accounts.into_iter().next().ok_or(LedgerError::NoAccounts)?;
        self.assert_wallet_network().await?;

        let session = SessionIdentity::new(address, self.config.required_chain);
        tracing::info!(session = %session, "wallet connected");
        Ok(session)
    }

    async fn append(
        &self,
        session: &SessionIdentity,
        fingerprint: &Fingerprint,
        content_id: &ContentId,
        label: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        let contract = self.contract_address("storeDocument")?;
        if session.chain_id != self.config.required_chain {
            return Err(LedgerError::NetworkMismatch {
                required: self.config.required_chain,
                actual: session.chain_id,
            });
        }
        self.assert_wallet_network().await?;

        tracing::debug!(
            contract = %contract,
            from = %session.address,
            fingerprint = %fingerprint,
            content_id = %content_id,
            "sending storeDocument"
        );

        let receipt = self
            .contract
            .store_document(
                &session.address,
                &fingerprint.to_hex(),
                content_id.as_str(),
                label,
            )
            .await?;

        tracing::info!(
            fingerprint = %fingerprint,
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            "attestation confirmed"
        );
        Ok(receipt)
    }

    async fn resolve(&self, fingerprint: &Fingerprint) -> Result<Resolution, LedgerError> {
        self.contract_address("verifyDocument")?;
        let raw = self.contract.verify_document(&fingerprint.to_hex()).await?;
        let resolution = decode_record(fingerprint, raw)?;
        tracing::debug!(fingerprint = %fingerprint, exists = resolution.exists(), "resolved");
        Ok(resolution)
    }
}

/// Decode the positional read result. `exists` alone decides presence; the
/// other fields of an absent record are ignored, and a present record with
/// an empty or malformed content id still resolves as found.
fn decode_record(fingerprint: &Fingerprint, raw: RawRecord) -> Result<Resolution, LedgerError> {
    const OP: &str = "verifyDocument";
    if !raw.exists {
        return Ok(Resolution::NotFound);
    }
    let timestamp = from_ledger_seconds(raw.timestamp).ok_or_else(|| {
        LedgerError::rejected(OP, format!("timestamp {} out of range", raw.timestamp))
    })?;
    let content_id = match ContentId::new(raw.content_id) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(fingerprint = %fingerprint, error = %e, "record has no usable content id");
            None
        }
    };
    Ok(Resolution::Found(AttestationRecord {
        fingerprint: *fingerprint,
        owner: raw.owner,
        timestamp,
        content_id,
        label: raw.doc_type,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchain_core::fingerprint;

    fn owner() -> Address {
        Address::new("0x5b38da6a701c568545dcfcb03fcb875f56beddc4").unwrap()
    }

    #[test]
    fn absent_flag_wins_over_populated_fields() {
        let fp = fingerprint(b"x");
        let raw = RawRecord {
            exists: false,
            owner: owner(),
            timestamp: 1_768_478_400,
            content_id: "bafy".into(),
            doc_type: "diploma".into(),
        };
        assert_eq!(decode_record(&fp, raw).unwrap(), Resolution::NotFound);
    }

    #[test]
    fn present_record_is_decoded() {
        let fp = fingerprint(b"x");
        let raw = RawRecord {
            exists: true,
            owner: owner(),
            timestamp: 1_768_478_400,
            content_id: "bafy".into(),
            doc_type: "diploma".into(),
        };
        let resolution = decode_record(&fp, raw).unwrap();
        let record = resolution.record().unwrap();
        assert_eq!(record.fingerprint, fp);
        assert_eq!(record.owner, owner());
        assert_eq!(record.content_id.as_ref().map(ContentId::as_str), Some("bafy"));
        assert_eq!(record.label, "diploma");
        assert_eq!(record.timestamp.to_rfc3339(), "2026-01-15T12:00:00+00:00");
    }

    #[test]
    fn present_record_with_sparse_fields_is_found() {
        let fp = fingerprint(b"x");
        let raw = RawRecord {
            exists: true,
            owner: owner(),
            timestamp: 1,
            content_id: String::new(),
            doc_type: String::new(),
        };
        let resolution = decode_record(&fp, raw).unwrap();
        let record = resolution.record().unwrap();
        assert_eq!(record.content_id, None);
        assert!(record.label.is_empty());
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let fp = fingerprint(b"x");
        let raw = RawRecord {
            exists: true,
            owner: owner(),
            timestamp: u64::MAX,
            content_id: "bafy".into(),
            doc_type: String::new(),
        };
        assert!(matches!(
            decode_record(&fp, raw),
            Err(LedgerError::Rejected { .. })
        ));
    }
}
