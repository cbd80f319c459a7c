//! # Local Reference Ledger
//!
//! An in-process implementation of the attestation record contract with the
//! same observable rules as the deployed one:
//!
//! - one record per hash; a second `storeDocument` is rejected with
//!   "document already exists", and the first record is never replaced,
//! - `block.timestamp` recorded as epoch seconds at write time,
//! - a `DocumentStored` event per successful write.
//!
//! ## Record Layout
//!
//! A file-backed ledger keeps one file per record at
//! `{dir}/{contract-address}/{sha256(hash)}.json`. A record is written in
//! full to a private temp file and then hard-linked to its final name; the
//! link fails if the name is taken, so creation is atomic across handles
//! and processes sharing the directory. Nothing ever rewrites a record
//! file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use docchain_core::temporal::ledger_seconds_now;
use docchain_core::{Address, TransactionReceipt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::{DocumentStored, LedgerContract, RawRecord};
use crate::error::LedgerError;

const OP: &str = "storeDocument";

/// Temp-file suffix counter, unique within the process.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    hash: String,
    owner: Address,
    timestamp: u64,
    content_id: String,
    doc_type: String,
    block_number: u64,
}

impl StoredDocument {
    fn raw(&self) -> RawRecord {
        RawRecord {
            exists: true,
            owner: self.owner.clone(),
            timestamp: self.timestamp,
            content_id: self.content_id.clone(),
            doc_type: self.doc_type.clone(),
        }
    }

    fn event(&self) -> DocumentStored {
        DocumentStored {
            hash: self.hash.clone(),
            owner: self.owner.clone(),
            content_id: self.content_id.clone(),
        }
    }

    fn receipt(&self) -> TransactionReceipt {
        TransactionReceipt {
            tx_hash: transaction_hash(self),
            block_number: self.block_number,
            from: self.owner.clone(),
        }
    }
}

#[derive(Debug)]
enum Backend {
    Memory(Mutex<BTreeMap<String, StoredDocument>>),
    Files(PathBuf),
}

/// In-process attestation record contract.
#[derive(Debug)]
pub struct LocalLedger {
    address: Address,
    backend: Backend,
}

impl LocalLedger {
    /// A fresh, memory-only ledger deployed at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            backend: Backend::Memory(Mutex::new(BTreeMap::new())),
        }
    }

    /// Open (or create) the file-backed ledger for `address` under `dir`.
    ///
    /// The record directory is created on the first write.
    pub fn open(dir: &Path, address: Address) -> Result<Self, LedgerError> {
        let records = dir.join(address.as_str());
        if records.exists() && !records.is_dir() {
            return Err(storage_error(
                &records,
                std::io::Error::new(ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        tracing::debug!(path = %records.display(), "local ledger opened");
        Ok(Self {
            address,
            backend: Backend::Files(records),
        })
    }

    /// Every `DocumentStored` event emitted so far, oldest first.
    pub fn events(&self) -> Result<Vec<DocumentStored>, LedgerError> {
        let mut docs = self.documents()?;
        docs.sort_by_key(|d| d.block_number);
        Ok(docs.iter().map(StoredDocument::event).collect())
    }

    /// Number of records held.
    pub fn len(&self) -> Result<usize, LedgerError> {
        match &self.backend {
            Backend::Memory(docs) => Ok(docs.lock().len()),
            Backend::Files(dir) => Ok(record_files(dir)?.len()),
        }
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    fn documents(&self) -> Result<Vec<StoredDocument>, LedgerError> {
        match &self.backend {
            Backend::Memory(docs) => Ok(docs.lock().values().cloned().collect()),
            Backend::Files(dir) => record_files(dir)?
                .iter()
                .map(|path| read_record(path))
                .collect(),
        }
    }

    fn store(
        &self,
        from: &Address,
        hash: &str,
        content_id: &str,
        doc_type: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        if hash.is_empty() {
            return Err(LedgerError::rejected(OP, "hash cannot be empty"));
        }
        let doc = |block_number| StoredDocument {
            hash: hash.to_string(),
            owner: from.clone(),
            timestamp: ledger_seconds_now(),
            content_id: content_id.to_string(),
            doc_type: doc_type.to_string(),
            block_number,
        };

        match &self.backend {
            Backend::Memory(docs) => {
                let mut docs = docs.lock();
                if docs.contains_key(hash) {
                    return Err(already_exists());
                }
                let stored = doc(docs.len() as u64 + 1);
                let receipt = stored.receipt();
                docs.insert(hash.to_string(), stored);
                Ok(receipt)
            }
            Backend::Files(dir) => {
                let path = record_path(dir, hash);
                if path.exists() {
                    return Err(already_exists());
                }
                std::fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
                let stored = doc(record_files(dir)?.len() as u64 + 1);
                create_record(&path, &stored)?;
                tracing::debug!(path = %path.display(), block = stored.block_number, "record written");
                Ok(stored.receipt())
            }
        }
    }

    fn lookup(&self, hash: &str) -> Result<RawRecord, LedgerError> {
        match &self.backend {
            Backend::Memory(docs) => Ok(docs
                .lock()
                .get(hash)
                .map(StoredDocument::raw)
                .unwrap_or_else(RawRecord::absent)),
            Backend::Files(dir) => {
                let path = record_path(dir, hash);
                if !path.exists() {
                    return Ok(RawRecord::absent());
                }
                Ok(read_record(&path)?.raw())
            }
        }
    }
}

impl LedgerContract for LocalLedger {
    fn address(&self) -> &Address {
        &self.address
    }

    async fn store_document(
        &self,
        from: &Address,
        hash: &str,
        content_id: &str,
        doc_type: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.store(from, hash, content_id, doc_type)
    }

    async fn verify_document(&self, hash: &str) -> Result<RawRecord, LedgerError> {
        self.lookup(hash)
    }
}

fn already_exists() -> LedgerError {
    LedgerError::rejected(OP, "document already exists")
}

fn record_path(dir: &Path, hash: &str) -> PathBuf {
    dir.join(format!("{}.json", hex(&Sha256::digest(hash.as_bytes()))))
}

fn record_files(dir: &Path) -> Result<Vec<PathBuf>, LedgerError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage_error(dir, e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| storage_error(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn read_record(path: &Path) -> Result<StoredDocument, LedgerError> {
    let raw = std::fs::read(path).map_err(|e| storage_error(path, e))?;
    serde_json::from_slice(&raw)
        .map_err(|e| storage_error(path, std::io::Error::new(ErrorKind::InvalidData, e)))
}

/// Write `doc` to a private temp file, then link it into place. Fails with
/// "document already exists" if another writer got there first.
fn create_record(path: &Path, doc: &StoredDocument) -> Result<(), LedgerError> {
    let encoded = serde_json::to_vec_pretty(doc)
        .map_err(|e| storage_error(path, std::io::Error::new(ErrorKind::InvalidData, e)))?;
    let tmp = path.with_extension(format!(
        "{}-{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&tmp, encoded).map_err(|e| storage_error(&tmp, e))?;

    let linked = std::fs::hard_link(&tmp, path);
    if let Err(e) = std::fs::remove_file(&tmp) {
        tracing::warn!(path = %tmp.display(), error = %e, "could not remove temp record");
    }
    match linked {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(already_exists()),
        Err(e) => Err(storage_error(path, e)),
    }
}

fn storage_error(path: &Path, source: std::io::Error) -> LedgerError {
    LedgerError::Storage {
        path: path.display().to_string(),
        source,
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SHA-256 over the call data and block number, `0x`-prefixed.
fn transaction_hash(doc: &StoredDocument) -> String {
    let mut hasher = Sha256::new();
    for part in [
        doc.owner.as_str(),
        doc.hash.as_str(),
        doc.content_id.as_str(),
        doc.doc_type.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(doc.block_number.to_be_bytes());
    format!("0x{}", hex(&hasher.finalize()))
}
