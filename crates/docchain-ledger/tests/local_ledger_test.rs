//! File-backed persistence of the local reference ledger.

use docchain_core::{fingerprint, Address, ChainId, Resolution};
use docchain_ledger::{
    Ledger, LedgerClient, LedgerConfig, LedgerContract, LedgerError, LocalLedger, StaticWallet,
};

fn owner() -> Address {
    Address::new("0x5b38da6a701c568545dcfcb03fcb875f56beddc4").unwrap()
}

fn intruder() -> Address {
    Address::new("0xab8483f64d9c6d1ecf9b849ae677dd3315835cb2").unwrap()
}

fn contract() -> Address {
    Address::new("0xd9145cce52d386f254917e481eb44e9943f39138").unwrap()
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let ledger = LocalLedger::open(dir.path(), contract()).unwrap();
        ledger
            .store_document(&owner(), "aa", "bafy-a", "diploma")
            .await
            .unwrap();
    }

    let reopened = LocalLedger::open(dir.path(), contract()).unwrap();
    let raw = reopened.verify_document("aa").await.unwrap();
    assert!(raw.exists);
    assert_eq!(raw.content_id, "bafy-a");
    assert_eq!(raw.doc_type, "diploma");
    assert_eq!(reopened.events().unwrap().len(), 1);

    let err = reopened
        .store_document(&owner(), "aa", "bafy-b", "again")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let receipt = reopened
        .store_document(&owner(), "bb", "bafy-b", "transcript")
        .await
        .unwrap();
    assert_eq!(receipt.block_number, 2);
}

#[tokio::test]
async fn second_handle_cannot_overwrite_a_record() {
    let dir = tempfile::tempdir().unwrap();
    let a = LocalLedger::open(dir.path(), contract()).unwrap();
    let b = LocalLedger::open(dir.path(), contract()).unwrap();

    a.store_document(&owner(), "aa", "bafy-a", "diploma")
        .await
        .unwrap();
    let err = b
        .store_document(&intruder(), "aa", "bafy-evil", "forged")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rejected { .. }));
    assert!(err.to_string().contains("already exists"));

    b.store_document(&intruder(), "bb", "bafy-b", "transcript")
        .await
        .unwrap();

    let reopened = LocalLedger::open(dir.path(), contract()).unwrap();
    let raw = reopened.verify_document("aa").await.unwrap();
    assert_eq!(raw.content_id, "bafy-a");
    assert_eq!(raw.owner, owner());
    assert_eq!(raw.doc_type, "diploma");
    assert!(reopened.verify_document("bb").await.unwrap().exists);
    assert_eq!(reopened.len().unwrap(), 2);
    assert_eq!(a.len().unwrap(), 2);
}

#[tokio::test]
async fn concurrent_writers_create_exactly_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let path = path.clone();
        tasks.push(tokio::spawn(async move {
            let ledger = LocalLedger::open(&path, contract()).unwrap();
            ledger
                .store_document(&owner(), "race", &format!("bafy-{i}"), "x")
                .await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert!(e.to_string().contains("already exists")),
        }
    }
    assert_eq!(winners, 1);

    let ledger = LocalLedger::open(&path, contract()).unwrap();
    assert_eq!(ledger.len().unwrap(), 1);
    assert_eq!(ledger.events().unwrap().len(), 1);
}

#[tokio::test]
async fn resolve_across_handles_sees_the_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig::for_contract(contract(), owner());
    let writer = LedgerClient::new(
        StaticWallet::new(owner(), ChainId::SEPOLIA),
        LocalLedger::open(dir.path(), contract()).unwrap(),
        config.clone(),
    );
    let reader = LedgerClient::new(
        StaticWallet::new(intruder(), ChainId::SEPOLIA),
        LocalLedger::open(dir.path(), contract()).unwrap(),
        config,
    );

    let fp = fingerprint(b"shared document");
    assert_eq!(reader.resolve(&fp).await.unwrap(), Resolution::NotFound);

    let session = writer.connect().await.unwrap();
    let cid = docchain_core::ContentId::new("bafy-shared").unwrap();
    writer.append(&session, &fp, &cid, "diploma").await.unwrap();

    let resolution = reader.resolve(&fp).await.unwrap();
    assert_eq!(resolution.record().unwrap().owner, owner());
}

#[tokio::test]
async fn records_live_under_the_contract_directory() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = LocalLedger::open(dir.path(), contract()).unwrap();
    ledger
        .store_document(&owner(), "aa", "bafy-a", "x")
        .await
        .unwrap();

    let records = dir.path().join(contract().as_str());
    let names: Vec<String> = std::fs::read_dir(&records)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".json"));

    let other = Address::new("0x0000000000000000000000000000000000000001").unwrap();
    let separate = LocalLedger::open(dir.path(), other).unwrap();
    assert!(separate.is_empty().unwrap());
}

#[tokio::test]
async fn corrupt_record_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = LocalLedger::open(dir.path(), contract()).unwrap();
    ledger
        .store_document(&owner(), "aa", "bafy-a", "x")
        .await
        .unwrap();

    let records = dir.path().join(contract().as_str());
    let file = std::fs::read_dir(&records).unwrap().next().unwrap().unwrap();
    std::fs::write(file.path(), b"not json").unwrap();

    let err = ledger.verify_document("aa").await.unwrap_err();
    assert!(matches!(err, LedgerError::Storage { .. }));
}

#[tokio::test]
async fn contract_path_that_is_a_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(contract().as_str()), b"").unwrap();
    let err = LocalLedger::open(dir.path(), contract()).unwrap_err();
    assert!(matches!(err, LedgerError::Storage { .. }));
}

#[tokio::test]
async fn fresh_directory_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("ledger");
    let ledger = LocalLedger::open(&nested, contract()).unwrap();
    assert!(ledger.is_empty().unwrap());
    ledger
        .store_document(&owner(), "aa", "bafy-a", "x")
        .await
        .unwrap();
    assert!(nested.join(contract().as_str()).is_dir());
}
