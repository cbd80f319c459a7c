//! EVM contract client against a mock Ethereum JSON-RPC node.
//!
//! | Method | Test |
//! |--------|------|
//! | `eth_sendTransaction` + `eth_getTransactionReceipt` | `store_*` |
//! | `eth_call` | `verify_*` |

use std::time::Duration;

use docchain_core::{fingerprint, Address, ChainId, ContentId, Resolution};
use docchain_ledger::{
    EvmContract, Ledger, LedgerClient, LedgerConfig, LedgerContract, LedgerError, StaticWallet,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OWNER: &str = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4";
const CONTRACT: &str = "0xd9145cce52d386f254917e481eb44e9943f39138";
const TX: &str = "0x8f7a3c1e2b4d6f8091a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708";

fn owner() -> Address {
    Address::new(OWNER).unwrap()
}

fn contract_at(server: &MockServer) -> EvmContract {
    EvmContract::new(
        Url::parse(&server.uri()).unwrap(),
        Address::new(CONTRACT).unwrap(),
        5,
    )
    .unwrap()
    .with_receipt_polling(Duration::from_millis(10), 3)
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn rpc_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": 3, "message": message}
    }))
}

async fn mount_send(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_sendTransaction",
            "params": [{"from": OWNER, "to": CONTRACT}]
        })))
        .respond_with(rpc_result(json!(TX)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_receipt(server: &MockServer, status: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_getTransactionReceipt",
            "params": [TX]
        })))
        .respond_with(rpc_result(json!({
            "transactionHash": TX,
            "blockNumber": "0x6c8a1f",
            "status": status
        })))
        .mount(server)
        .await;
}

/// ABI return data for `(bool, address, uint256, string, string)`.
fn encoded_record(exists: bool, timestamp: u64, cid: &str, doc_type: &str) -> String {
    fn padded(s: &str) -> String {
        let hex: String = s.bytes().map(|b| format!("{b:02x}")).collect();
        let width = hex.len().div_ceil(64) * 64;
        format!("{:064x}{hex:0<width$}", s.len())
    }
    let a = padded(cid);
    let b = padded(doc_type);
    let off_a = 5 * 32;
    let off_b = off_a + a.len() / 2;
    format!(
        "0x{:064x}{:0>64}{timestamp:064x}{off_a:064x}{off_b:064x}{a}{b}",
        exists as u8,
        &OWNER[2..],
    )
}

// ── storeDocument ────────────────────────────────────────────────────

#[tokio::test]
async fn store_sends_encoded_call_and_waits_for_receipt() {
    let server = MockServer::start().await;
    mount_send(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!(null)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_receipt(&server, "0x1").await;

    let receipt = contract_at(&server)
        .store_document(&owner(), "ab12", "bafy-a", "diploma")
        .await
        .unwrap();
    assert_eq!(receipt.tx_hash, TX);
    assert_eq!(receipt.block_number, 0x6c8a1f);
    assert_eq!(receipt.from, owner());

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests[0].body_json().unwrap();
    let data = sent["params"][0]["data"].as_str().unwrap();
    assert!(data.starts_with("0xf2d893e4"));
    assert!(data.contains(&"bafy-a".bytes().map(|b| format!("{b:02x}")).collect::<String>()));
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn store_reverted_receipt_is_rejected() {
    let server = MockServer::start().await;
    mount_send(&server).await;
    mount_receipt(&server, "0x0").await;

    let err = contract_at(&server)
        .store_document(&owner(), "ab12", "bafy-a", "diploma")
        .await
        .unwrap_err();
    match err {
        LedgerError::Rejected { operation, reason } => {
            assert_eq!(operation, "storeDocument");
            assert!(reason.contains("reverted"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn store_duplicate_revert_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_error("execution reverted: document already exists"))
        .expect(1)
        .mount(&server)
        .await;

    let err = contract_at(&server)
        .store_document(&owner(), "ab12", "bafy-a", "diploma")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rejected { .. }));
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn store_never_mined_is_unavailable_after_poll_budget() {
    let server = MockServer::start().await;
    mount_send(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!(null)))
        .expect(3)
        .mount(&server)
        .await;

    let err = contract_at(&server)
        .store_document(&owner(), "ab12", "bafy-a", "diploma")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { .. }));
    assert!(err.to_string().contains("not mined after 3 polls"));
}

#[tokio::test]
async fn store_http_failure_is_unavailable_and_not_resent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = contract_at(&server)
        .store_document(&owner(), "ab12", "bafy-a", "diploma")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { .. }));
}

// ── verifyDocument ───────────────────────────────────────────────────

#[tokio::test]
async fn verify_decodes_the_record_tuple() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_call",
            "params": [{"to": CONTRACT}, "latest"]
        })))
        .respond_with(rpc_result(json!(encoded_record(
            true,
            1_768_478_400,
            "bafkreigh2akiscaildcqabsyg3dfr6chu3fgpregiymsck7e7aqa4s52zy",
            "diploma"
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let raw = contract_at(&server).verify_document("ab12").await.unwrap();
    assert!(raw.exists);
    assert_eq!(raw.owner, owner());
    assert_eq!(raw.timestamp, 1_768_478_400);
    assert_eq!(
        raw.content_id,
        "bafkreigh2akiscaildcqabsyg3dfr6chu3fgpregiymsck7e7aqa4s52zy"
    );
    assert_eq!(raw.doc_type, "diploma");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests[0].body_json().unwrap();
    assert!(sent["params"][0]["data"]
        .as_str()
        .unwrap()
        .starts_with("0xbeee5eb7"));
}

#[tokio::test]
async fn verify_empty_return_means_no_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x")))
        .mount(&server)
        .await;

    let err = contract_at(&server).verify_document("ab12").await.unwrap_err();
    assert!(matches!(err, LedgerError::Rejected { .. }));
    assert!(err.to_string().contains("no attestation contract deployed"));
}

// ── through the ledger client ────────────────────────────────────────

#[tokio::test]
async fn client_append_and_resolve_over_json_rpc() {
    let server = MockServer::start().await;
    mount_send(&server).await;
    mount_receipt(&server, "0x1").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(encoded_record(
            true,
            1_768_478_400,
            "bafy-a",
            "diploma"
        ))))
        .mount(&server)
        .await;

    let client = LedgerClient::new(
        StaticWallet::new(owner(), ChainId::SEPOLIA),
        contract_at(&server),
        LedgerConfig::for_contract(Address::new(CONTRACT).unwrap(), owner()),
    );
    let session = client.connect().await.unwrap();
    let fp = fingerprint(b"diploma bytes");
    let receipt = client
        .append(&session, &fp, &ContentId::new("bafy-a").unwrap(), "diploma")
        .await
        .unwrap();
    assert_eq!(receipt.tx_hash, TX);

    let resolution = client.resolve(&fp).await.unwrap();
    let record = resolution.record().unwrap();
    assert_eq!(record.owner, owner());
    assert_eq!(record.label, "diploma");
    assert_eq!(record.timestamp.to_rfc3339(), "2026-01-15T12:00:00+00:00");
}

#[tokio::test]
async fn client_resolve_absent_tuple_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!(encoded_record(false, 0, "", ""))))
        .mount(&server)
        .await;

    let client = LedgerClient::new(
        StaticWallet::locked(ChainId::SEPOLIA),
        contract_at(&server),
        LedgerConfig::for_contract(Address::new(CONTRACT).unwrap(), owner()),
    );
    let resolution = client.resolve(&fingerprint(b"unknown")).await.unwrap();
    assert_eq!(resolution, Resolution::NotFound);
}
