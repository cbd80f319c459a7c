//! # EVM JSON-RPC Contract
//!
//! The attestation record contract deployed on an EVM chain (Sepolia by
//! default), reached over Ethereum JSON-RPC.
//!
//! ## How It Works
//!
//! 1. `storeDocument` is ABI-encoded by hand and sent with
//!    `eth_sendTransaction`. The RPC endpoint signs for `from`; this client
//!    holds no keys.
//! 2. `eth_getTransactionReceipt` is polled until the transaction is mined.
//!    Receipt status `0x1` confirms the write; `0x0` means it reverted.
//! 3. `verifyDocument` goes through `eth_call` against `latest` and the
//!    returned `(bool, address, uint256, string, string)` is decoded into a
//!    [`RawRecord`].
//!
//! A duplicate fingerprint reverts with "document already exists". Nodes
//! usually report that while estimating gas, as a JSON-RPC error on
//! `eth_sendTransaction`; either way it surfaces as
//! [`LedgerError::Rejected`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use docchain_core::{Address, TransactionReceipt};
use serde_json::{json, Value};
use url::Url;

use crate::contract::{LedgerContract, RawRecord};
use crate::error::LedgerError;

/// keccak256("storeDocument(string,string,string)")[..4]
const STORE_DOCUMENT_SELECTOR: [u8; 4] = [0xf2, 0xd8, 0x93, 0xe4];

/// keccak256("verifyDocument(string)")[..4]
const VERIFY_DOCUMENT_SELECTOR: [u8; 4] = [0xbe, 0xee, 0x5e, 0xb7];

const WORD: usize = 32;

/// Attestation record contract on an EVM chain.
#[derive(Debug)]
pub struct EvmContract {
    http: reqwest::Client,
    rpc_url: Url,
    address: Address,
    poll_interval: Duration,
    max_polls: u32,
    next_id: AtomicU64,
}

impl EvmContract {
    /// Create a client for the contract at `address` behind `rpc_url`.
    ///
    /// Defaults to polling for a receipt every 2 s, 90 times.
    pub fn new(rpc_url: Url, address: Address, timeout_secs: u64) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LedgerError::unavailable("contract_init", e.to_string()))?;
        Ok(Self {
            http,
            rpc_url,
            address,
            poll_interval: Duration::from_secs(2),
            max_polls: 90,
            next_id: AtomicU64::new(1),
        })
    }

    /// Set how often and how many times to poll for a receipt.
    pub fn with_receipt_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    /// The JSON-RPC endpoint.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Send a JSON-RPC request and return its `result`.
    ///
    /// Reads are retried on transient transport failures; a transaction is
    /// sent exactly once.
    async fn rpc_call(&self, method: &str, params: Value, read: bool) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let send = || self.http.post(self.rpc_url.clone()).json(&body).send();

        let sent = if read {
            crate::retry::retry_send(method, send).await
        } else {
            send().await
        };
        let resp = sent.map_err(|e| {
            if e.is_timeout() {
                LedgerError::unavailable(method, "request timed out")
            } else {
                LedgerError::unavailable(method, e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LedgerError::unavailable(method, format!("HTTP {status}")));
        }

        let mut decoded: Value = resp
            .json()
            .await
            .map_err(|e| LedgerError::unavailable(method, format!("invalid JSON response: {e}")))?;

        if let Some(error) = decoded.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(LedgerError::rejected(method, message));
        }

        match decoded.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(LedgerError::rejected(
                method,
                "JSON-RPC response missing 'result' field",
            )),
        }
    }

    /// Poll for the receipt of `tx_hash` until it is mined or the poll
    /// budget runs out.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Value, LedgerError> {
        const OP: &str = "eth_getTransactionReceipt";
        for poll in 1..=self.max_polls {
            let receipt = self.rpc_call(OP, json!([tx_hash]), true).await?;
            if !receipt.is_null() {
                return Ok(receipt);
            }
            tracing::debug!(tx_hash, poll, "transaction pending");
            if poll < self.max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        Err(LedgerError::unavailable(
            OP,
            format!(
                "transaction {tx_hash} not mined after {} polls",
                self.max_polls
            ),
        ))
    }
}

impl LedgerContract for EvmContract {
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
        const OP: &str = "storeDocument";
        let data = encode_call(STORE_DOCUMENT_SELECTOR, &[hash, content_id, doc_type]);
        let tx = json!({
            "from": from.as_str(),
            "to": self.address.as_str(),
            "data": data,
        });

        let tx_hash = self
            .rpc_call("eth_sendTransaction", json!([tx]), false)
            .await?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                LedgerError::rejected(OP, "eth_sendTransaction returned non-string result")
            })?;
        tracing::info!(tx_hash = %tx_hash, "storeDocument submitted, waiting for receipt");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => {}
            Some("0x0") => {
                return Err(LedgerError::rejected(
                    OP,
                    format!("transaction {tx_hash} reverted"),
                ))
            }
            other => {
                return Err(LedgerError::rejected(
                    OP,
                    format!("receipt for {tx_hash} has unexpected status {other:?}"),
                ))
            }
        }
        let block_number = receipt
            .get("blockNumber")
            .and_then(Value::as_str)
            .and_then(parse_quantity)
            .ok_or_else(|| {
                LedgerError::rejected(OP, format!("receipt for {tx_hash} has no block number"))
            })?;

        Ok(TransactionReceipt {
            tx_hash,
            block_number,
            from: from.clone(),
        })
    }

    async fn verify_document(&self, hash: &str) -> Result<RawRecord, LedgerError> {
        const OP: &str = "verifyDocument";
        let call = json!({
            "to": self.address.as_str(),
            "data": encode_call(VERIFY_DOCUMENT_SELECTOR, &[hash]),
        });
        let result = self.rpc_call("eth_call", json!([call, "latest"]), true).await?;
        let data = result
            .as_str()
            .ok_or_else(|| LedgerError::rejected(OP, "eth_call returned non-string result"))?;
        if data == "0x" {
            return Err(LedgerError::rejected(
                OP,
                format!("no attestation contract deployed at {}", self.address),
            ));
        }
        decode_record(data).map_err(|reason| LedgerError::rejected(OP, reason))
    }
}

// ─── ABI encoding ────────────────────────────────────────────────────────

/// `0x`-prefixed calldata: selector followed by the head/tail encoding of a
/// tuple of dynamic `string` arguments.
fn encode_call(selector: [u8; 4], args: &[&str]) -> String {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    for arg in args {
        head.extend_from_slice(&uint_word((args.len() * WORD + tail.len()) as u64));
        tail.extend_from_slice(&uint_word(arg.len() as u64));
        tail.extend_from_slice(arg.as_bytes());
        tail.resize(tail.len().next_multiple_of(WORD), 0);
    }
    let mut out = String::with_capacity(2 + 2 * (4 + head.len() + tail.len()));
    out.push_str("0x");
    for b in selector.iter().chain(&head).chain(&tail) {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn uint_word(n: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&n.to_be_bytes());
    word
}

/// Decode `(bool, address, uint256, string, string)` return data.
fn decode_record(data: &str) -> Result<RawRecord, String> {
    let bytes = decode_hex(data).ok_or_else(|| format!("return data is not hex: {data}"))?;
    if bytes.len() < 5 * WORD {
        return Err(format!(
            "return data too short: {} bytes, expected at least {}",
            bytes.len(),
            5 * WORD
        ));
    }
    let word = |i: usize| &bytes[i * WORD..(i + 1) * WORD];

    let exists = word(0).iter().any(|b| *b != 0);
    let owner_hex: String = word(1)[12..].iter().map(|b| format!("{b:02x}")).collect();
    let owner = Address::new(format!("0x{owner_hex}")).map_err(|e| e.to_string())?;
    let timestamp = word_to_u64(word(2)).ok_or("timestamp does not fit in 64 bits")?;
    let content_id = decode_string(&bytes, word(3))?;
    let doc_type = decode_string(&bytes, word(4))?;

    Ok(RawRecord {
        exists,
        owner,
        timestamp,
        content_id,
        doc_type,
    })
}

fn word_to_u64(word: &[u8]) -> Option<u64> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Some(u64::from_be_bytes(tail))
}

fn decode_string(bytes: &[u8], offset_word: &[u8]) -> Result<String, String> {
    let offset = word_to_u64(offset_word)
        .and_then(|o| usize::try_from(o).ok())
        .ok_or("string offset out of range")?;
    let len_word = bytes
        .get(offset..offset.saturating_add(WORD))
        .ok_or("string offset past end of data")?;
    let len = word_to_u64(len_word)
        .and_then(|l| usize::try_from(l).ok())
        .ok_or("string length out of range")?;
    let start = offset + WORD;
    let body = bytes
        .get(start..start.saturating_add(len))
        .ok_or("string runs past end of data")?;
    String::from_utf8(body.to_vec()).map_err(|e| format!("string is not UTF-8: {e}"))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect()
}

fn parse_quantity(s: &str) -> Option<u64> {
    u64::from_str_radix(s.strip_prefix("0x")?, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_words(calldata: &str) -> Vec<String> {
        calldata[10..]
            .as_bytes()
            .chunks(64)
            .map(|c| String::from_utf8(c.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn verify_calldata_layout() {
        let data = encode_call(VERIFY_DOCUMENT_SELECTOR, &["abc"]);
        assert!(data.starts_with("0xbeee5eb7"));
        let words = hex_words(&data);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0], format!("{:064x}", 0x20));
        assert_eq!(words[1], format!("{:064x}", 3));
        assert_eq!(words[2], format!("{:0<64}", "616263"));
    }

    #[test]
    fn store_calldata_offsets_account_for_padding() {
        let long = "a".repeat(33);
        let data = encode_call(STORE_DOCUMENT_SELECTOR, &[&long, "", "x"]);
        assert!(data.starts_with("0xf2d893e4"));
        let words = hex_words(&data);
        assert_eq!(words[0], format!("{:064x}", 0x60));
        // 0x60 + length word + two words of data.
        assert_eq!(words[1], format!("{:064x}", 0xc0));
        // empty string: length word only.
        assert_eq!(words[2], format!("{:064x}", 0xe0));
        assert_eq!(words.len(), 3 + 3 + 1 + 2);
    }

    fn encoded_record(exists: bool, timestamp: u64, cid: &str, doc_type: &str) -> String {
        let mut out = String::from("0x");
        out.push_str(&format!("{:064x}", exists as u8));
        out.push_str(&format!(
            "{:0>64}",
            "5b38da6a701c568545dcfcb03fcb875f56beddc4"
        ));
        out.push_str(&format!("{timestamp:064x}"));
        let tail_a = encode_call([0; 4], &[cid, doc_type]);
        // Reuse the string tail layout, shifted past the three fixed words.
        let words = hex_words(&tail_a);
        let off_a = u64::from_str_radix(&words[0], 16).unwrap() + 3 * 32;
        let off_b = u64::from_str_radix(&words[1], 16).unwrap() + 3 * 32;
        out.push_str(&format!("{off_a:064x}{off_b:064x}"));
        for w in &words[2..] {
            out.push_str(w);
        }
        out
    }

    #[test]
    fn record_is_decoded() {
        let raw = decode_record(&encoded_record(true, 1_768_478_400, "bafy-a", "diploma")).unwrap();
        assert!(raw.exists);
        assert_eq!(raw.owner.as_str(), "0x5b38da6a701c568545dcfcb03fcb875f56beddc4");
        assert_eq!(raw.timestamp, 1_768_478_400);
        assert_eq!(raw.content_id, "bafy-a");
        assert_eq!(raw.doc_type, "diploma");
    }

    #[test]
    fn sparse_record_is_decoded() {
        let raw = decode_record(&encoded_record(true, 1, "", "")).unwrap();
        assert!(raw.exists);
        assert!(raw.content_id.is_empty());
        assert!(raw.doc_type.is_empty());
    }

    #[test]
    fn truncated_data_is_an_error() {
        let full = encoded_record(true, 1, "bafy-a", "diploma");
        assert!(decode_record(&full[..full.len() - 64]).is_err());
        assert!(decode_record("0x00").is_err());
        assert!(decode_record("0xzz").is_err());
    }

    #[test]
    fn oversized_timestamp_is_an_error() {
        let mut data = encoded_record(true, 1, "a", "b");
        // Set a high byte of the timestamp word.
        data.replace_range(2 + 128..2 + 130, "ff");
        assert!(decode_record(&data).is_err());
    }

    #[test]
    fn quantities_are_hex() {
        assert_eq!(parse_quantity("0x1b4"), Some(436));
        assert_eq!(parse_quantity("436"), None);
    }
}
