//! Bounded backoff for idempotent wallet reads.
//!
//! Only transient transport failures (connect, timeout, request I/O) are
//! retried. A JSON-RPC error object, a non-2xx status, or an undecodable
//! body is a definitive answer and is handled by the caller on the first
//! attempt. Contract writes never go through here.

use std::time::Duration;

/// Delay before each retry; its length is the retry budget.
const BACKOFF_MS: [u64; 3] = [200, 400, 800];

/// Send an idempotent request, retrying transient transport failures.
///
/// `send` is called at most `BACKOFF_MS.len() + 1` times.
pub(crate) async fn retry_send<F, Fut>(
    operation: &str,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delays = BACKOFF_MS.iter();
    let mut attempt = 1u32;
    loop {
        let err = match send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if !is_transient(&e) => return Err(e),
            Err(e) => e,
        };
        let Some(&ms) = delays.next() else {
            tracing::warn!(operation, attempts = attempt, error = %err, "wallet unreachable, giving up");
            return Err(err);
        };
        tracing::warn!(
            operation,
            attempt,
            retry_in_ms = ms,
            error = %err,
            "wallet request failed, retrying"
        );
        tokio::time::sleep(Duration::from_millis(ms)).await;
        attempt += 1;
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request()
}
