//! Ledger client error types.

use docchain_core::ChainId;

/// Errors from wallet and contract calls.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No contract address is configured. Raised before any call is made.
    #[error("ledger contract address is not configured (set DOCCHAIN_CONTRACT_ADDRESS)")]
    Unconfigured,

    /// The wallet or session is on a different network than required.
    #[error("wrong network: required chain id {required}, connected to chain id {actual}")]
    NetworkMismatch {
        /// The configured chain.
        required: ChainId,
        /// The chain the wallet or session is on.
        actual: ChainId,
    },

    /// The wallet granted access to no account.
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// The wallet or contract refused the call. Includes a write refused
    /// because a record for the fingerprint already exists.
    #[error("ledger rejected {operation}: {reason}")]
    Rejected {
        /// Contract function or JSON-RPC method that was refused.
        operation: String,
        /// Refusal reason, e.g. a revert message.
        reason: String,
    },

    /// The wallet or contract could not be reached, or a deadline expired.
    #[error("ledger unavailable during {operation}: {reason}")]
    Unavailable {
        /// Contract function or JSON-RPC method that could not complete.
        operation: String,
        /// Transport error or expiry description.
        reason: String,
    },

    /// The local reference ledger could not read or write a record file.
    #[error("ledger record store {path}: {source}")]
    Storage {
        /// File or directory the I/O failed on.
        path: String,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    pub(crate) fn rejected(operation: &str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(operation: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}
