//! # Error Types
//!
//! Structured errors for the foundational types, built with `thiserror`.
//! Validation errors carry the rejected input and the expected format so a
//! misconfigured address or a truncated fingerprint is diagnosable from the
//! message alone.

use thiserror::Error;

/// The byte source of a document could not be fully read.
///
/// The fingerprint engine never hashes a partial read; any I/O failure is
/// surfaced with the original message intact.
#[derive(Error, Debug)]
pub enum HashError {
    /// Reading the source failed part way or before the first byte.
    #[error("failed to read {source_name}: {source}")]
    Read {
        /// Human-readable name of the byte source (usually a path).
        source_name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for identifier newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fingerprint is not 64 hexadecimal characters.
    #[error("invalid fingerprint: \"{0}\" (expected 64 hex characters)")]
    InvalidFingerprint(String),

    /// Address is not `0x` followed by 40 hexadecimal characters.
    #[error("invalid address: \"{0}\" (expected 0x followed by 40 hex characters)")]
    InvalidAddress(String),

    /// Content identifier is empty or contains whitespace.
    #[error("invalid content identifier: \"{0}\"")]
    InvalidContentId(String),

    /// Chain identifier could not be parsed as a decimal or `0x` quantity.
    #[error("invalid chain id: \"{0}\"")]
    InvalidChainId(String),
}
