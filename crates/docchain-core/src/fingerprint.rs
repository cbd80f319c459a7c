//! # Fingerprint Engine
//!
//! Computes the deterministic content hash that keys every attestation
//! record. A fingerprint is SHA-256 over the document's exact bytes,
//! rendered as 64 lowercase hex characters.
//!
//! ## Interoperability Invariant
//!
//! Identical byte sequences always produce identical fingerprints, in any
//! language, on any machine. There is no canonicalization step, no
//! normalization of line endings, and no metadata mixed into the hash: a
//! record anchored by a browser client computing `SHA-256(file)` must verify
//! against a fingerprint computed here.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{HashError, ValidationError};

/// A 256-bit content fingerprint.
///
/// Holds the raw digest; [`Fingerprint::to_hex`] and `Display` render the
/// lowercase hex form used as the ledger key. Serializes as that hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex fingerprint. Upper-case input is accepted
    /// and normalized; the rendered form is always lower-case.
    pub fn parse(hex: &str) -> Result<Self, ValidationError> {
        let trimmed = hex.trim();
        if trimmed.len() != 64 {
            return Err(ValidationError::InvalidFingerprint(hex.to_string()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in trimmed.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(chunk[0]);
            let lo = hex_value(chunk[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => bytes[i] = (hi << 4) | lo,
                _ => return Err(ValidationError::InvalidFingerprint(hex.to_string())),
            }
        }
        Ok(Self(bytes))
    }

    /// Access the raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Fingerprint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the fingerprint of an in-memory byte sequence.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let hash = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    Fingerprint(out)
}

/// Compute the fingerprint of everything `reader` yields until EOF.
///
/// A read error at any point aborts with [`HashError::Read`]; no digest over
/// a prefix of the input is ever returned.
pub fn fingerprint_reader<R: Read>(
    source_name: &str,
    mut reader: R,
) -> Result<Fingerprint, HashError> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher).map_err(|e| HashError::Read {
        source_name: source_name.to_string(),
        source: e,
    })?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Ok(Fingerprint(out))
}

/// Compute the fingerprint of a file on disk.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, HashError> {
    let name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| HashError::Read {
        source_name: name.clone(),
        source: e,
    })?;
    fingerprint_reader(&name, file)
}
