//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers that cross component
//! boundaries. String-based identifiers validate at construction time.
//!
//! - [`Address`]: a 20-byte ledger account, `0x` + 40 hex characters.
//!   Stored lower-case so equality is independent of checksum casing.
//! - [`ChainId`]: the numeric network identifier a wallet is connected to.
//! - [`ContentId`]: the opaque retrieval identifier returned by the content
//!   store.
//! - [`SessionIdentity`]: an address bound to the chain it was obtained on.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A ledger account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Validate and normalize an address.
    ///
    /// Returns [`ValidationError::InvalidAddress`] unless the input is `0x`
    /// (or `0X`) followed by exactly 40 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAddress(raw.clone()))?;
        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(raw));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// The all-zero address a ledger reports as the owner of an absent record.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// Whether this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    /// Access the normalized `0x`-prefixed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// A network (chain) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum Sepolia testnet.
    pub const SEPOLIA: ChainId = ChainId(11_155_111);

    /// Wrap a numeric chain id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse either a decimal (`11155111`) or a JSON-RPC hex quantity
    /// (`0xaa36a7`).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let v = value.trim();
        let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => v.parse::<u64>(),
        };
        parsed
            .map(Self)
            .map_err(|_| ValidationError::InvalidChainId(value.to_string()))
    }

    /// The numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A content-store retrieval identifier (for IPFS, a CID).
///
/// Opaque to everything except URL construction. An empty value is not a
/// valid identifier; absent identifiers are modeled as `Option<ContentId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Validate a retrieval identifier: non-empty, no whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidContentId(s));
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

/// The identity a wallet session was authorized for.
///
/// Returned by the ledger client's `connect` and passed explicitly into every
/// write. Carries the chain it was obtained on so a write can refuse to run
/// against a session from a different network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// The connected account.
    pub address: Address,
    /// The network the account was connected on.
    pub chain_id: ChainId,
}

impl SessionIdentity {
    /// Bind an address to a chain.
    pub fn new(address: Address, chain_id: ChainId) -> Self {
        Self { address, chain_id }
    }
}

impl std::fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.address, self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4";

    #[test]
    fn address_normalizes_to_lowercase() {
        let a = Address::new(ADDR).unwrap();
        assert_eq!(a.as_str(), "0x5b38da6a701c568545dcfcb03fcb875f56beddc4");
        assert_eq!(a, Address::new(ADDR.to_lowercase()).unwrap());
    }

    #[test]
    fn address_rejects_missing_prefix() {
        assert!(Address::new(&ADDR[2..]).is_err());
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!(Address::new("0x1234").is_err());
    }

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::zero().is_zero());
        assert!(!Address::new(ADDR).unwrap().is_zero());
    }

    #[test]
    fn address_serde_roundtrip_rejects_garbage() {
        let json = format!("\"{ADDR}\"");
        let a: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(a, Address::new(ADDR).unwrap());
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }

    #[test]
    fn chain_id_parses_decimal_and_hex() {
        assert_eq!(ChainId::parse("11155111").unwrap(), ChainId::SEPOLIA);
        assert_eq!(ChainId::parse("0xaa36a7").unwrap(), ChainId::SEPOLIA);
        assert_eq!(ChainId::parse("0x1").unwrap(), ChainId::new(1));
        assert!(ChainId::parse("sepolia").is_err());
    }

    #[test]
    fn content_id_rejects_empty_and_whitespace() {
        assert!(ContentId::new("").is_err());
        assert!(ContentId::new("bafy abc").is_err());
        assert_eq!(ContentId::new("bafyabc").unwrap().as_str(), "bafyabc");
    }

    #[test]
    fn session_identity_display() {
        let s = SessionIdentity::new(Address::new(ADDR).unwrap(), ChainId::SEPOLIA);
        assert_eq!(
            s.to_string(),
            "0x5b38da6a701c568545dcfcb03fcb875f56beddc4@11155111"
        );
    }
}
