//! Pinning service configuration.
//!
//! Defaults point at the public Pinata API and gateway. Override via
//! environment variables or explicit construction for staging and tests.

use url::Url;
use zeroize::Zeroizing;

/// Default pinning API base.
pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";

/// Default retrieval gateway base.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

/// Configuration for the pinning service client.
///
/// Custom `Debug` implementation redacts the `jwt` field to prevent
/// credential leakage in log output.
#[derive(Clone)]
pub struct PinningConfig {
    /// Base URL of the pinning API.
    pub api_url: Url,
    /// Base URL that retrieval identifiers are appended to.
    pub gateway_url: Url,
    /// Bearer credential. Absence is not an error until an upload is attempted.
    pub jwt: Option<Zeroizing<String>>,
    /// CID version requested for uploads.
    pub cid_version: u8,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningConfig")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .field("cid_version", &self.cid_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PinningConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DOCCHAIN_PINATA_JWT` (optional here; required for uploads)
    /// - `DOCCHAIN_PINATA_API_URL` (default: `https://api.pinata.cloud`)
    /// - `DOCCHAIN_GATEWAY_URL` (default: `https://gateway.pinata.cloud/ipfs`)
    /// - `DOCCHAIN_CID_VERSION` (default: 1)
    /// - `DOCCHAIN_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = std::env::var("DOCCHAIN_PINATA_JWT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Zeroizing::new);

        let cid_version = match std::env::var("DOCCHAIN_CID_VERSION") {
            Ok(raw) => match raw.trim() {
                "0" => 0,
                "1" => 1,
                _ => return Err(ConfigError::InvalidValue("DOCCHAIN_CID_VERSION".into(), raw)),
            },
            Err(_) => 1,
        };

        Ok(Self {
            api_url: env_url("DOCCHAIN_PINATA_API_URL", DEFAULT_API_URL)?,
            gateway_url: env_url("DOCCHAIN_GATEWAY_URL", DEFAULT_GATEWAY_URL)?,
            jwt,
            cid_version,
            timeout_secs: env_timeout("DOCCHAIN_TIMEOUT_SECS", 30)?,
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    ///
    /// The gateway is `{base}/ipfs`.
    pub fn local_mock(base: &str, jwt: Option<&str>) -> Result<Self, ConfigError> {
        let api_url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?;
        let gateway_raw = format!("{}/ipfs", base.trim_end_matches('/'));
        let gateway_url = Url::parse(&gateway_raw)
            .map_err(|e| ConfigError::InvalidUrl(gateway_raw.clone(), e.to_string()))?;
        Ok(Self {
            api_url,
            gateway_url,
            jwt: jwt.map(|t| Zeroizing::new(t.to_string())),
            cid_version: 1,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// A positive number of seconds; unset or blank means `default`.
fn env_timeout(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue(var.to_string(), raw)),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL variable could not be parsed.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// A variable held a value outside its allowed set.
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = PinningConfig::local_mock("http://127.0.0.1:9000", Some("jwt")).unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.gateway_url.as_str(), "http://127.0.0.1:9000/ipfs");
        assert_eq!(cfg.cid_version, 1);
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn debug_redacts_jwt() {
        let cfg = PinningConfig::local_mock("http://127.0.0.1:9000", Some("super-secret")).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("DOCCHAIN_NONEXISTENT_VAR_8812", DEFAULT_GATEWAY_URL).unwrap();
        assert_eq!(url.as_str(), "https://gateway.pinata.cloud/ipfs");
    }

    #[test]
    fn malformed_timeout_names_the_variable() {
        std::env::set_var("DOCCHAIN_TEST_TIMEOUT_PIN", "30s");
        let result = env_timeout("DOCCHAIN_TEST_TIMEOUT_PIN", 30);
        std::env::remove_var("DOCCHAIN_TEST_TIMEOUT_PIN");
        match result {
            Err(ConfigError::InvalidValue(var, raw)) => {
                assert_eq!(var, "DOCCHAIN_TEST_TIMEOUT_PIN");
                assert_eq!(raw, "30s");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        std::env::set_var("DOCCHAIN_TEST_TIMEOUT_ZERO_PIN", "0");
        let result = env_timeout("DOCCHAIN_TEST_TIMEOUT_ZERO_PIN", 30);
        std::env::remove_var("DOCCHAIN_TEST_TIMEOUT_ZERO_PIN");
        assert!(matches!(result, Err(ConfigError::InvalidValue(..))));
    }

    #[test]
    fn timeout_defaults_when_absent() {
        assert_eq!(env_timeout("DOCCHAIN_NONEXISTENT_VAR_8813", 30).unwrap(), 30);
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("DOCCHAIN_TEST_BAD_URL_PIN", "not a url");
        let result = env_url("DOCCHAIN_TEST_BAD_URL_PIN", DEFAULT_API_URL);
        std::env::remove_var("DOCCHAIN_TEST_BAD_URL_PIN");
        assert!(result.is_err());
    }
}
