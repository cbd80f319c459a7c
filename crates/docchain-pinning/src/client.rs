//! Typed client for the pinning service.

use std::future::Future;
use std::time::Duration;

use docchain_core::ContentId;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::config::PinningConfig;
use crate::error::StoreError;

const PIN_FILE_PATH: &str = "pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "pinning/pinJSONToIPFS";
const AUTH_CHECK_PATH: &str = "data/testAuthentication";

/// A content-addressed store reachable over the network.
///
/// The orchestrator is generic over this trait so workflows can run against
/// the live pinning service or an in-process double.
pub trait ContentStore: Send + Sync {
    /// Report whether the store is reachable and the credential accepted.
    /// Never fails; any problem reads as `false`.
    fn probe(&self) -> impl Future<Output = bool> + Send;

    /// Upload `bytes` under a display `name`, returning the retrieval
    /// identifier. Exactly one network write.
    fn put(
        &self,
        bytes: Vec<u8>,
        name: &str,
    ) -> impl Future<Output = Result<ContentId, StoreError>> + Send;

    /// Pin a JSON document under a display `name`.
    fn put_json(
        &self,
        value: &serde_json::Value,
        name: &str,
    ) -> impl Future<Output = Result<ContentId, StoreError>> + Send;

    /// Build the retrieval URL for an identifier. An empty identifier yields
    /// an empty string.
    fn locate(&self, id: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash", default)]
    ipfs_hash: Option<String>,
}

/// HTTP client for a Pinata-compatible pinning API.
#[derive(Clone)]
pub struct PinningClient {
    http: reqwest::Client,
    api_base: String,
    gateway_base: String,
    jwt: Option<Zeroizing<String>>,
    cid_version: u8,
}

impl std::fmt::Debug for PinningClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningClient")
            .field("api_base", &self.api_base)
            .field("gateway_base", &self.gateway_base)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .field("cid_version", &self.cid_version)
            .finish()
    }
}

impl PinningClient {
    /// Create a client from configuration.
    pub fn new(config: PinningConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Misconfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_url.as_str().trim_end_matches('/').to_string(),
            gateway_base: config.gateway_url.as_str().trim_end_matches('/').to_string(),
            jwt: config.jwt,
            cid_version: config.cid_version,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.jwt
            .as_ref()
            .map(|t| t.as_str())
            .ok_or_else(|| StoreError::Misconfigured("pinning service JWT is missing".into()))
    }

    /// Call the authentication-check endpoint and return its JSON body.
    ///
    /// Diagnostic counterpart of [`ContentStore::probe`]: same request, but the
    /// failure reason is kept.
    pub async fn check_authentication(&self) -> Result<serde_json::Value, StoreError> {
        let endpoint = "GET /data/testAuthentication";
        let token = self.token()?;

        let resp = self
            .http
            .get(self.url(AUTH_CHECK_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })?;

        let (status, body) = read_body(endpoint, resp).await?;
        if !status.is_success() {
            return Err(StoreError::Rejected {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Rejected {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            body: format!("undecodable response ({e}): {body}"),
        })
    }

    /// Read a pin response, insisting on a non-empty `IpfsHash`.
    async fn read_pin_response(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<ContentId, StoreError> {
        let (status, body) = read_body(endpoint, resp).await?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PinResponse = serde_json::from_str(&body).map_err(|e| StoreError::Rejected {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            body: format!("undecodable response ({e}): {body}"),
        })?;

        parsed
            .ipfs_hash
            .and_then(|h| ContentId::new(h).ok())
            .ok_or_else(|| StoreError::Rejected {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                body: format!("response carried no IpfsHash; check credential permissions: {body}"),
            })
    }
}

impl ContentStore for PinningClient {
    async fn probe(&self) -> bool {
        let Some(token) = self.jwt.as_ref() else {
            tracing::debug!("pinning probe skipped: no credential configured");
            return false;
        };
        match self
            .http
            .get(self.url(AUTH_CHECK_PATH))
            .bearer_auth(token.as_str())
            .send()
            .await
        {
            Ok(resp) => {
                let ok = resp.status().is_success();
                tracing::debug!(status = resp.status().as_u16(), ok, "pinning probe answered");
                ok
            }
            Err(e) => {
                tracing::debug!(error = %e, "pinning probe failed");
                false
            }
        }
    }

    async fn put(&self, bytes: Vec<u8>, name: &str) -> Result<ContentId, StoreError> {
        let endpoint = "POST /pinning/pinFileToIPFS";
        let token = self.token()?;
        let size = bytes.len();

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(name.to_string()))
            .text("pinataMetadata", serde_json::json!({ "name": name }).to_string())
            .text(
                "pinataOptions",
                serde_json::json!({ "cidVersion": self.cid_version }).to_string(),
            );

        tracing::debug!(name, size, "uploading document to pinning service");

        let resp = self
            .http
            .post(self.url(PIN_FILE_PATH))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })?;

        let id = Self::read_pin_response(endpoint, resp).await?;
        tracing::info!(name, size, content_id = %id, "document pinned");
        Ok(id)
    }

    async fn put_json(&self, value: &serde_json::Value, name: &str) -> Result<ContentId, StoreError> {
        let endpoint = "POST /pinning/pinJSONToIPFS";
        let token = self.token()?;

        let body = serde_json::json!({
            "pinataContent": value,
            "pinataMetadata": { "name": name },
        });

        let resp = self
            .http
            .post(self.url(PIN_JSON_PATH))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })?;

        let id = Self::read_pin_response(endpoint, resp).await?;
        tracing::info!(name, content_id = %id, "JSON document pinned");
        Ok(id)
    }

    fn locate(&self, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }
        format!("{}/{}", self.gateway_base, id)
    }
}

/// Read the whole response body. A stream that breaks off mid-body is a
/// transport failure, not an answer.
async fn read_body(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<(reqwest::StatusCode, String), StoreError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| StoreError::Unavailable {
        endpoint: endpoint.into(),
        reason: format!("response body could not be read: {e}"),
    })?;
    Ok((status, body))
}
