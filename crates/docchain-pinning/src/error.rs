//! Content store error types.

/// Errors from content store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required setting (usually the bearer credential) is absent.
    /// Raised before any network activity.
    #[error("content store misconfigured: {0}")]
    Misconfigured(String),

    /// The request never produced a complete HTTP response (connect, TLS,
    /// timeout, or a body cut off mid-stream).
    #[error("content store unavailable calling {endpoint}: {reason}")]
    Unavailable {
        /// Method and path of the call, e.g. `POST /pinning/pinFileToIPFS`.
        endpoint: String,
        /// Transport error text.
        reason: String,
    },

    /// The service answered with a non-success status, or with a success
    /// status but no usable identifier.
    #[error("content store {endpoint} rejected the request ({status}): {body}")]
    Rejected {
        /// Method and path of the call.
        endpoint: String,
        /// HTTP status of the answer.
        status: u16,
        /// Response body, or a description of why it was unusable.
        body: String,
    },
}

impl StoreError {
    /// Whether the failure happened before anything reached the network.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::Misconfigured(_))
    }
}
