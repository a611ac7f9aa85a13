//! Error types for the API client.

/// Broad failure class of a transport error, for callers that only need to
/// know which part of the round trip went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// TLS handshake or certificate verification.
    Tls,
    /// The server answered with a non-success status.
    HttpStatus,
    /// Anything else: connection, timeout, undecodable body, client setup.
    Other,
}

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// TLS handshake or certificate verification failed, or the configured
    /// CA bundle could not be loaded.
    #[error("TLS failure: {0}")]
    Tls(String),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The request could not be sent or the response could not be read.
    #[error("Request failed: {0}")]
    Network(String),
    /// The response body was not valid JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

impl Error {
    /// Returns the failure class of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Tls(_) => ErrorCategory::Tls,
            Self::HttpStatus { .. } => ErrorCategory::HttpStatus,
            Self::Network(_) | Self::Decode(_) | Self::Setup(_) => ErrorCategory::Other,
        }
    }
}
