//! HTTP transport for the BCRA API.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::Error;

/// Request timeout for BCRA API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How server certificates are verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the bundled WebPKI roots.
    #[default]
    Platform,
    /// Additionally trust the PEM certificate at this path. The BCRA
    /// servers have at times served an incomplete chain; pointing this at the
    /// intermediate certificate fixes verification.
    CustomCa(PathBuf),
    /// Skip verification entirely. Not for production.
    Disabled,
}

/// A "GET this URL and give me JSON" collaborator.
///
/// [`Client`] is the production implementation; tests substitute fakes.
pub trait Transport {
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, Error>> + Send;
}

/// HTTP client for the BCRA API.
///
/// Holds one `reqwest::Client` with a 30-second timeout and the configured
/// certificate policy. Performs exactly one request per call and never retries.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// Creates a client that verifies certificates against the platform roots.
    pub fn new() -> Result<Self, Error> {
        Self::with_tls(&TlsVerification::Platform)
    }

    /// Creates a client with an explicit certificate policy.
    pub fn with_tls(tls: &TlsVerification) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("bcra_api/", env!("CARGO_PKG_VERSION")));

        match tls {
            TlsVerification::Platform => {}
            TlsVerification::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    tracing::error!("Failed to read CA bundle {}: {}", path.display(), e);
                    Error::Tls(format!("cannot read CA bundle {}: {}", path.display(), e))
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    Error::Tls(format!("invalid CA certificate {}: {}", path.display(), e))
                })?;
                builder = builder.add_root_certificate(cert);
            }
            TlsVerification::Disabled => {
                tracing::warn!("TLS certificate verification disabled; not recommended for production");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let http = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Setup(e.to_string())
        })?;
        Ok(Self { http })
    }

    /// Fetches `url` and parses the body as JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, Error> {
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let err = classify(&e);
                tracing::error!("Failed to get resource: {}", err);
                err
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Network(e.to_string())
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Decode(e.to_string())
        })
    }
}

impl Transport for Client {
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, Error>> + Send {
        self.fetch_json(url)
    }
}

/// Sorts a send failure into the TLS or generic network bucket by walking
/// its source chain; reqwest does not expose TLS errors as a distinct kind.
fn classify(err: &reqwest::Error) -> Error {
    let mut messages = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        messages.push(inner.to_string());
        source = inner.source();
    }
    let detail = messages.join(": ");
    let lower = detail.to_lowercase();
    if ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        Error::Tls(detail)
    } else {
        Error::Network(detail)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "ñ".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() <= 2000 + "...[truncated]".len());
    }

    #[test]
    fn client_creation_with_defaults() {
        assert!(Client::new().is_ok());
    }

    #[test]
    fn client_creation_without_verification() {
        assert!(Client::with_tls(&TlsVerification::Disabled).is_ok());
    }

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let err = Client::with_tls(&TlsVerification::CustomCa(PathBuf::from(
            "/nonexistent/bcra-ca.pem",
        )))
        .unwrap_err();
        assert_eq!(err.category(), crate::ErrorCategory::Tls);
    }
}
