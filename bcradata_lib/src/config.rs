//! Client configuration: base URL, certificate policy and validation strictness.

use std::path::PathBuf;

use bcra_api::TlsVerification;
use url::Url;

use crate::error::BcraError;
use crate::validation::Strictness;

/// Production base URL of the BCRA API.
pub const DEFAULT_BASE_URL: &str = "https://api.bcra.gob.ar";

/// Settings for a [`BcraClient`](crate::BcraClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub tls: TlsVerification,
    pub strictness: Strictness,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tls: TlsVerification::Platform,
            strictness: Strictness::Strict,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Trust an extra PEM certificate on top of the platform roots.
    pub fn with_ca_cert(self, path: impl Into<PathBuf>) -> Self {
        self.with_tls(TlsVerification::CustomCa(path.into()))
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Reads overrides from the environment on top of the defaults:
    ///
    /// - `BCRA_BASE_URL`: API root
    /// - `BCRA_CA_CERT`: path to an extra PEM certificate
    /// - `BCRA_VERIFY_SSL`: `0`, `false` or `no` disables verification
    /// - `BCRA_STRICT_VALIDATION`: `0`, `false` or `no` selects lenient validation
    ///
    /// A disabled `BCRA_VERIFY_SSL` wins over `BCRA_CA_CERT`.
    pub fn from_env() -> Result<Self, BcraError> {
        let mut config = Self::default();
        if let Some(base_url) = env_string("BCRA_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(path) = env_string("BCRA_CA_CERT") {
            config.tls = TlsVerification::CustomCa(PathBuf::from(path));
        }
        if !env_bool("BCRA_VERIFY_SSL", true) {
            config.tls = TlsVerification::Disabled;
        }
        if !env_bool("BCRA_STRICT_VALIDATION", true) {
            config.strictness = Strictness::Lenient;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks that the base URL parses as an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), BcraError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            BcraError::Config(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BcraError::Config(format!(
                "base URL '{}' must use http or https",
                self.base_url
            )));
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_string(key)
        .map(|val| parse_bool(&val).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.bcra.gob.ar");
        assert_eq!(config.tls, TlsVerification::Platform);
        assert_eq!(config.strictness, Strictness::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:9000")
            .with_ca_cert("/etc/ssl/bcra.pem")
            .with_strictness(Strictness::Lenient);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/bcra.pem"))
        );
        assert_eq!(config.strictness, Strictness::Lenient);
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let err = ClientConfig::default()
            .with_base_url("api.bcra.gob.ar")
            .validate()
            .unwrap_err();
        assert!(matches!(err, BcraError::Config(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::default()
            .with_base_url("ftp://api.bcra.gob.ar")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
