//! Configuration for the craftform client.
//!
//! A [`ClientConfig`] is built once: defaults, then the environment, then any
//! explicit [`ConfigOverrides`] (typically read from a file or CLI flags).
//! It is immutable once handed to [`crate::Client`].

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Address used when neither the environment nor an override names one.
pub const DEFAULT_ADDRESS: &str = "http://localhost:8080";

/// Base path on which the API is served.
pub const DEFAULT_BASE_PATH: &str = "/";

/// Environment variable naming the service address.
pub const ADDRESS_ENV: &str = "MINECRAFT_ADDRESS";

/// Host-level address override; wins over [`ADDRESS_ENV`] when set.
pub const HOSTNAME_ENV: &str = "MINECRAFT_HOSTNAME";

/// Connection settings for the resource API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the service, e.g. `http://localhost:8080`.
    #[serde(default = "default_address")]
    pub address: String,

    /// Path prefix under which the API is served.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Headers added to every request.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// Per-request timeout applied by the HTTP transport.
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,

    /// Outbound rate limit shared by every call through one client.
    #[serde(default)]
    pub rate_limit: RateLimit,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            base_path: default_base_path(),
            headers: default_headers(),
            timeout: default_timeout(),
            rate_limit: RateLimit::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults layered with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults layered with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let address = [HOSTNAME_ENV, ADDRESS_ENV]
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());

        Self::default().layer(ConfigOverrides {
            address,
            ..ConfigOverrides::default()
        })
    }

    /// Apply every non-blank override on top of this configuration.
    ///
    /// Headers merge per name, compared case-insensitively, so an override
    /// replaces a default header without dropping the others.
    #[must_use]
    pub fn layer(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(address) = non_blank(overrides.address) {
            self.address = address;
        }
        if let Some(base_path) = non_blank(overrides.base_path) {
            self.base_path = base_path;
        }
        for (name, value) in overrides.headers {
            set_header(&mut self.headers, name, value);
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }
        if let Some(rate_limit) = overrides.rate_limit {
            self.rate_limit = rate_limit;
        }
        self
    }

    /// Set the address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the base path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Add or replace a default header. Names compare case-insensitively.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the outbound rate limit.
    #[must_use]
    pub const fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Resolve the address and base path into the URL every request path is
    /// joined onto. The path always ends in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] when the address does not parse or is
    /// not an `http`/`https` URL.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.address)
            .map_err(|e| Error::invalid_address(&self.address, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::invalid_address(
                &self.address,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let mut path = self.base_path.clone();
        if !path.ends_with('/') {
            path.push('/');
        }
        url.set_path(&path);
        Ok(url)
    }
}

/// Optional values layered over a [`ClientConfig`]; blank means "keep".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(with = "opt_duration_secs", default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
}

impl ConfigOverrides {
    /// Load overrides from a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a config error if
    /// it is neither valid JSON (`.json`) nor valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // JSON by extension, TOML otherwise
        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse config: {e}")))
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse config: {e}")))
        }
    }
}

/// Token-bucket parameters: a steady rate and the burst admitted at once.
///
/// A `per_second` of zero disables limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl RateLimit {
    pub const fn new(per_second: u32, burst: u32) -> Self {
        Self { per_second, burst }
    }

    /// No limiting at all.
    pub const fn unlimited() -> Self {
        Self::new(0, 1)
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(10, default_burst())
    }
}

/// HTTP header names are case-insensitive; the newest spelling wins.
fn set_header(headers: &mut BTreeMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_burst() -> u32 {
    10
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod opt_duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.address, "http://localhost:8080");
        assert_eq!(config.base_path, "/");
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(config.rate_limit, RateLimit::new(10, 10));
    }

    #[test]
    fn test_from_lookup_uses_address_env() {
        let config = ClientConfig::from_lookup(|key| {
            (key == ADDRESS_ENV).then(|| "http://mc.internal:9000".to_string())
        });
        assert_eq!(config.address, "http://mc.internal:9000");
    }

    #[test]
    fn test_hostname_env_wins_over_address_env() {
        let config = ClientConfig::from_lookup(|key| match key {
            HOSTNAME_ENV => Some("http://host-level:8080".to_string()),
            ADDRESS_ENV => Some("http://sdk-level:8080".to_string()),
            _ => None,
        });
        assert_eq!(config.address, "http://host-level:8080");
    }

    #[test]
    fn test_blank_env_falls_back_to_default() {
        let config = ClientConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_layer_merges_headers_and_ignores_blanks() {
        let overrides = ConfigOverrides {
            address: Some(String::new()),
            base_path: Some("/api/v1".to_string()),
            headers: BTreeMap::from([("Authorization".to_string(), "Bearer t".to_string())]),
            timeout: Some(Duration::from_secs(5)),
            rate_limit: None,
        };
        let config = ClientConfig::default().layer(overrides);

        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.base_path, "/api/v1");
        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit, RateLimit::default());
    }

    #[test]
    fn test_header_override_replaces_default_regardless_of_case() {
        let overrides = ConfigOverrides {
            headers: BTreeMap::from([(
                "content-type".to_string(),
                "application/vnd.api+json".to_string(),
            )]),
            ..ConfigOverrides::default()
        };
        let config = ClientConfig::default().layer(overrides);

        assert_eq!(
            config.headers,
            BTreeMap::from([(
                "content-type".to_string(),
                "application/vnd.api+json".to_string()
            )])
        );

        let config = config.header("CONTENT-TYPE", "text/plain");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(
            config.headers.get("CONTENT-TYPE").map(String::as_str),
            Some("text/plain")
        );
    }

    #[test]
    fn test_base_url_appends_trailing_slash() {
        let url = ClientConfig::default()
            .address("http://localhost:8080")
            .base_path("/api")
            .base_url()
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = ClientConfig::default()
            .address("::not a url::")
            .base_url()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_base_url_rejects_non_http_scheme() {
        let err = ClientConfig::default()
            .address("ftp://localhost")
            .base_url()
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_overrides_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("craftform.toml");
        std::fs::write(
            &path,
            r#"
address = "http://10.0.0.5:8080"
timeout = 12

[rate_limit]
per_second = 2
burst = 1

[headers]
X-Api-Key = "secret"
"#,
        )
        .unwrap();

        let overrides = ConfigOverrides::from_file(&path).unwrap();
        assert_eq!(overrides.address.as_deref(), Some("http://10.0.0.5:8080"));
        assert_eq!(overrides.timeout, Some(Duration::from_secs(12)));
        assert_eq!(overrides.rate_limit, Some(RateLimit::new(2, 1)));

        let config = ClientConfig::default().layer(overrides);
        assert!(config.headers.contains_key("X-Api-Key"));
        assert!(config.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_overrides_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("craftform.json");
        std::fs::write(&path, r#"{ "base_path": "/minecraft" }"#).unwrap();

        let overrides = ConfigOverrides::from_file(&path).unwrap();
        assert_eq!(overrides.base_path.as_deref(), Some("/minecraft"));
        assert_eq!(overrides.timeout, None);
    }
}
