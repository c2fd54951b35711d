use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Connection settings of one Proxmox VE cluster.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// API base URL, e.g. `https://pve1:8006/api2/json/`.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Authentication realm (`pam`, `pve`, ...).
    pub realm: String,
    /// Skip TLS certificate verification (self-signed cluster certificates).
    pub insecure_tls: bool,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:8006/api2/json/".to_string(),
            username: "root".to_string(),
            password: String::new(),
            realm: "pam".to_string(),
            insecure_tls: false,
            timeout_ms: 30_000,
        }
    }
}

impl ClusterConfig {
    /// Parsed endpoint, normalised to end with `/` so relative paths join below it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.endpoint.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// Rules:
    /// - endpoint is an http(s) URL;
    /// - username and realm are set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.realm.trim().is_empty() {
            return Err(ConfigError::Missing("realm"));
        }
        Ok(())
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .field("insecure_tls", &self.insecure_tls)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClusterConfig::default();
        assert_eq!(cfg.realm, "pam");
        assert_eq!(cfg.timeout_ms, 30_000);
        assert!(!cfg.insecure_tls);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let cfg = ClusterConfig {
            endpoint: "https://pve1:8006/api2/json".into(),
            ..ClusterConfig::default()
        };
        let url = cfg.base_url().unwrap();
        assert_eq!(url.as_str(), "https://pve1:8006/api2/json/");
        assert_eq!(
            url.join("cluster/resources").unwrap().as_str(),
            "https://pve1:8006/api2/json/cluster/resources"
        );
    }

    #[test]
    fn rejects_bad_endpoint_and_missing_user() {
        let cfg = ClusterConfig {
            endpoint: "ftp://pve1/".into(),
            ..ClusterConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidEndpoint { .. })));

        let cfg = ClusterConfig {
            username: " ".into(),
            ..ClusterConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Missing("username"))));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = ClusterConfig {
            password: "hunter2".into(),
            ..ClusterConfig::default()
        };
        let s = format!("{cfg:?}");
        assert!(!s.contains("hunter2"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn partial_deserialization() {
        let cfg: ClusterConfig =
            serde_json::from_str(r#"{"endpoint": "https://10.0.0.2:8006/api2/json/", "insecure_tls": true}"#)
                .unwrap();
        assert!(cfg.insecure_tls);
        assert_eq!(cfg.username, "root");
    }
}
