//! Sandbox endpoint configuration.
//!
//! Loaded from the environment (optionally seeded by a `.env` file) or from a
//! TOML file; the terminal driver layers its CLI flags on top.
//!
//! ENV vars: CODERUNNER_SANDBOX_URL, CODERUNNER_API_KEY,
//! CODERUNNER_API_KEY_HEADER, CODERUNNER_BASE64, CODERUNNER_WAIT,
//! CODERUNNER_TIMEOUT_SECS

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_KEY_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid sandbox URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Base URL of the Judge0-compatible service, e.g. `http://localhost:2358`.
    pub sandbox_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default = "default_true")]
    pub base64_encoded: bool,
    #[serde(default = "default_true")]
    pub wait: bool,
    /// No timeout unless set; a run is bounded by the sandbox's own limits
    /// and by the user's Stop.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sandbox_url: "http://localhost:2358".to_string(),
            api_key: None,
            api_key_header: default_api_key_header(),
            base64_encoded: true,
            wait: true,
            request_timeout_secs: None,
        }
    }
}

impl RunnerConfig {
    pub fn new(sandbox_url: impl Into<String>) -> Self {
        Self {
            sandbox_url: sandbox_url.into(),
            ..Self::default()
        }
    }

    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sandbox_url = lookup("CODERUNNER_SANDBOX_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("CODERUNNER_SANDBOX_URL"))?;

        let cfg = Self {
            sandbox_url,
            api_key: lookup("CODERUNNER_API_KEY").filter(|v| !v.is_empty()),
            api_key_header: lookup("CODERUNNER_API_KEY_HEADER")
                .unwrap_or_else(default_api_key_header),
            base64_encoded: parse_flag("CODERUNNER_BASE64", lookup("CODERUNNER_BASE64"))?
                .unwrap_or(true),
            wait: parse_flag("CODERUNNER_WAIT", lookup("CODERUNNER_WAIT"))?.unwrap_or(true),
            request_timeout_secs: lookup("CODERUNNER_TIMEOUT_SECS")
                .map(|v| {
                    v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                        key: "CODERUNNER_TIMEOUT_SECS",
                        value: v.clone(),
                    })
                })
                .transpose()?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "sandbox_url",
                value: self.sandbox_url.clone(),
            });
        }
        if self.api_key_header.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "api_key_header",
                value: self.api_key_header.clone(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.sandbox_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.sandbox_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_defaults() {
        let cfg = RunnerConfig::from_lookup(lookup(&[("CODERUNNER_SANDBOX_URL", "http://judge:2358")]))
            .unwrap();
        assert_eq!(cfg.sandbox_url, "http://judge:2358");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.api_key_header, DEFAULT_API_KEY_HEADER);
        assert!(cfg.base64_encoded);
        assert!(cfg.wait);
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn env_overrides() {
        let cfg = RunnerConfig::from_lookup(lookup(&[
            ("CODERUNNER_SANDBOX_URL", "https://judge0.example.com"),
            ("CODERUNNER_API_KEY", "secret"),
            ("CODERUNNER_API_KEY_HEADER", "X-RapidAPI-Key"),
            ("CODERUNNER_BASE64", "off"),
            ("CODERUNNER_WAIT", "0"),
            ("CODERUNNER_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.api_key_header, "X-RapidAPI-Key");
        assert!(!cfg.base64_encoded);
        assert!(!cfg.wait);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn env_errors() {
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingVar("CODERUNNER_SANDBOX_URL"))
        ));
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[
                ("CODERUNNER_SANDBOX_URL", "http://judge"),
                ("CODERUNNER_BASE64", "maybe"),
            ])),
            Err(ConfigError::InvalidValue { key: "CODERUNNER_BASE64", .. })
        ));
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[
                ("CODERUNNER_SANDBOX_URL", "http://judge"),
                ("CODERUNNER_TIMEOUT_SECS", "soon"),
            ])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[("CODERUNNER_SANDBOX_URL", "not a url")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = RunnerConfig::new("ftp://judge");
        assert!(cfg.validate().is_err());

        cfg.sandbox_url = "http://judge".into();
        cfg.api_key_header = " ".into();
        assert!(cfg.validate().is_err());

        cfg.api_key_header = DEFAULT_API_KEY_HEADER.into();
        cfg.request_timeout_secs = Some(0);
        assert!(cfg.validate().is_err());

        cfg.request_timeout_secs = Some(5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sandbox_url = "http://127.0.0.1:2358"
api_key = "k"
base64_encoded = false
"#
        )
        .unwrap();

        let cfg = RunnerConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.sandbox_url, "http://127.0.0.1:2358");
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert!(!cfg.base64_encoded);
        assert!(cfg.wait);
        assert_eq!(cfg.api_key_header, DEFAULT_API_KEY_HEADER);
    }

    #[test]
    fn toml_errors() {
        assert!(matches!(
            RunnerConfig::from_toml_str("sandbox_url = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RunnerConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
