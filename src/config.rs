use secrecy::SecretString;
use std::env;
use std::path::PathBuf;

use crate::analysis::SeverityPolicy;
use crate::interaction_service::gemini::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_STATE_FILE: &str = ".interaction-checker/state.json";
pub const DEFAULT_LOG_FILTER: &str =
    "interaction_checker=info,tower_http=debug,axum::rejection=info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub api_key: SecretString,
    pub model: String,
    pub gemini_base_url: String,
    pub state_file: PathBuf,
    pub severity_policy: SeverityPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("'{}' is not a valid port number", raw),
            })?,
            None => 8080,
        };

        let severity_policy: SeverityPolicy = match lookup("SEVERITY_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "SEVERITY_POLICY",
                    message,
                })?,
            None => SeverityPolicy::default(),
        };

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("GEMINI_API_KEY"))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            api_key: SecretString::from(api_key),
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            state_file: lookup("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            severity_policy,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.severity_policy, SeverityPolicy::Lenient);
        assert_eq!(config.api_key.expose_secret(), "k");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("STATE_FILE", "/tmp/state.json"),
            ("SEVERITY_POLICY", "strict"),
        ]))
        .unwrap();
        assert_eq!(config.server_url(), "http://127.0.0.1:3000");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.state_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.severity_policy, SeverityPolicy::Strict);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("GEMINI_API_KEY")));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("SEVERITY_POLICY", "whatever"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SEVERITY_POLICY", .. }));
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let config =
            Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "super-secret-key")])).unwrap();
        assert!(!format!("{:?}", config).contains("super-secret-key"));
    }
}
