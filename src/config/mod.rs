//! Configuration management
//!
//! This module handles loading and parsing configuration for the Dispatch
//! core. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Email (SMTP) configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Social-post channel configuration
    #[serde(default)]
    pub social: SocialConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/dispatch.db".to_string()
}

/// Email (SMTP) configuration for the notification email channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,
    /// From address for outgoing mail
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Display name for the From header
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: default_from_address(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "noreply@dispatch.example".to_string()
}

fn default_from_name() -> String {
    "Dispatch".to_string()
}

/// Social-post channel configuration.
///
/// Credentials are supplied externally. Empty values and the documented
/// placeholder values both count as "not configured" and cause the
/// channel to no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// API secret
    #[serde(default)]
    pub api_secret: String,
    /// Access token used as the bearer credential on post requests
    #[serde(default)]
    pub access_token: String,
    /// Access token secret
    #[serde(default)]
    pub access_token_secret: String,
    /// Endpoint posts are sent to
    #[serde(default = "default_social_endpoint")]
    pub endpoint: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            endpoint: default_social_endpoint(),
        }
    }
}

fn default_social_endpoint() -> String {
    "https://api.twitter.com/2/tweets".to_string()
}

impl SocialConfig {
    /// Check whether usable credentials are present.
    ///
    /// Freshly provisioned deployments ship `your-...` placeholder values;
    /// those are treated the same as missing credentials.
    pub fn is_configured(&self) -> bool {
        let values = [
            &self.api_key,
            &self.api_secret,
            &self.access_token,
            &self.access_token_secret,
        ];
        values
            .iter()
            .all(|v| !v.trim().is_empty() && !v.starts_with("your-"))
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - DISPATCH_DATABASE_URL
    /// - DISPATCH_SMTP_HOST / DISPATCH_SMTP_PORT
    /// - DISPATCH_SMTP_USERNAME / DISPATCH_SMTP_PASSWORD
    /// - DISPATCH_EMAIL_FROM / DISPATCH_EMAIL_FROM_NAME
    /// - DISPATCH_SOCIAL_API_KEY / DISPATCH_SOCIAL_API_SECRET
    /// - DISPATCH_SOCIAL_ACCESS_TOKEN / DISPATCH_SOCIAL_ACCESS_TOKEN_SECRET
    /// - DISPATCH_SOCIAL_ENDPOINT
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;

        if let Ok(url) = std::env::var("DISPATCH_DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(host) = std::env::var("DISPATCH_SMTP_HOST") {
            config.email.smtp_host = host;
        }
        if let Ok(port) = std::env::var("DISPATCH_SMTP_PORT") {
            if let Ok(port) = port.parse() {
                config.email.smtp_port = port;
            }
        }
        if let Ok(username) = std::env::var("DISPATCH_SMTP_USERNAME") {
            config.email.smtp_username = username;
        }
        if let Ok(password) = std::env::var("DISPATCH_SMTP_PASSWORD") {
            config.email.smtp_password = password;
        }
        if let Ok(from) = std::env::var("DISPATCH_EMAIL_FROM") {
            config.email.from_address = from;
        }
        if let Ok(from_name) = std::env::var("DISPATCH_EMAIL_FROM_NAME") {
            config.email.from_name = from_name;
        }
        if let Ok(key) = std::env::var("DISPATCH_SOCIAL_API_KEY") {
            config.social.api_key = key;
        }
        if let Ok(secret) = std::env::var("DISPATCH_SOCIAL_API_SECRET") {
            config.social.api_secret = secret;
        }
        if let Ok(token) = std::env::var("DISPATCH_SOCIAL_ACCESS_TOKEN") {
            config.social.access_token = token;
        }
        if let Ok(token_secret) = std::env::var("DISPATCH_SOCIAL_ACCESS_TOKEN_SECRET") {
            config.social.access_token_secret = token_secret;
        }
        if let Ok(endpoint) = std::env::var("DISPATCH_SOCIAL_ENDPOINT") {
            config.social.endpoint = endpoint;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.url, "data/dispatch.db");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.email.from_name, "Dispatch");
        assert!(!config.social.is_configured());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.database.url, "data/dispatch.db");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database:\n  url: \":memory:\"\nemail:\n  smtp_host: smtp.example.com"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.email.smtp_host, "smtp.example.com");
        // Untouched sections keep their defaults
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.social.endpoint, "https://api.twitter.com/2/tweets");
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database: [not: valid").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_social_placeholder_credentials_not_configured() {
        let social = SocialConfig {
            api_key: "your-api-key".to_string(),
            api_secret: "your-api-secret".to_string(),
            access_token: "your-access-token".to_string(),
            access_token_secret: "your-access-token-secret".to_string(),
            endpoint: default_social_endpoint(),
        };
        assert!(!social.is_configured());
    }

    #[test]
    fn test_social_real_credentials_configured() {
        let social = SocialConfig {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
            access_token: "t".to_string(),
            access_token_secret: "ts".to_string(),
            endpoint: default_social_endpoint(),
        };
        assert!(social.is_configured());
    }

    #[test]
    fn test_social_partial_credentials_not_configured() {
        let social = SocialConfig {
            api_key: "k".to_string(),
            ..SocialConfig::default()
        };
        assert!(!social.is_configured());
    }
}
