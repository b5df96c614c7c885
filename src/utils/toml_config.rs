//! TOML-based configuration for Postboard
//!
//! Settings are read from `postboard.toml`. Secrets never live in the file:
//! the `[auth]` section names the environment variable that carries the
//! signing secret, and `.env` is loaded before it is resolved.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! log_level = "info"
//!
//! [auth]
//! jwt_secret_env = "JWT_SECRET"
//! token_ttl_secs = 86400
//!
//! [database]
//! url = "./data/postboard.db"
//! ```

use crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use crate::types::DEFAULT_PROFILE_IMAGE;
use crate::validation::is_valid_url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "postboard.toml";

/// Root configuration structure loaded from postboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostboardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub profile: ProfileConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,

    #[serde(default = "default_min_secret_length")]
    pub min_secret_length: usize,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_min_secret_length() -> usize {
    32
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl(),
            min_secret_length: default_min_secret_length(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:` for an ephemeral database
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/postboard.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= Profile Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Image given to accounts that register without one
    #[serde(default = "default_profile_image")]
    pub default_image: String,
}

fn default_profile_image() -> String {
    DEFAULT_PROFILE_IMAGE.to_string()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_image: default_profile_image(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Secret in '{env}' must be at least {min} characters")]
    WeakSecret { env: String, min: usize },
}

impl PostboardConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration without checking it, e.g. to display it
    pub fn load_unvalidated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: PostboardConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// Validate the configuration and the availability of the signing secret
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret()?;
        if secret.len() < self.auth.min_secret_length {
            return Err(ConfigError::WeakSecret {
                env: self.auth.jwt_secret_env.clone(),
                min: self.auth.min_secret_length,
            });
        }

        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_secs must be positive".to_string(),
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }

        if !is_valid_url(&self.profile.default_image) {
            return Err(ConfigError::ValidationError(format!(
                "profile.default_image is not a valid URL: {}",
                self.profile.default_image
            )));
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// `host:port` the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(secret_env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"

[auth]
jwt_secret_env = "{secret_env}"
token_ttl_secs = 3600

[database]
url = ":memory:"
"#
        )
    }

    #[test]
    fn test_parse_config() {
        std::env::set_var(
            "POSTBOARD_TEST_SECRET_PARSE",
            "test-secret-at-least-32-characters-long",
        );

        let content = create_test_config("POSTBOARD_TEST_SECRET_PARSE");
        let config: PostboardConfig = toml::from_str(&content).expect("Failed to parse config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.profile.default_image, DEFAULT_PROFILE_IMAGE);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: PostboardConfig = toml::from_str("").expect("Failed to parse config");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.jwt_secret_env, "JWT_SECRET");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.auth.min_secret_length, 32);
        assert_eq!(config.database.url, "./data/postboard.db");
    }

    #[test]
    fn test_validation_missing_secret() {
        let content = create_test_config("POSTBOARD_TEST_SECRET_NEVER_SET");
        let config: PostboardConfig = toml::from_str(&content).expect("Failed to parse config");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(ref env)) if env == "POSTBOARD_TEST_SECRET_NEVER_SET"
        ));
    }

    #[test]
    fn test_validation_short_secret() {
        std::env::set_var("POSTBOARD_TEST_SECRET_SHORT", "too-short");

        let content = create_test_config("POSTBOARD_TEST_SECRET_SHORT");
        let config: PostboardConfig = toml::from_str(&content).expect("Failed to parse config");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSecret { min: 32, .. })
        ));
    }

    #[test]
    fn test_validation_non_positive_ttl() {
        std::env::set_var(
            "POSTBOARD_TEST_SECRET_TTL",
            "test-secret-at-least-32-characters-long",
        );

        let mut config: PostboardConfig =
            toml::from_str(&create_test_config("POSTBOARD_TEST_SECRET_TTL"))
                .expect("Failed to parse config");
        config.auth.token_ttl_secs = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PostboardConfig::load("/nonexistent/postboard.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("postboard.toml");
        std::fs::write(&path, "[server\nport = ").expect("write config");

        let result = PostboardConfig::load_unvalidated(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
