//! Configuration types and loading
//!
//! Defaults suit a local development run; `from_env` overlays the
//! conventional environment variables on top of them.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Profile photo storage configuration
    pub storage: StorageConfig,

    /// Instance-specific settings
    pub instance: InstanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Empty means "run on the in-memory store"
    pub url: String,
    pub pool_size: u32,
    pub pool_timeout_seconds: u64,
    /// Apply the bundled migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub max_body_size_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT secret for token signing
    pub jwt_secret: String,
    /// Token expiration in seconds
    pub token_expiration_seconds: u64,
    /// Session timeout in minutes
    pub session_timeout_minutes: u64,
    /// Password minimum length at signup
    pub password_min_length: usize,
    /// Password minimum length when resetting
    pub reset_password_min_length: usize,
    /// Lifetime of a password reset token in minutes
    pub reset_token_ttl_minutes: u64,
    /// Session cookie name
    pub cookie_name: String,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Local file storage path; empty keeps photos in memory
    pub local_path: String,
    /// Maximum profile photo size in bytes
    pub max_photo_size: usize,
    /// Accepted photo MIME types
    pub allowed_photo_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    /// Application title
    pub app_title: String,
    /// Load the demo dataset into an empty store
    pub seed_demo_data: bool,
    /// Time zone
    pub timezone: String,
    /// Date format
    pub date_format: String,
}

/// 5 MiB, the profile photo cap
pub const DEFAULT_MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: String::new(),
                pool_size: 10,
                pool_timeout_seconds: 5,
                run_migrations: true,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_seconds: 30,
                max_body_size_bytes: 8 * 1024 * 1024,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_expiration_seconds: 86400, // 24 hours
                session_timeout_minutes: 60 * 24,
                password_min_length: 6,
                reset_password_min_length: 8,
                reset_token_ttl_minutes: 60,
                cookie_name: "_buildtrack_session".to_string(),
                secure_cookies: false,
            },
            storage: StorageConfig {
                local_path: String::new(),
                max_photo_size: DEFAULT_MAX_PHOTO_SIZE,
                allowed_photo_types: vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/gif".to_string(),
                    "image/webp".to_string(),
                ],
            },
            instance: InstanceConfig {
                app_title: "BuildTrack".to_string(),
                seed_demo_data: true,
                timezone: "Asia/Dushanbe".to_string(),
                date_format: "%Y-%m-%d".to_string(),
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config file error: {0}")]
    FileError(String),
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Overlay the conventional environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Database
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(size) = parsed_env("DATABASE_POOL_SIZE")? {
            self.database.pool_size = size;
        }

        // Server
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = parsed_env("PORT")? {
            self.server.port = port;
        }

        // Auth
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = parsed_env("BUILDTRACK_TOKEN_TTL_SECONDS")? {
            self.auth.token_expiration_seconds = ttl;
        }
        if let Some(minutes) = parsed_env("BUILDTRACK_SESSION_TIMEOUT_MINUTES")? {
            self.auth.session_timeout_minutes = minutes;
        }
        if let Ok(v) = std::env::var("BUILDTRACK_SECURE_COOKIES") {
            self.auth.secure_cookies = parse_bool(&v);
        }

        // Storage
        if let Ok(path) = std::env::var("BUILDTRACK_STORAGE_PATH") {
            self.storage.local_path = path;
        }
        if let Some(max) = parsed_env("BUILDTRACK_MAX_PHOTO_BYTES")? {
            self.storage.max_photo_size = max;
        }

        // Instance
        if let Ok(title) = std::env::var("BUILDTRACK_APP_TITLE") {
            self.instance.app_title = title;
        }
        if let Ok(v) = std::env::var("BUILDTRACK_SEED_DEMO_DATA") {
            self.instance.seed_demo_data = parse_bool(&v);
        }
        if let Ok(tz) = std::env::var("TZ") {
            self.instance.timezone = tz;
        }

        self.validate()
    }

    /// Reject settings that cannot work at all
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "auth.jwt_secret".into(),
                message: "must not be empty".into(),
            });
        }
        if self.storage.max_photo_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "storage.max_photo_size".into(),
                message: "must be greater than zero".into(),
            });
        }
        self.server_addr()?;
        Ok(())
    }

    /// Whether a database URL was configured
    pub fn uses_database(&self) -> bool {
        !self.database.url.trim().is_empty()
    }

    /// Get the server address; the host must be an IP literal
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .host
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "server.host".into(),
                message: format!("{:?} is not an IP address: {}", self.server.host, e),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "true" | "1" | "yes")
}

fn parsed_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.password_min_length, 6);
        assert_eq!(config.storage.max_photo_size, 5 * 1024 * 1024);
        assert!(!config.uses_database());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_photo_types_are_images() {
        let config = AppConfig::default();
        assert!(config
            .storage
            .allowed_photo_types
            .iter()
            .all(|t| t.starts_with("image/")));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        let addr = config.server_addr().unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());

        let mut config = AppConfig::default();
        config.server.host = "::1".into();
        assert!(config.server_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_unparsable_host_rejected() {
        for host in ["localhost", "127.0.0.300", ""] {
            let mut config = AppConfig::default();
            config.server.host = host.into();
            assert!(config.server_addr().is_err(), "{host}");
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue { ref key, .. }) if key == "server.host"
            ));
        }
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("no"));
    }
}
