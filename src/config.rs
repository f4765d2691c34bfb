//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Minimum accepted length of `JWT_SECRET`.
pub const MIN_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Authentication ===
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,

    /// Issuer written to and required in tokens.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,

    /// Lifetime of issued tokens in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the issue routes are nested under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Browser origin allowed by CORS (the frontend dev server).
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_issuer() -> String {
    "lab-issues".to_string()
}

fn default_token_ttl() -> u64 {
    1440 // 24h
}

fn default_port() -> u16 {
    8080
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:5174".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Configuration with defaults for everything except the secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            jwt_issuer: default_issuer(),
            token_ttl_minutes: default_token_ttl(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origin: default_cors_origin(),
            rust_log: default_log_level(),
            log_json: false,
            verbose: false,
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            ));
        }

        if self.token_ttl_minutes == 0 {
            return Err("TOKEN_TTL_MINUTES must be greater than 0".to_string());
        }

        if !self.api_prefix.starts_with('/') {
            return Err("API_PREFIX must start with '/'".to_string());
        }

        if self.cors_origin.is_empty() {
            return Err("CORS_ORIGIN must not be empty".to_string());
        }

        Ok(())
    }

    /// API prefix without a trailing slash, or `None` when mounted at the root.
    pub fn normalized_prefix(&self) -> Option<&str> {
        let trimmed = self.api_prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_port(), 8080);
        assert_eq!(default_api_prefix(), "/api");
        assert_eq!(default_cors_origin(), "http://localhost:5174");
        assert_eq!(default_token_ttl(), 1440);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(Config::with_secret(SECRET).validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_secret() {
        let config = Config::with_secret("too-short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = Config::with_secret(SECRET);
        config.token_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_prefix() {
        let mut config = Config::with_secret(SECRET);
        config.api_prefix = "api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalized_prefix_trims_slashes() {
        let mut config = Config::with_secret(SECRET);
        assert_eq!(config.normalized_prefix(), Some("/api"));

        config.api_prefix = "/mudldapps/api/".to_string();
        assert_eq!(config.normalized_prefix(), Some("/mudldapps/api"));

        config.api_prefix = "/".to_string();
        assert_eq!(config.normalized_prefix(), None);
    }
}
