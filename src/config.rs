// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honoured for local
//! development.

use std::env;
use std::time::Duration;

/// Where the browser lands after a successful sign-in.
pub const HOME_HREF: &str = "/";
/// Where the browser lands after a successful sign-up.
pub const SIGN_IN_HREF: &str = "/auth/sign-in";

/// Deployment environment. Only production gets `Secure` cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "local" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::Invalid("APP_ENV", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Public URL of this app (CORS origin)
    pub app_url: String,
    /// Base URL of the identity backend
    pub backend_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound for every call to the backend
    pub backend_timeout: Duration,
    /// Claim that must be present in a refresh token for a session to be created
    pub identity_claim: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            environment: Environment::Test,
            app_url: "http://localhost:3000".to_string(),
            backend_url: "http://localhost:3005".to_string(),
            port: 3000,
            backend_timeout: Duration::from_secs(10),
            identity_claim: "Email".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = match env::var("APP_ENV") {
            Ok(raw) => Environment::parse(&raw)?,
            Err(_) => Environment::Development,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 3000,
        };

        let backend_timeout = match env::var("BACKEND_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("BACKEND_TIMEOUT_SECS", raw))?,
            Err(_) => Duration::from_secs(10),
        };

        Ok(Self {
            environment,
            app_url: env::var("APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3005".to_string()),
            port,
            backend_timeout,
            identity_claim: env::var("SESSION_IDENTITY_CLAIM")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "Email".to_string()),
        })
    }

    /// Cookies carry the `Secure` attribute only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
