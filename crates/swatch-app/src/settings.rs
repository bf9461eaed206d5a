//! Runtime settings from the environment.
//!
//! | Variable       | Default                    |
//! |----------------|----------------------------|
//! | `SWATCH_HOST`  | `127.0.0.1`                |
//! | `SWATCH_PORT`  | `3000`                     |
//! | `DATABASE_URL` | `sqlite://dev.db?mode=rwc` |
//! | `SWATCH_ENV`   | `development`              |
//!
//! Loading a `.env` file is left to the binary, before anything reads the
//! environment.

use std::net::SocketAddr;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://dev.db?mode=rwc";
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid SWATCH_PORT '{value}': {message}")]
    InvalidPort { value: String, message: String },

    #[error("invalid listen address {host}:{port}")]
    InvalidAddress { host: String, port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub environment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl Settings {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("SWATCH_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| SettingsError::InvalidPort {
                    message: e.to_string(),
                    value,
                })?,
            None => defaults.port,
        };

        Ok(Self {
            host: get("SWATCH_HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            environment: get("SWATCH_ENV").unwrap_or(defaults.environment),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| SettingsError::InvalidAddress {
                host: self.host.clone(),
                port: self.port,
            })
    }
}
