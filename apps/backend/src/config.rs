//! Server configuration read from the environment

use crate::error::{ApiError, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Seconds an unfinished quiz session may sit idle before it is dropped
    pub session_idle_secs: u64,
}

impl Config {
    /// Load from process environment (after `.env` has been applied)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::Config(format!("invalid PORT: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::Config(format!("invalid DATABASE_MAX_CONNECTIONS: {}", raw))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let session_idle_secs = match lookup("SESSION_IDLE_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::Config(format!("invalid SESSION_IDLE_SECS: {}", raw)))?,
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            session_idle_secs,
        })
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
