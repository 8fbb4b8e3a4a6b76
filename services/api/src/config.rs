use std::net::{AddrParseError, SocketAddr};
use std::num::NonZeroU32;

use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid CCCD_LISTEN_ADDR: {0}")]
    ListenAddr(#[from] AddrParseError),

    #[error("CCCD_RATE_LIMIT_PER_MINUTE must be a positive integer, got {value:?}")]
    RateLimit { value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub rate_limit_per_minute: NonZeroU32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_addr = var("CCCD_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()?;

        let log_level = var("CCCD_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let rate_limit_per_minute = match var("CCCD_RATE_LIMIT_PER_MINUTE") {
            None => NonZeroU32::new(DEFAULT_RATE_LIMIT_PER_MINUTE).unwrap_or(NonZeroU32::MIN),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::RateLimit { value })?,
        };

        Ok(Self {
            listen_addr,
            log_level,
            rate_limit_per_minute,
        })
    }
}
