//! Custom handler configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Port variable set by the host for the custom handler.
pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
/// Optional host variable; empty or unset binds all interfaces.
pub const HOST_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_HOST";

const DEFAULT_HOST: &str = "0.0.0.0";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// Configuration for the custom handler listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Invocation timeout in seconds.
    pub request_timeout: u64,
    /// Seconds to wait for in-flight invocations on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            shutdown_timeout: 10,
        }
    }
}

impl HandlerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the host's custom handler variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(port) = lookup(PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(host) = lookup(HOST_ENV).filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        Ok(config)
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    pub fn shutdown_timeout(mut self, seconds: u64) -> Self {
        self.shutdown_timeout = seconds;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub(crate) fn shutdown_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}
