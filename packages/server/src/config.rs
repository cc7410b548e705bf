//! Server configuration.

use std::time::Duration;

use crate::domain::Secret;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3333;
/// Upper bound for the whole secret/nickname exchange
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub secret: Secret,
    pub handshake_timeout: Duration,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, secret: Secret) -> Self {
        Self {
            host: host.into(),
            port,
            secret,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// `host:port`, bracketing IPv6 hosts.
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
