//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection error after connecting
    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection during the handshake
    #[error("Server closed the connection")]
    ServerClosed,

    /// The server refused the secret key
    #[error("Authentication failed: {0}")]
    Rejected(String),

    /// The user closed the input before the handshake completed
    #[error("Input closed before the handshake completed")]
    InputClosed,
}
