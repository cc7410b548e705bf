//! Error types for the chat relay server.

use std::time::Duration;

use thiserror::Error;

/// Errors that stop the whole server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be created
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The bound address could not be read back from the listener
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Ways a handshake can end without producing a session.
///
/// None of these are fatal: the connection is closed and the server carries on.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("I/O error during handshake: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed during handshake")]
    Closed,

    #[error("invalid secret key")]
    Rejected,

    #[error("handshake timed out after {0:?}")]
    TimedOut(Duration),

    #[error("server is shutting down")]
    ShuttingDown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Shutdown has started; no new sessions are admitted
    #[error("registry is closed")]
    Closed,
}
