//! Line-oriented TCP chat relay.
//!
//! Clients pass a shared-secret handshake, pick a nickname, and every line they
//! send afterwards is relayed to all other connected clients.
//!
//! - [`auth`]: the secret/nickname handshake
//! - [`registry`]: who is currently connected
//! - [`relay`]: ordered fan-out of join, chat and leave messages
//! - [`server`]: accept loop and graceful shutdown

// layers
pub mod domain;
pub mod infrastructure;

// components
pub mod auth;
pub mod config;
mod connection;
mod context;
pub mod error;
pub mod registry;
pub mod relay;
pub mod server;
pub mod signal;

pub use config::ServerConfig;
pub use domain::{ConnectionId, Message, MessageKind, Nickname, Secret, Session};
pub use error::{HandshakeError, RegistryError, ServerError};
pub use registry::Registry;
pub use server::ChatServer;
