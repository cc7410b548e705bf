//! Domain types of the chat relay.
//!
//! The domain layer defines the ports it needs (`LineWriter`); concrete
//! transports live in the infrastructure layer.

pub mod message;
pub mod secret;
pub mod session;
pub mod writer;

pub use message::{Message, MessageKind};
pub use secret::Secret;
pub use session::{ConnectionId, Nickname, Session};
pub use writer::LineWriter;
