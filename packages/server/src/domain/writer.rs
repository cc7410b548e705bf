//! Outbound half of a client connection.
//!
//! The registry and the relay only ever talk to peers through this trait, so
//! the transport behind a session can be swapped (TCP in production, in-memory
//! pipes and mocks in tests).

use async_trait::async_trait;

/// Line-oriented writer owned by a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LineWriter: Send {
    /// Write `line` followed by `\n`.
    async fn write_line(&mut self, line: &str) -> std::io::Result<()>;

    /// Shut down the write direction. Writes after this fail.
    async fn close(&mut self);
}
