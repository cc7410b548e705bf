//! Interactive terminal client for the linechat relay server.

pub mod error;
pub mod session;
pub mod ui;

pub use error::ClientError;
pub use session::{run_client, server_addr};
