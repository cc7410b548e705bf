//! Code shared by the linechat server and client: the wire protocol, a line
//! reader, logging setup and time helpers.

pub mod line;
pub mod logger;
pub mod protocol;
pub mod time;
