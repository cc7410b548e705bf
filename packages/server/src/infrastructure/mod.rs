//! Infrastructure layer: concrete implementations of the domain ports.

pub mod stream_writer;

pub use stream_writer::StreamWriter;
