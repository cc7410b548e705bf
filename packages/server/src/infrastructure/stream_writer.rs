//! `LineWriter` over any Tokio byte stream.
//!
//! Connections are accepted and split in the connection handler; this
//! implementation only receives the write half and frames lines onto it.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::domain::LineWriter;

/// Frames lines onto an `AsyncWrite` (a TCP write half in production).
pub struct StreamWriter<W> {
    inner: W,
}

impl<W> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<W> LineWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let mut frame = String::with_capacity(line.len() + 1);
        frame.push_str(line);
        frame.push('\n');

        self.inner.write_all(frame.as_bytes()).await?;
        self.inner.flush().await
    }

    async fn close(&mut self) {
        if let Err(e) = self.inner.shutdown().await {
            tracing::debug!("Failed to shut down connection: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linechat_shared::line::LineReader;

    #[tokio::test]
    async fn test_write_line_appends_newline() {
        // テスト項目: 書き込んだ行に改行が付与される
        // given (前提条件):
        let (local, remote) = tokio::io::duplex(64);
        let mut writer = StreamWriter::new(local);
        let mut reader = LineReader::new(remote);

        // when (操作):
        writer.write_line("[alice]: hello").await.unwrap();

        // then (期待する結果):
        let line = reader.next_line().await.unwrap();
        assert_eq!(line.as_deref(), Some("[alice]: hello"));
    }

    #[tokio::test]
    async fn test_close_ends_remote_stream() {
        // テスト項目: close すると相手側は EOF を受け取る
        // given (前提条件):
        let (local, remote) = tokio::io::duplex(64);
        let mut writer = StreamWriter::new(local);
        let mut reader = LineReader::new(remote);

        // when (操作):
        writer.close().await;

        // then (期待する結果):
        let line = reader.next_line().await.unwrap();
        assert_eq!(line, None);
    }
}
