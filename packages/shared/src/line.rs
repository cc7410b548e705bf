//! Newline-delimited line reader.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Longest line accepted, excluding the `\n` terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Reads `\n`-terminated lines from a byte stream.
///
/// The terminator and one trailing `\r` are stripped; invalid UTF-8 is
/// replaced lossily instead of failing the stream. A final line without a
/// terminator is returned before end-of-stream is reported. A line longer
/// than [`MAX_LINE_LEN`] fails with [`io::ErrorKind::InvalidData`].
///
/// [`next_line`](Self::next_line) is cancel safe: bytes consumed by a
/// cancelled call stay buffered and are returned by the next call.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Read the next line, `Ok(None)` at end-of-stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                break;
            }

            let (taken, terminated) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            self.buf.extend_from_slice(&available[..taken]);
            self.inner.consume(taken);

            let content_len = self.buf.len() - usize::from(terminated);
            if content_len > MAX_LINE_LEN {
                self.buf.clear();
                tracing::debug!("Rejected line longer than {} bytes", MAX_LINE_LEN);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes", MAX_LINE_LEN),
                ));
            }
            if terminated {
                break;
            }
        }

        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        match String::from_utf8(line) {
            Ok(line) => Ok(Some(line)),
            Err(e) => {
                tracing::debug!("Replaced invalid UTF-8 in incoming line");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }
}
