//! Shared-secret handshake.

use std::time::Duration;

use tokio::io::AsyncRead;

use linechat_shared::{
    line::LineReader,
    protocol::{REJECTION, SECRET_PROMPT, WELCOME_PROMPT},
};

use crate::{
    domain::{LineWriter, Nickname, Secret},
    error::HandshakeError,
};

/// Runs the secret/nickname exchange on a fresh connection.
///
/// The exchange is strictly ordered: secret prompt, secret, welcome prompt,
/// nickname. The whole exchange shares one deadline; once it succeeds the
/// connection has no timeout at all.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: Secret,
    timeout: Duration,
}

impl Authenticator {
    pub fn new(secret: Secret, timeout: Duration) -> Self {
        Self { secret, timeout }
    }

    /// Authenticate the peer, returning its nickname.
    ///
    /// On a wrong secret the rejection line is sent before
    /// [`HandshakeError::Rejected`] is returned. Closing the connection is
    /// left to the caller in every failure case.
    pub async fn authenticate<R, W>(
        &self,
        reader: &mut LineReader<R>,
        writer: &mut W,
    ) -> Result<Nickname, HandshakeError>
    where
        R: AsyncRead + Unpin + Send,
        W: LineWriter + ?Sized,
    {
        tokio::time::timeout(self.timeout, self.exchange(reader, writer))
            .await
            .unwrap_or(Err(HandshakeError::TimedOut(self.timeout)))
    }

    async fn exchange<R, W>(
        &self,
        reader: &mut LineReader<R>,
        writer: &mut W,
    ) -> Result<Nickname, HandshakeError>
    where
        R: AsyncRead + Unpin + Send,
        W: LineWriter + ?Sized,
    {
        writer.write_line(SECRET_PROMPT).await?;
        let submitted = reader.next_line().await?.ok_or(HandshakeError::Closed)?;

        if !self.secret.matches(&submitted) {
            if let Err(e) = writer.write_line(REJECTION).await {
                tracing::debug!("Failed to send rejection: {}", e);
            }
            return Err(HandshakeError::Rejected);
        }

        writer.write_line(WELCOME_PROMPT).await?;
        let nickname = reader.next_line().await?.ok_or(HandshakeError::Closed)?;

        Ok(Nickname::new(&nickname))
    }
}
