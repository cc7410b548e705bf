//! Authenticated participants.

use std::{fmt, sync::Arc};

use tokio::sync::Notify;
use uuid::Uuid;

use super::writer::LineWriter;

/// Identity of one accepted connection.
///
/// Nicknames may collide, so the relay uses this id to recognise the sender
/// of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name chosen during the handshake.
///
/// Trimmed of surrounding whitespace. Empty names and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(Arc<str>);

impl Nickname {
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connected, authenticated participant.
///
/// Owns the write half of its connection. The read half stays with the
/// connection task, which is woken through [`Session::close_signal`] when the
/// session is closed from outside.
pub struct Session {
    id: ConnectionId,
    nickname: Nickname,
    /// Unix timestamp when authenticated (UTC, milliseconds)
    connected_at: i64,
    writer: Box<dyn LineWriter>,
    close_signal: Arc<Notify>,
    open: bool,
}

impl Session {
    pub fn new(
        id: ConnectionId,
        nickname: Nickname,
        connected_at: i64,
        writer: Box<dyn LineWriter>,
    ) -> Self {
        Self {
            id,
            nickname,
            connected_at,
            writer,
            close_signal: Arc::new(Notify::new()),
            open: true,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Notified once when the session is closed via [`Session::close`].
    pub fn close_signal(&self) -> Arc<Notify> {
        self.close_signal.clone()
    }

    pub async fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_line(line).await
    }

    /// Shut down the connection and wake the task reading from it.
    ///
    /// The underlying writer is closed at most once.
    pub async fn close(&mut self) {
        if self.open {
            self.open = false;
            self.writer.close().await;
        }
        // notify_one keeps a permit, so a reader that is not parked yet still sees it
        self.close_signal.notify_one();
    }

    /// Consume the session, releasing its connection.
    pub async fn release(mut self) {
        self.close().await;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("nickname", &self.nickname)
            .field("connected_at", &self.connected_at)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::writer::MockLineWriter;

    #[test]
    fn test_nickname_is_trimmed() {
        // テスト項目: ニックネームの前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice \r\n";

        // when (操作):
        let nickname = Nickname::new(raw);

        // then (期待する結果):
        assert_eq!(nickname.as_str(), "alice");
    }

    #[test]
    fn test_empty_nickname_is_allowed() {
        // テスト項目: 空のニックネームも受け付ける
        // given (前提条件):
        let raw = "\n";

        // when (操作):
        let nickname = Nickname::new(raw);

        // then (期待する結果):
        assert_eq!(nickname.as_str(), "");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 接続 ID は接続ごとに異なる
        // given (前提条件):

        // when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_close_releases_writer_once() {
        // テスト項目: close を複数回呼んでも writer は一度だけ閉じられる
        // given (前提条件):
        let mut writer = MockLineWriter::new();
        writer.expect_close().times(1).return_const(());
        let mut session = Session::new(
            ConnectionId::generate(),
            Nickname::new("alice"),
            0,
            Box::new(writer),
        );

        // when (操作):
        session.close().await;
        session.release().await;

        // then (期待する結果):
        // MockLineWriter verifies `times(1)` on drop
    }

    #[tokio::test]
    async fn test_close_signal_fires_before_reader_waits() {
        // テスト項目: 読み込み側が待機する前に close されても通知が失われない
        // given (前提条件):
        let mut writer = MockLineWriter::new();
        writer.expect_close().return_const(());
        let mut session = Session::new(
            ConnectionId::generate(),
            Nickname::new("alice"),
            0,
            Box::new(writer),
        );
        let signal = session.close_signal();

        // when (操作):
        session.close().await;
        let woke =
            tokio::time::timeout(std::time::Duration::from_millis(100), signal.notified()).await;

        // then (期待する結果):
        assert!(woke.is_ok());
        assert!(!session.is_open());
    }
}
