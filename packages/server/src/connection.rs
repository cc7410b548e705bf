//! Per-connection lifecycle: handshake, read loop, teardown.

use std::{net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::{Notify, broadcast},
};

use linechat_shared::{line::LineReader, time::timestamp_to_rfc3339};

use crate::{
    context::ServerContext,
    domain::{ConnectionId, LineWriter, Message, Nickname, Session},
    error::HandshakeError,
    infrastructure::StreamWriter,
    relay::RelayHandle,
};

/// Why a read loop stopped.
#[derive(Debug)]
enum ReadLoopEnd {
    /// The peer closed its side
    Eof,
    /// Reading failed; treated like a disconnect
    Failed(std::io::Error),
    /// The session was closed by shutdown
    Closed,
}

/// Drive one accepted connection until it is gone.
///
/// Every failure is contained here: a bad handshake or a broken connection
/// only ever ends this connection.
pub(crate) async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    context: Arc<ServerContext>,
    mut shutdown: broadcast::Receiver<()>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = LineReader::new(read_half);
    let mut writer = StreamWriter::new(write_half);

    let handshake = tokio::select! {
        outcome = context.authenticator.authenticate(&mut reader, &mut writer) => outcome,
        _ = shutdown.recv() => Err(HandshakeError::ShuttingDown),
    };

    let nickname = match handshake {
        Ok(nickname) => nickname,
        Err(HandshakeError::Rejected) => {
            tracing::info!("Client {} provided an invalid secret key, closing", peer);
            writer.close().await;
            return;
        }
        Err(e) => {
            tracing::debug!("Handshake with {} failed: {}", peer, e);
            writer.close().await;
            return;
        }
    };

    let id = ConnectionId::generate();
    let session = Session::new(
        id,
        nickname.clone(),
        context.clock.now_millis(),
        Box::new(writer),
    );
    let close_signal = session.close_signal();

    if let Err(e) = context.registry.join(session, &context.relay).await {
        tracing::debug!("Client '{}' from {} not admitted: {}", nickname, peer, e);
        return;
    }

    let end = read_loop(&mut reader, id, &nickname, &close_signal, &context.relay).await;
    match &end {
        ReadLoopEnd::Eof => tracing::debug!("Client '{}' ({}) closed the connection", nickname, id),
        ReadLoopEnd::Failed(e) => {
            tracing::warn!("Connection error for client '{}' ({}): {}", nickname, id, e)
        }
        ReadLoopEnd::Closed => tracing::debug!("Client '{}' ({}) closed by server", nickname, id),
    }

    if let Some(session) = context.registry.depart(id, &context.relay).await {
        let connected_for = context.clock.now_millis() - session.connected_at();
        tracing::info!(
            "Client '{}' disconnected (connected since {}, {} ms)",
            session.nickname(),
            timestamp_to_rfc3339(session.connected_at()),
            connected_for
        );
        session.release().await;
    }
}

/// Relay every line the client sends until the connection ends.
async fn read_loop<R>(
    reader: &mut LineReader<R>,
    origin: ConnectionId,
    nickname: &Nickname,
    close_signal: &Notify,
    relay: &RelayHandle,
) -> ReadLoopEnd
where
    R: AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            _ = close_signal.notified() => return ReadLoopEnd::Closed,
            line = reader.next_line() => match line {
                Ok(Some(body)) => {
                    relay.publish(Message::chat(origin, nickname.clone(), body));
                }
                Ok(None) => return ReadLoopEnd::Eof,
                Err(e) => return ReadLoopEnd::Failed(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::Authenticator,
        domain::{MessageKind, Secret},
        registry::Registry,
    };
    use linechat_shared::time::FixedClock;
    use std::time::Duration;
    use tokio::{
        io::{AsyncWriteExt, DuplexStream},
        sync::mpsc,
    };

    struct Harness {
        context: Arc<ServerContext>,
        queue: mpsc::UnboundedReceiver<Message>,
        shutdown: broadcast::Sender<()>,
    }

    impl Harness {
        fn new() -> Self {
            let (relay, queue) = RelayHandle::channel();
            let (shutdown, _) = broadcast::channel(1);
            let context = Arc::new(ServerContext {
                registry: Arc::new(Registry::new()),
                relay,
                authenticator: Authenticator::new(Secret::new("hunter2"), Duration::from_secs(5)),
                clock: Arc::new(FixedClock::new(1_700_000_000_000)),
            });
            Self {
                context,
                queue,
                shutdown,
            }
        }

        fn connect(&self) -> (tokio::task::JoinHandle<()>, DuplexStream) {
            let (server, client) = tokio::io::duplex(1024);
            let task = tokio::spawn(handle_connection(
                server,
                "127.0.0.1:40000".parse().unwrap(),
                self.context.clone(),
                self.shutdown.subscribe(),
            ));
            (task, client)
        }

        async fn next_message(&mut self) -> Message {
            tokio::time::timeout(Duration::from_secs(1), self.queue.recv())
                .await
                .unwrap()
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle_produces_join_chat_leave() {
        // テスト項目: 認証後の行は chat として、切断時は leave としてキューに入る
        // given (前提条件):
        let mut harness = Harness::new();
        let (task, mut client) = harness.connect();

        // when (操作):
        client
            .write_all(b"hunter2\nalice\nhello\n\nbye\r\n")
            .await
            .unwrap();
        let join = harness.next_message().await;
        let first = harness.next_message().await;
        let empty = harness.next_message().await;
        let last = harness.next_message().await;
        client.shutdown().await.unwrap();
        let leave = harness.next_message().await;
        task.await.unwrap();

        // then (期待する結果):
        assert_eq!(join.kind, MessageKind::Join);
        assert_eq!(first.render(), "[alice]: hello");
        assert_eq!(empty.render(), "[alice]: ");
        assert_eq!(last.render(), "[alice]: bye");
        assert_eq!(leave.kind, MessageKind::Leave);
        assert_eq!(leave.origin, join.origin);
        assert!(harness.context.registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejected_client_never_registers() {
        // テスト項目: 誤った secret のクライアントは登録されず、通知も発生しない
        // given (前提条件):
        let mut harness = Harness::new();
        let (task, mut client) = harness.connect();

        // when (操作):
        client.write_all(b"wrong\n").await.unwrap();
        task.await.unwrap();

        // then (期待する結果):
        assert!(harness.context.registry.is_empty().await);
        assert!(harness.queue.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_aborts_pending_handshake() {
        // テスト項目: シャットダウン時、ハンドシェイク中の接続はすぐに終了する
        // given (前提条件):
        let mut harness = Harness::new();
        let (task, _client) = harness.connect();
        tokio::task::yield_now().await;

        // when (操作):
        harness.shutdown.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(1), task).await;

        // then (期待する結果):
        assert!(finished.is_ok());
        assert!(harness.queue.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_all_ends_read_loop_with_leave() {
        // テスト項目: close_all で読み込みループが終了し、leave 通知が出る
        // given (前提条件):
        let mut harness = Harness::new();
        let (task, mut client) = harness.connect();
        client.write_all(b"hunter2\nbob\n").await.unwrap();
        let join = harness.next_message().await;

        // when (操作):
        harness.context.registry.close_all().await;
        let finished = tokio::time::timeout(Duration::from_secs(1), task).await;
        let leave = harness.next_message().await;

        // then (期待する結果):
        assert!(finished.is_ok());
        assert_eq!(leave.kind, MessageKind::Leave);
        assert_eq!(leave.origin, join.origin);
        assert!(harness.context.registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_oversized_line_ends_session_with_leave() {
        // テスト項目: 上限を超える行を送ったクライアントは切断され、leave 通知が出る
        // given (前提条件):
        let mut harness = Harness::new();
        let (task, mut client) = harness.connect();
        client.write_all(b"hunter2\nmallory\n").await.unwrap();
        let join = harness.next_message().await;

        // when (操作):
        let flood = tokio::spawn(async move {
            let chunk = vec![b'a'; 4096];
            while client.write_all(&chunk).await.is_ok() {}
        });
        let finished = tokio::time::timeout(Duration::from_secs(5), task).await;
        let leave = harness.next_message().await;
        flood.await.unwrap();

        // then (期待する結果):
        assert!(finished.is_ok());
        assert_eq!(leave.kind, MessageKind::Leave);
        assert_eq!(leave.origin, join.origin);
        assert!(harness.context.registry.is_empty().await);
    }
}
