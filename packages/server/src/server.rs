//! Listener, accept loop and shutdown coordination.

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};

use linechat_shared::time::{Clock, SystemClock};

use crate::{
    auth::Authenticator,
    config::ServerConfig,
    connection::handle_connection,
    context::ServerContext,
    error::ServerError,
    registry::Registry,
    relay::Relay,
};

/// Line-oriented chat relay server.
///
/// # Example
///
/// ```no_run
/// use linechat_server::{ChatServer, ServerConfig, Secret};
///
/// # async fn example() -> Result<(), linechat_server::ServerError> {
/// let config = ServerConfig::new("127.0.0.1", 3333, Secret::new("hunter2"));
/// let server = ChatServer::bind(config).await?;
/// server.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatServer {
    listener: TcpListener,
    config: ServerConfig,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
}

impl ChatServer {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            config,
            registry: Arc::new(Registry::new()),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// The registry of this server, for inspection.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Serve until `shutdown` completes, then shut down gracefully.
    ///
    /// Shutdown runs in a fixed order: stop accepting, abort pending
    /// handshakes, close every session, wait for every connection task, and
    /// only then stop the relay. Every leave notice is therefore enqueued
    /// before the relay channel closes.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let local_addr = self.local_addr()?;
        let Self {
            listener,
            config,
            registry,
            clock,
        } = self;

        let (relay, relay_task) = Relay::spawn(registry.clone());
        let (abort_handshakes, _) = broadcast::channel::<()>(1);
        let context = Arc::new(ServerContext {
            registry: registry.clone(),
            relay,
            authenticator: Authenticator::new(config.secret, config.handshake_timeout),
            clock,
        });

        tracing::info!("Chat server listening on {}", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        connections.spawn(handle_connection(
                            stream,
                            peer,
                            context.clone(),
                            abort_handshakes.subscribe(),
                        ));
                    }
                    Err(e) => tracing::warn!("Error accepting connection: {}", e),
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        tracing::error!("Connection task failed: {}", e);
                    }
                }
            }
        }

        tracing::info!("Shutting down server...");
        drop(listener);

        let _ = abort_handshakes.send(());
        let closed = registry.close_all().await;
        tracing::info!(
            "Closed {} client connection(s), waiting for {} handler(s) to finish...",
            closed,
            connections.len()
        );

        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                tracing::error!("Connection task failed: {}", e);
            }
        }

        // last relay sender; the relay drains what is left and stops
        drop(context);
        match relay_task.await {
            Ok(stats) => tracing::info!(
                "Relay stopped after {} message(s), {} delivery(ies), {} failure(s)",
                stats.messages,
                stats.deliveries,
                stats.failures
            ),
            Err(e) => tracing::error!("Relay task failed: {}", e),
        }

        tracing::info!("All connections closed. Server shut down gracefully.");
        Ok(())
    }
}
