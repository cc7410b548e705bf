//! Client registry: who is currently in the chat.
//!
//! All sessions live in one map behind one lock. Admission, departure, fan-out
//! and shutdown each take that lock for their whole operation, so the relay
//! can never iterate a half-updated map and a departing session can never be
//! written to after it was released.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, Message, Session},
    error::RegistryError,
    relay::RelayHandle,
};

/// Outcome of relaying one message to the registered peers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    /// Peers the line was written to
    pub delivered: usize,
    /// Peers whose write failed
    pub failed: usize,
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<ConnectionId, Session>,
    /// Set by shutdown; no further admissions
    closed: bool,
}

/// Shared map from connection to authenticated session.
#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an authenticated session and announce it.
    ///
    /// The insert and the join notice happen under the same lock, so nothing
    /// the new session says can be relayed ahead of its join notice. After
    /// shutdown has started the session is released instead.
    pub async fn join(&self, session: Session, relay: &RelayHandle) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;
        if state.closed {
            drop(state);
            session.release().await;
            return Err(RegistryError::Closed);
        }

        relay.publish(Message::join(&session));
        tracing::info!(
            "Client '{}' ({}) joined, {} connected",
            session.nickname(),
            session.id(),
            state.sessions.len() + 1
        );
        state.sessions.insert(session.id(), session);

        Ok(())
    }

    /// Remove a session and announce its departure.
    ///
    /// Does nothing when the session is no longer registered, so every session
    /// produces at most one leave notice. The caller releases the returned
    /// session once the lock is gone.
    pub async fn depart(&self, id: ConnectionId, relay: &RelayHandle) -> Option<Session> {
        let mut state = self.state.lock().await;
        let session = state.sessions.remove(&id)?;
        relay.publish(Message::leave(&session));
        tracing::info!(
            "Client '{}' ({}) left, {} connected",
            session.nickname(),
            id,
            state.sessions.len()
        );

        Some(session)
    }

    /// Write `message` to every open session except its origin.
    ///
    /// A failed write is logged and skipped; it neither stops delivery to the
    /// remaining peers nor removes the failing peer, whose own read loop
    /// notices the broken connection.
    pub async fn fan_out(&self, message: &Message) -> FanOut {
        let line = message.render();
        let mut outcome = FanOut::default();

        let mut state = self.state.lock().await;
        for (id, session) in state.sessions.iter_mut() {
            if *id == message.origin || !session.is_open() {
                continue;
            }
            match session.send_line(&line).await {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        "Failed to send message to client '{}' ({}): {}",
                        session.nickname(),
                        id,
                        e
                    );
                }
            }
        }

        outcome
    }

    /// Refuse new sessions and close every registered one.
    ///
    /// Sessions stay registered; each read loop wakes up and removes its own
    /// session, announcing the departure. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let mut state = self.state.lock().await;
        state.closed = true;
        for session in state.sessions.values_mut() {
            tracing::info!("Closing connection for client '{}'", session.nickname());
            session.close().await;
        }

        state.sessions.len()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.state.lock().await.sessions.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sorted snapshot of the registered nicknames.
    pub async fn nicknames(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut nicknames: Vec<String> = state
            .sessions
            .values()
            .map(|session| session.nickname().as_str().to_string())
            .collect();
        nicknames.sort();
        nicknames
    }
}
