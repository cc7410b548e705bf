//! Relay units.

use linechat_shared::protocol::{JOIN_NOTICE, LEAVE_NOTICE, format_broadcast};

use super::session::{ConnectionId, Nickname, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Join,
    Leave,
    Chat,
}

/// One line waiting on the relay channel.
///
/// Carries a copy of the origin's nickname so it can still be rendered after
/// the origin has left the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub origin: ConnectionId,
    pub nickname: Nickname,
    pub body: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn join(session: &Session) -> Self {
        Self {
            origin: session.id(),
            nickname: session.nickname().clone(),
            body: JOIN_NOTICE.to_string(),
            kind: MessageKind::Join,
        }
    }

    pub fn leave(session: &Session) -> Self {
        Self {
            origin: session.id(),
            nickname: session.nickname().clone(),
            body: LEAVE_NOTICE.to_string(),
            kind: MessageKind::Leave,
        }
    }

    pub fn chat(origin: ConnectionId, nickname: Nickname, body: String) -> Self {
        Self {
            origin,
            nickname,
            body,
            kind: MessageKind::Chat,
        }
    }

    /// The line written to every peer, without the terminator.
    pub fn render(&self) -> String {
        format_broadcast(self.nickname.as_str(), &self.body)
    }
}
