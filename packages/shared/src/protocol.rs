//! Line-oriented wire protocol shared by the server and the client.
//!
//! Every frame is a single UTF-8 line terminated by `\n`. There is no length
//! prefix, no message id and no acknowledgment:
//!
//! 1. server → client: [`SECRET_PROMPT`]
//! 2. client → server: `<secret>\n`
//! 3. server → client: [`REJECTION`] on mismatch (connection closes), otherwise
//!    [`WELCOME_PROMPT`]
//! 4. client → server: `<nickname>\n`
//! 5. afterwards every client line is relayed to the other clients as
//!    `[<nickname>]: <line>\n`

/// First line the server sends on every new connection.
pub const SECRET_PROMPT: &str = "Enter the secret key to access the server:";

/// Sent after a matching secret; the client answers with its nickname.
pub const WELCOME_PROMPT: &str = "Welcome to the chat! Type your nickname:";

/// Sent after a mismatching secret, right before the server closes the connection.
pub const REJECTION: &str = "Invalid secret key. Connection closed.";

/// Case-insensitive marker clients look for to detect a rejected handshake.
pub const REJECTION_MARKER: &str = "invalid";

/// Body of the notice relayed when a participant joins.
pub const JOIN_NOTICE: &str = "has joined the chat!";

/// Body of the notice relayed when a participant leaves.
pub const LEAVE_NOTICE: &str = "has left the chat.";

/// Render a relayed line, without the trailing newline.
///
/// ```
/// use linechat_shared::protocol::format_broadcast;
///
/// assert_eq!(format_broadcast("alice", "hello"), "[alice]: hello");
/// ```
pub fn format_broadcast(nickname: &str, body: &str) -> String {
    format!("[{}]: {}", nickname, body)
}

/// Whether a server reply announces a failed handshake.
pub fn is_rejection(line: &str) -> bool {
    line.to_lowercase().contains(REJECTION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_line_carries_marker() {
        // テスト項目: 拒否メッセージがクライアントの判定マーカーを含む
        // given (前提条件):
        let line = REJECTION;

        // when (操作):
        let rejected = is_rejection(line);

        // then (期待する結果):
        assert!(rejected);
    }

    #[test]
    fn test_is_rejection_is_case_insensitive() {
        // テスト項目: マーカーの判定が大文字小文字を区別しない
        // given (前提条件):
        let shouting = "INVALID secret";
        let welcome = WELCOME_PROMPT;

        // when (操作):
        let shouting_rejected = is_rejection(shouting);
        let welcome_rejected = is_rejection(welcome);

        // then (期待する結果):
        assert!(shouting_rejected);
        assert!(!welcome_rejected);
    }

    #[test]
    fn test_format_broadcast_keeps_body_verbatim() {
        // テスト項目: 本文の前後の空白がそのまま保持される
        // given (前提条件):
        let body = "  spaced  ";

        // when (操作):
        let line = format_broadcast("bob", body);

        // then (期待する結果):
        assert_eq!(line, "[bob]:   spaced  ");
    }
}
