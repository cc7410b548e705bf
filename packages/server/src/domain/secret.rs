//! Server-wide shared secret.

use std::{fmt, sync::Arc};

/// The secret every client must present during the handshake.
///
/// Set once at startup and never changed. `Debug` output is redacted so the
/// value cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Arc<str>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::from(value.into()))
    }

    /// Compare a submitted line with the secret.
    ///
    /// The submission is trimmed of surrounding whitespace (including its line
    /// terminator) and then compared byte for byte. An empty submission is a
    /// regular candidate, not a special case.
    pub fn matches(&self, submitted: &str) -> bool {
        submitted.trim().as_bytes() == self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_surrounding_whitespace() {
        // テスト項目: 送信された値の前後の空白と改行は無視される
        // given (前提条件):
        let secret = Secret::new("hunter2");

        // when (操作):
        let exact = secret.matches("hunter2");
        let with_newline = secret.matches("hunter2\r\n");
        let padded = secret.matches("  hunter2 ");

        // then (期待する結果):
        assert!(exact);
        assert!(with_newline);
        assert!(padded);
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        // テスト項目: 大文字小文字は区別される
        // given (前提条件):
        let secret = Secret::new("hunter2");

        // when (操作):
        let result = secret.matches("HUNTER2");

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_empty_submission_is_compared_normally() {
        // テスト項目: 空の入力は通常の値として比較される
        // given (前提条件):
        let empty_secret = Secret::new("");
        let secret = Secret::new("hunter2");

        // when (操作):
        let empty_vs_empty = empty_secret.matches("\n");
        let empty_vs_secret = secret.matches("");

        // then (期待する結果):
        assert!(empty_vs_empty);
        assert!(!empty_vs_secret);
    }

    #[test]
    fn test_debug_is_redacted() {
        // テスト項目: Debug 出力に秘密の値が含まれない
        // given (前提条件):
        let secret = Secret::new("hunter2");

        // when (操作):
        let rendered = format!("{:?}", secret);

        // then (期待する結果):
        assert!(!rendered.contains("hunter2"));
    }
}
