//! Terminal output helpers for the client.

use std::io::Write;

/// Prompt shown while the user types a chat line
pub const CHAT_PROMPT: &str = "[me]: ";

/// Print a line received from the server above the input prompt.
///
/// Clears the partially drawn prompt first so incoming lines do not end up
/// glued to it.
pub fn print_incoming(line: &str) {
    print!("\r\x1b[K{}\n", line);
    redisplay_prompt();
}

/// Redisplay the prompt after printing a message
pub fn redisplay_prompt() {
    print!("{}", CHAT_PROMPT);
    std::io::stdout().flush().ok();
}
