//! Utility helpers — data paths and Unicode-safe string clipping.
//!
//! All lengths here are counted in `char`s, never bytes: article content is
//! mostly CJK text, where one character spans three UTF-8 bytes.

use std::path::PathBuf;

/// Marker appended to text cut short by [`ellipsize`].
pub const ELLIPSIS: &str = "...";

/// Get the Penwise data directory (e.g. `~/.penwise/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".penwise")
}

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `max_chars` characters of `s`, borrowed.
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Keep at most `max_chars` characters, appending [`ELLIPSIS`] if anything was cut.
///
/// Unlike a display truncation the marker does not count toward `max_chars`.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    let kept = take_chars(s, max_chars);
    if kept.len() == s.len() {
        s.to_string()
    } else {
        format!("{kept}{ELLIPSIS}")
    }
}
