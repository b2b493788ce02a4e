//! Log sanitization utilities
//!
//! Keeps credentials and session tokens out of debug/error logs and stops
//! large SOAP bodies from flooding them.

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters kept visible by [`mask_secret`].
const MASK_VISIBLE: usize = 3;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` bytes with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask an identifier (login name, session token) for logging.
///
/// Keeps the first few characters so log lines stay correlatable.
pub fn mask_secret(s: &str) -> String {
    let visible: String = s.chars().take(MASK_VISIBLE).collect();
    if visible.len() == s.len() {
        "***".to_string()
    } else {
        format!("{visible}***")
    }
}
