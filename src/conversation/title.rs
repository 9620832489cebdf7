//! Chat title derivation

/// Maximum number of characters kept from the first user message
pub const TITLE_MAX_CHARS: usize = 30;

/// Appended when the first user message was truncated
pub const TITLE_ELLIPSIS: &str = "...";

/// Derive a chat title from the text of its first user message
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point.
///
/// # Examples
///
/// ```
/// use chatgenie::conversation::derive_title;
///
/// assert_eq!(derive_title("Hello"), "Hello");
/// assert_eq!(
///     derive_title("Explain recursion in depth with many examples please"),
///     "Explain recursion in depth wit..."
/// );
/// ```
pub fn derive_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}{}", head, TITLE_ELLIPSIS)
    } else {
        text.to_string()
    }
}
