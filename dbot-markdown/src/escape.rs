//! MarkdownV2 reserved-character escaping.

/// Characters that Telegram MarkdownV2 treats as syntax and that must be escaped to appear literally.
pub const RESERVED_CHARS: [char; 20] = [
    '\\', '#', '=', '-', '*', '_', '|', '[', ']', '{', '}', '(', ')', '>', '.', '!', '~', '+', '`',
    '"',
];

/// Returns true if `c` must be escaped in MarkdownV2.
pub fn is_reserved(c: char) -> bool {
    RESERVED_CHARS.contains(&c)
}

/// Prefixes every reserved character with a backslash. Works on chars, so multi-byte text is untouched.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if is_reserved(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
