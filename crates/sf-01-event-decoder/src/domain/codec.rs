//! # Event Argument Codec
//!
//! Helpers that turn hex-encoded contract event arguments into text and
//! ids.

use primitive_types::U256;

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Whether an argument carries no payload (`""` or `"0x"`).
pub fn is_empty_arg(value: &str) -> bool {
    strip_hex_prefix(value.trim()).is_empty()
}

/// Decode hex-wrapped UTF-8 text. `None` when the hex or the UTF-8 is
/// invalid.
pub fn hex_to_utf8(value: &str) -> Option<String> {
    let bytes = hex::decode(strip_hex_prefix(value.trim())).ok()?;
    String::from_utf8(bytes).ok()
}

/// Decode a big-endian hex integer to its decimal form.
pub fn numeric_hex_to_decimal(value: &str) -> Option<String> {
    let digits = strip_hex_prefix(value.trim());
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok().map(|n| n.to_string())
}

/// Drop control characters except newlines, fold `\r\n` to `\n`, trim.
pub fn sanitize_message(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Root post id of a discussion channel `"<prefix><digits>"`, matching the
/// prefix case-insensitively. `None` when `channel_id` is anything else.
pub fn parse_discussion_channel<'a>(channel_id: &'a str, prefix: &str) -> Option<&'a str> {
    if channel_id.len() <= prefix.len() || !channel_id.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, root) = channel_id.split_at(prefix.len());
    if !head.eq_ignore_ascii_case(prefix) || !root.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(root)
}
