//! Fast byte scanning helpers
//!
//! Shared by the lexers, the tokenizer and the cursor. Uses memchr for
//! single bytes and small byte sets, which picks SSE2/AVX2/NEON at runtime.

use memchr::{memchr, memchr2, memchr3};

/// XML whitespace (S production)
pub const WHITESPACE: &[u8] = b" \t\r\n";

/// Check if byte is XML whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Find next occurrence of a specific byte
#[inline]
pub fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    memchr(byte, haystack)
}

/// Find the first byte that belongs to `set`
///
/// Returns the offset in `haystack` and the index in `set` of the byte found.
pub fn find_any(haystack: &[u8], set: &[u8]) -> Option<(usize, usize)> {
    let offset = match set.len() {
        0 => return None,
        1 => memchr(set[0], haystack),
        2 => memchr2(set[0], set[1], haystack),
        3 => memchr3(set[0], set[1], set[2], haystack),
        _ => haystack.iter().position(|b| set.contains(b)),
    }?;
    let found = haystack[offset];
    set.iter().position(|&b| b == found).map(|index| (offset, index))
}

/// Strip leading whitespace
#[inline]
pub fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_whitespace(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Strip trailing whitespace
#[inline]
pub fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_whitespace(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Strip whitespace on both sides
#[inline]
pub fn trim(bytes: &[u8]) -> &[u8] {
    trim_end(trim_start(bytes))
}

/// Split a qualified name into prefix and local name at the first colon
#[inline]
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    if let Some(colon_pos) = memchr(b':', name) {
        (Some(&name[..colon_pos]), &name[colon_pos + 1..])
    } else {
        (None, name)
    }
}

/// Split token content into its leading name and the remainder
///
/// The remainder has its leading whitespace removed.
pub fn split_leading_name(content: &[u8]) -> (&[u8], &[u8]) {
    let content = trim_start(content);
    let end = content.iter().position(|&b| is_whitespace(b)).unwrap_or(content.len());
    (&content[..end], trim_start(&content[end..]))
}

/// Check if byte is valid XML name start character
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Check if byte is valid XML name character
/// Allows ASCII alphanumeric, punctuation, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

/// NameStartChar per XML 1.0 fifth edition
fn is_name_start_codepoint(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' |
        '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
    )
}

/// NameChar per XML 1.0 fifth edition
fn is_name_codepoint(c: char) -> bool {
    is_name_start_codepoint(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Validate an XML Name, decoding non-ASCII characters
pub fn is_valid_name(name: &[u8]) -> bool {
    let Ok(name) = std::str::from_utf8(name) else {
        return false;
    };
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_codepoint(first) => chars.all(is_name_codepoint),
        _ => false,
    }
}
