//! XML Entity Handling
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Entities declared in the DTD internal subset
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present.

use super::options::XmlVersion;
use super::scanner::is_name_char;
use crate::error::{lossy, CharRefFault, XmlError};
use memchr::memchr;
use std::borrow::Cow;
use std::collections::HashMap;

/// The five entities every XML processor knows
pub const PREDEFINED: [(&str, &str); 5] = [
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("quot", "\""),
    ("apos", "'"),
];

/// Nested entity expansions allowed before giving up
const MAX_EXPANSION_DEPTH: usize = 16;

/// Digits allowed in a numeric character reference, leading zeros included
const MAX_CHAR_REF_DIGITS: usize = 16;

/// Name to replacement text mapping used when unescaping
///
/// Seeded with the predefined entities. Declarations are first-wins, as in
/// XML 1.0 section 4.2. Character references are checked against the
/// `Char` production of the table's version.
#[derive(Debug, Clone)]
pub struct EntityTable {
    entries: HashMap<Vec<u8>, Vec<u8>>,
    version: XmlVersion,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference found after an '&'
enum Reference<'a> {
    Char(char),
    Named(&'a [u8]),
}

impl EntityTable {
    /// Create an XML 1.0 table holding only the predefined entities
    pub fn new() -> Self {
        Self::with_version(XmlVersion::V1_0)
    }

    pub fn with_version(version: XmlVersion) -> Self {
        let entries = PREDEFINED
            .iter()
            .map(|(name, value)| (name.as_bytes().to_vec(), value.as_bytes().to_vec()))
            .collect();
        EntityTable { entries, version }
    }

    pub fn version(&self) -> XmlVersion {
        self.version
    }

    /// Declare an entity; returns false if the name was already declared
    pub fn declare(&mut self, name: &[u8], value: Vec<u8>) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_vec(), value);
        true
    }

    /// Replacement text of an entity
    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &[u8]) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace entity and character references in `input`
    ///
    /// Returns Borrowed if no references are present. In lenient mode
    /// malformed or unknown references are copied through unchanged.
    pub fn unescape<'a>(&self, input: &'a [u8], strict: bool) -> Result<Cow<'a, [u8]>, XmlError> {
        // Fast path: check if there are any entities using SIMD
        if memchr(b'&', input).is_none() {
            return Ok(Cow::Borrowed(input));
        }
        let mut out = Vec::with_capacity(input.len());
        let mut expanding = Vec::new();
        self.unescape_into(input, &mut out, strict, &mut expanding)?;
        Ok(Cow::Owned(out))
    }

    fn unescape_into<'t>(
        &'t self,
        input: &[u8],
        out: &mut Vec<u8>,
        strict: bool,
        expanding: &mut Vec<&'t [u8]>,
    ) -> Result<(), XmlError> {
        let mut pos = 0;

        while let Some(offset) = memchr(b'&', &input[pos..]) {
            let amp = pos + offset;
            out.extend_from_slice(&input[pos..amp]);

            match parse_reference(&input[amp..], self.version) {
                Ok((Reference::Char(c), len)) => {
                    push_char(out, c);
                    pos = amp + len;
                }
                Ok((Reference::Named(name), len)) => {
                    let raw = &input[amp..amp + len];
                    pos = amp + len;
                    let Some((key, value)) = self.entries.get_key_value(name) else {
                        if strict {
                            return Err(XmlError::UnknownEntity { name: lossy(name) });
                        }
                        out.extend_from_slice(raw);
                        continue;
                    };
                    // Predefined replacements are literal, even `&`
                    if is_predefined(name) || memchr(b'&', value).is_none() {
                        out.extend_from_slice(value);
                        continue;
                    }
                    let recursive = expanding.iter().any(|open| *open == name)
                        || expanding.len() >= MAX_EXPANSION_DEPTH;
                    if recursive {
                        if strict {
                            return Err(XmlError::RecursiveEntity { name: lossy(name) });
                        }
                        out.extend_from_slice(raw);
                        continue;
                    }
                    expanding.push(key.as_slice());
                    let result = self.unescape_into(value, out, strict, expanding);
                    expanding.pop();
                    result?;
                }
                Err(err) => {
                    if strict {
                        return Err(err);
                    }
                    out.push(b'&');
                    pos = amp + 1;
                }
            }
        }

        out.extend_from_slice(&input[pos..]);
        Ok(())
    }
}

/// Parse the reference at the start of `input` (which begins with '&')
///
/// Returns the reference and its length including '&' and ';'.
fn parse_reference(input: &[u8], version: XmlVersion) -> Result<(Reference<'_>, usize), XmlError> {
    let body = &input[1..];

    if body.first() == Some(&b'#') {
        let run = body[1..].iter().take_while(|b| b.is_ascii_alphanumeric()).count();
        let len = 2 + run;
        if body.get(1 + run) != Some(&b';') {
            return Err(XmlError::MissingSemicolon { reference: lossy(&input[..len]) });
        }
        let reference = &input[..len + 1];
        let c = decode_char_ref(reference, version)?;
        return Ok((Reference::Char(c), len + 1));
    }

    let run = body.iter().take_while(|&&b| is_name_char(b)).count();
    if run == 0 || body.get(run) != Some(&b';') {
        return Err(XmlError::MissingSemicolon { reference: lossy(&input[..1 + run]) });
    }
    Ok((Reference::Named(&body[..run]), run + 2))
}

fn is_predefined(name: &[u8]) -> bool {
    PREDEFINED.iter().any(|(predefined, _)| predefined.as_bytes() == name)
}

/// Decode a complete numeric character reference such as `&#x41;`
///
/// The code point must match the `Char` production of `version`.
pub fn decode_char_ref(reference: &[u8], version: XmlVersion) -> Result<char, XmlError> {
    let fault = |fault| XmlError::InvalidCharRef { reference: lossy(reference), fault };

    let inner = reference
        .strip_prefix(b"&#")
        .and_then(|r| r.strip_suffix(b";"))
        .ok_or_else(|| fault(CharRefFault::InvalidDigit))?;

    let (radix, digits) = match inner.first() {
        Some(b'x') => (16, &inner[1..]),
        _ => (10, inner),
    };

    if digits.is_empty() {
        return Err(fault(CharRefFault::Empty));
    }
    if digits.len() > MAX_CHAR_REF_DIGITS {
        return Err(fault(CharRefFault::TooLong));
    }

    let mut codepoint: u32 = 0;
    for &b in digits {
        let digit = (b as char).to_digit(radix).ok_or_else(|| fault(CharRefFault::InvalidDigit))?;
        codepoint = codepoint * radix + digit;
        if codepoint > 0x10FFFF {
            return Err(fault(CharRefFault::OutOfRange));
        }
    }

    if !is_valid_char(codepoint, version) {
        return Err(fault(CharRefFault::OutOfRange));
    }
    char::from_u32(codepoint).ok_or_else(|| fault(CharRefFault::OutOfRange))
}

/// Expand only numeric character references, leaving named ones in place
///
/// Entity literals in the DTD are stored this way; named references are
/// expanded when the entity is used.
pub fn decode_char_refs(input: &[u8], strict: bool, version: XmlVersion) -> Result<Cow<'_, [u8]>, XmlError> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while let Some(offset) = memchr(b'&', &input[pos..]) {
        let amp = pos + offset;
        out.extend_from_slice(&input[pos..amp]);
        if input.get(amp + 1) != Some(&b'#') {
            out.push(b'&');
            pos = amp + 1;
            continue;
        }
        match parse_reference(&input[amp..], version) {
            Ok((reference, len)) => {
                if let Reference::Char(c) = reference {
                    push_char(&mut out, c);
                }
                pos = amp + len;
            }
            Err(err) if strict => return Err(err),
            Err(_) => {
                out.push(b'&');
                pos = amp + 1;
            }
        }
    }
    out.extend_from_slice(&input[pos..]);
    Ok(Cow::Owned(out))
}

/// Unescape with the predefined entities only, strictly
pub fn unescape(input: &[u8]) -> Result<Cow<'_, [u8]>, XmlError> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    EntityTable::new().unescape(input, true)
}

#[inline]
fn needs_escape(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b'&' | b'"' | b'\'')
}

/// Escape the five special characters for XML output
pub fn escape(input: &[u8]) -> Cow<'_, [u8]> {
    // Fast path: check if any escaping needed
    if !input.iter().any(|&b| needs_escape(b)) {
        return Cow::Borrowed(input);
    }

    let mut result = Vec::with_capacity(input.len() + 16);
    for &b in input {
        match b {
            b'<' => result.extend_from_slice(b"&lt;"),
            b'>' => result.extend_from_slice(b"&gt;"),
            b'&' => result.extend_from_slice(b"&amp;"),
            b'"' => result.extend_from_slice(b"&quot;"),
            b'\'' => result.extend_from_slice(b"&apos;"),
            _ => result.push(b),
        }
    }
    Cow::Owned(result)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Check if a code point matches the Char production of `version`
///
/// XML 1.0: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
/// XML 1.1: [#x1-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_char(codepoint: u32, version: XmlVersion) -> bool {
    match version {
        XmlVersion::V1_0 => matches!(codepoint,
            0x9 | 0xA | 0xD |
            0x20..=0xD7FF |
            0xE000..=0xFFFD |
            0x10000..=0x10FFFF
        ),
        XmlVersion::V1_1 => matches!(codepoint,
            0x1..=0xD7FF |
            0xE000..=0xFFFD |
            0x10000..=0x10FFFF
        ),
    }
}

/// Validate UTF-8 content for characters not allowed by `version`
///
/// `base` is the absolute offset of `content`, used in error positions.
pub fn validate_chars(content: &[u8], version: XmlVersion, base: usize) -> Result<(), XmlError> {
    // ASCII fast path covers most documents
    if content.iter().all(|&b| matches!(b, 0x20..=0x7E | b'\t' | b'\n' | b'\r')) {
        return Ok(());
    }
    let text = std::str::from_utf8(content)
        .map_err(|e| XmlError::InvalidUtf8 { position: base + e.valid_up_to() })?;
    for (offset, c) in text.char_indices() {
        if !is_valid_char(c as u32, version) {
            return Err(XmlError::IllegalChar { codepoint: c as u32, position: base + offset });
        }
    }
    Ok(())
}
