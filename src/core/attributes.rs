//! XML Attribute Parsing
//!
//! Attributes are parsed lazily from the tag content that follows the
//! element (or PI) name, one name/value pair per iteration step.

use super::entities::EntityTable;
use super::scanner::{is_valid_name, is_whitespace, split_name};
use crate::error::{lossy, CursorError};
use memchr::memchr;
use std::borrow::Cow;
use tracing::warn;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a [u8],
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&'a [u8]> {
        split_name(self.name).0
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &'a [u8] {
        split_name(self.name).1
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.name).ok()
    }

    /// Get the value as a string
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value.as_ref()).ok()
    }
}

/// Lazy attribute sequence over raw tag content
///
/// In strict mode a malformed attribute yields one `Err` and ends the
/// sequence. In lenient mode the sequence ends early and `has_error`
/// reports the problem.
#[derive(Debug, Clone)]
pub struct Attributes<'a> {
    input: &'a [u8],
    pos: usize,
    entities: &'a EntityTable,
    strict: bool,
    failed: bool,
    done: bool,
}

impl<'a> Attributes<'a> {
    /// Parse attributes from raw tag content (after the element name)
    pub fn new(input: &'a [u8], entities: &'a EntityTable, strict: bool) -> Self {
        Attributes {
            input,
            pos: 0,
            entities,
            strict,
            failed: false,
            done: false,
        }
    }

    /// Sticky flag set when lenient parsing hit a malformed attribute
    pub fn has_error(&self) -> bool {
        self.failed
    }

    /// Collect into a name-to-value map (duplicates: last wins)
    pub fn into_map(self) -> Result<AttributeMap, CursorError> {
        let mut map = AttributeMap::new();
        for attr in self {
            let attr = attr?;
            map.insert(attr.name, &attr.value);
        }
        Ok(map)
    }

    /// Find the value of the first attribute named `name`
    pub fn find(self, name: &[u8]) -> Result<Option<Cow<'a, [u8]>>, CursorError> {
        for attr in self {
            let attr = attr?;
            if attr.name == name {
                return Ok(Some(attr.value));
            }
        }
        Ok(None)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    fn malformed(&mut self, message: &'static str) -> Option<Result<Attribute<'a>, CursorError>> {
        self.done = true;
        if self.strict {
            return Some(Err(CursorError::MalformedAttribute {
                message,
                content: lossy(self.input),
            }));
        }
        warn!(content = %String::from_utf8_lossy(self.input), message, "skipping malformed attributes");
        self.failed = true;
        None
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = Result<Attribute<'a>, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let separated = self.pos == 0
            || self.pos >= self.input.len()
            || is_whitespace(self.input[self.pos]);
        self.skip_whitespace();
        if self.pos >= self.input.len() {
            self.done = true;
            return None;
        }
        if !separated {
            return self.malformed("attributes must be separated by whitespace");
        }

        // Attribute name runs to whitespace or '='
        let name_start = self.pos;
        while self.pos < self.input.len()
            && !is_whitespace(self.input[self.pos])
            && self.input[self.pos] != b'='
        {
            self.pos += 1;
        }
        let name = &self.input[name_start..self.pos];

        if !is_valid_name(name) {
            self.done = true;
            if self.strict {
                return Some(Err(CursorError::InvalidAttributeName { name: lossy(name) }));
            }
            warn!(name = %String::from_utf8_lossy(name), "invalid attribute name");
            self.failed = true;
            return None;
        }

        self.skip_whitespace();
        if self.input.get(self.pos) != Some(&b'=') {
            return self.malformed("expected '=' after attribute name");
        }
        self.pos += 1;
        self.skip_whitespace();

        let quote = match self.input.get(self.pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return self.malformed("attribute value must be quoted"),
        };
        self.pos += 1;

        let value_start = self.pos;
        let Some(len) = memchr(quote, &self.input[value_start..]) else {
            return self.malformed("attribute value has mismatched quotes");
        };
        let raw = &self.input[value_start..value_start + len];
        self.pos = value_start + len + 1;

        if self.strict && memchr(b'<', raw).is_some() {
            return self.malformed("attribute value cannot contain '<'");
        }

        match self.entities.unescape(raw, self.strict) {
            Ok(value) => Some(Ok(Attribute { name, value })),
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

/// Ordered attribute mapping handed to consumers
///
/// Duplicate names keep their first position and take the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace
    pub fn insert(&mut self, name: &[u8], value: &[u8]) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_vec(),
            None => self.entries.push((name.to_vec(), value.to_vec())),
        }
    }

    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    /// Get an attribute value by name as string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name.as_bytes()).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(n, v)| (n.as_slice(), v.as_slice()))
    }

    pub fn into_vec(self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
    }
}
