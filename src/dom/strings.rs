//! String Interning Pool
//!
//! Deduplicated storage for element names, attribute names and values,
//! and character data copied out of the cursor.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Interned string ID; 0 is always the empty string
pub type StringId = u32;

/// String interning pool
///
/// Memory layout:
/// - `entries`: (offset, length) into `data` for each string ID
/// - `data`: one buffer holding every interned string
/// - `hash_index`: hash -> list of IDs (handles rare collisions)
#[derive(Debug)]
pub struct StringPool {
    entries: Vec<(u32, u32)>,
    data: Vec<u8>,
    hash_index: HashMap<u64, Vec<StringId>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    pub fn new() -> Self {
        StringPool {
            // Entry 0 is reserved for the empty string
            entries: vec![(0, 0)],
            data: Vec::with_capacity(4096),
            hash_index: HashMap::new(),
        }
    }

    #[inline]
    fn compute_hash(s: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning the ID of an equal string if present
    pub fn intern(&mut self, s: &[u8]) -> StringId {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            if let Some(&id) = ids.iter().find(|&&id| self.get(id) == Some(s)) {
                return id;
            }
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s);

        let id = self.entries.len() as StringId;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// Get a string by ID
    pub fn get(&self, id: StringId) -> Option<&[u8]> {
        let &(offset, len) = self.entries.get(id as usize)?;
        self.data.get(offset as usize..(offset + len) as usize)
    }

    /// Get a string by ID as UTF-8 str
    pub fn get_str(&self, id: StringId) -> Option<&str> {
        self.get(id).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of distinct strings, the empty string included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Total bytes of string storage
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}
