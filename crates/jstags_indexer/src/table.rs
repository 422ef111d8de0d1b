//! Symbol tables and the occurrence lists they hold.

use jstags_core::collections::OrderedMap;
use jstags_core::text::TextRange;
use jstags_scopes::ScopeKind;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// One recorded location of a path within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub range: TextRange,
    pub is_declaration: bool,
}

/// Occurrences of one path, in discovery order. Exactly the first entry
/// has `is_declaration == true`.
pub type OccurrenceList = Vec<Occurrence>;

/// A per-scope mapping from path to its occurrences, iterating in
/// discovery order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: OrderedMap<String, OccurrenceList>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: OrderedMap::new(),
        }
    }

    /// Record an occurrence of `path`. The first occurrence of a path in
    /// this table is its declaration; all later ones are references.
    pub(crate) fn push(&mut self, path: String, range: TextRange) {
        let list = self.entries.get_or_insert_with(path, Vec::new);
        let is_declaration = list.is_empty();
        list.push(Occurrence {
            range,
            is_declaration,
        });
    }

    pub fn get(&self, path: &str) -> Option<&OccurrenceList> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths and their occurrence lists, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OccurrenceList)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// One scope of the completed index.
#[derive(Debug)]
pub struct ScopeIndex {
    pub kind: ScopeKind,
    pub range: TextRange,
    pub table: SymbolTable,
}

/// The completed index of one file: every scope in document order.
#[derive(Debug)]
pub struct FileIndex {
    pub file: String,
    pub scopes: Vec<ScopeIndex>,
}

impl FileIndex {
    /// Total number of recorded occurrences across all scopes.
    pub fn occurrence_count(&self) -> usize {
        self.scopes
            .iter()
            .flat_map(|s| s.table.iter())
            .map(|(_, list)| list.len())
            .sum()
    }
}

// ============================================================================
// Serialization
//
// Occurrences serialize as `[start, end]` byte pairs, with `true` appended
// on the declaring entry. This is the interchange shape downstream
// navigation and rename consumers read.
// ============================================================================

impl Serialize for Occurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.is_declaration { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.range.pos)?;
        seq.serialize_element(&self.range.end)?;
        if self.is_declaration {
            seq.serialize_element(&true)?;
        }
        seq.end()
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (path, occurrences) in self.iter() {
            map.serialize_entry(path, occurrences)?;
        }
        map.end()
    }
}

impl Serialize for ScopeIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = match self.kind {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
        };
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("kind", kind)?;
        map.serialize_entry("range", &[self.range.pos, self.range.end])?;
        map.serialize_entry("symbols", &self.table)?;
        map.end()
    }
}

impl Serialize for FileIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("file", &self.file)?;
        map.serialize_entry("scopes", &self.scopes)?;
        map.end()
    }
}
