//! Set of unique variable-length byte keys.

use indexmap::IndexSet;

/// A set of distinct byte keys with O(1) membership, insertion and removal.
///
/// Tracks which agents (or origins) are already recorded against a message
/// without growing duplicate entries. Removal swaps the last key into the
/// vacated slot, so iteration order is insertion order only until the first
/// removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSet {
    keys: IndexSet<Vec<u8>>,
}

impl AgentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. Returns false if it was already present.
    pub fn insert(&mut self, key: &[u8]) -> bool {
        if self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_vec())
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains(key)
    }

    /// Remove a key by swapping the last key into its slot.
    ///
    /// Returns false if the key was not present.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.keys.swap_remove(key)
    }

    /// Position of a key, if present.
    pub fn position(&self, key: &[u8]) -> Option<usize> {
        self.keys.get_index_of(key)
    }

    /// Key at a position.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.keys.get_index(index).map(Vec::as_slice)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over keys in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.keys.iter().map(Vec::as_slice)
    }
}
