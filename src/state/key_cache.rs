//! Client-side key list cache
//!
//! The cache is the authoritative order of the keys on screen; the key panel
//! is rendered from it (or from the preview order while a drag is active).

use super::{Key, KeyId};

#[derive(Debug, Default, Clone)]
pub struct KeyListCache {
    keys: Vec<Key>,
}

impl KeyListCache {
    /// Replace the contents with a fresh server listing, ordered by position.
    /// Keys sharing a position keep the server's order.
    pub fn replace(&mut self, mut keys: Vec<Key>) {
        keys.sort_by_key(|k| k.position);
        self.keys = keys;
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, id: KeyId) -> Option<&Key> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub fn index_of(&self, id: KeyId) -> Option<usize> {
        self.keys.iter().position(|k| k.id == id)
    }

    /// Key ids in display order
    pub fn ids(&self) -> Vec<KeyId> {
        self.keys.iter().map(|k| k.id).collect()
    }

    /// Move a key to `new_index` (remove, then reinsert). The index is clamped
    /// to the end of the list. Returns the previous index, or `None` if the key
    /// is not cached.
    pub fn move_to(&mut self, id: KeyId, new_index: usize) -> Option<usize> {
        let from = self.index_of(id)?;
        let key = self.keys.remove(from);
        let to = new_index.min(self.keys.len());
        self.keys.insert(to, key);
        Some(from)
    }
}
