//! The clone dictionary - original-to-copy memoization.
//!
//! Maps an already-cloned original to its copy so that records reachable via
//! more than one path are copied once, and cycles resolve to the in-progress
//! copy instead of recursing forever. The type tag is the first axis of the
//! key. One dictionary belongs to one top-level clone invocation; it may be
//! pre-seeded before the call to force reuse of existing copies.

use graft_core::{RecordId, TypeId};
use std::collections::HashMap;

/// Map from (type, original) to the copy created for it.
#[derive(Debug, Clone, Default)]
pub struct CloneDictionary {
    entries: HashMap<(TypeId, RecordId), RecordId>,
}

impl CloneDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the copy recorded for an original.
    pub fn get(&self, type_id: TypeId, original: RecordId) -> Option<RecordId> {
        self.entries.get(&(type_id, original)).copied()
    }

    /// Record the copy created for an original. Later lookups for the same
    /// original return this copy for the rest of the invocation.
    pub fn insert(&mut self, type_id: TypeId, original: RecordId, copy: RecordId) {
        self.entries.insert((type_id, original), copy);
    }

    /// Number of recorded copies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
