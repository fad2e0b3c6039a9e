//! Indexes for efficient store lookups.

use graft_core::{RecordId, TypeId};
use std::collections::{HashMap, HashSet};

/// Type index: TypeId -> Set<RecordId>
#[derive(Debug, Default)]
pub struct TypeIndex {
    index: HashMap<TypeId, HashSet<RecordId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_id: TypeId, record_id: RecordId) {
        self.index.entry(type_id).or_default().insert(record_id);
    }

    pub fn get(&self, type_id: TypeId) -> impl Iterator<Item = RecordId> + '_ {
        self.index
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
