//! Core record storage implementation.

use crate::index::TypeIndex;
use graft_core::{
    AssociationValue, Fields, Record, RecordId, StoreError, StoreResult, TypeId, Value,
};
use std::collections::HashMap;

/// ID allocator for records.
#[derive(Debug)]
struct IdAllocator {
    next_record_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self { next_record_id: 1 }
    }

    fn alloc_record_id(&mut self) -> RecordId {
        let id = RecordId::new(self.next_record_id);
        self.next_record_id += 1;
        id
    }
}

/// The in-memory record store.
#[derive(Debug)]
pub struct Store {
    /// Record storage
    records: HashMap<RecordId, Record>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Type index
    type_index: TypeIndex,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            id_alloc: IdAllocator::new(),
            type_index: TypeIndex::new(),
        }
    }

    // ==================== Record Operations ====================

    /// Allocate an empty record of the given type.
    pub fn new_record(&mut self, type_id: TypeId) -> RecordId {
        self.create_record(type_id, Fields::new())
    }

    /// Create a new record with the given type and initial fields.
    pub fn create_record(&mut self, type_id: TypeId, fields: Fields) -> RecordId {
        let id = self.id_alloc.alloc_record_id();
        let record = Record::new(id, type_id, fields);

        self.type_index.insert(type_id, id);
        self.records.insert(id, record);
        id
    }

    /// Get a record by ID.
    pub fn get_record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Get a mutable reference to a record by ID.
    pub fn get_record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    // ==================== Field Operations ====================

    /// Set a field on a record.
    pub fn set_field(&mut self, id: RecordId, name: &str, value: Value) -> StoreResult<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::RecordNotFound(id))?;
        record.set_field(name.to_string(), value);
        Ok(())
    }

    /// Get a field value from a record.
    pub fn get_field(&self, id: RecordId, name: &str) -> StoreResult<Option<&Value>> {
        let record = self
            .records
            .get(&id)
            .ok_or(StoreError::RecordNotFound(id))?;
        Ok(record.get_field(name))
    }

    // ==================== Association Operations ====================

    /// Assign an association slot on a record.
    ///
    /// Every target of the slot value must exist in the store.
    pub fn set_association(
        &mut self,
        id: RecordId,
        name: &str,
        value: AssociationValue,
    ) -> StoreResult<()> {
        for target in value.target_ids() {
            if !self.records.contains_key(&target) {
                return Err(StoreError::RecordNotFound(target));
            }
        }

        let record = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::RecordNotFound(id))?;
        record.set_association(name.to_string(), value);
        Ok(())
    }

    /// Get an association slot from a record. Ok(None) means the slot was
    /// never assigned.
    pub fn get_association(&self, id: RecordId, name: &str) -> StoreResult<Option<&AssociationValue>> {
        let record = self
            .records
            .get(&id)
            .ok_or(StoreError::RecordNotFound(id))?;
        Ok(record.association(name))
    }

    // ==================== Query Operations ====================

    /// Find records by type.
    pub fn records_by_type(&self, type_id: TypeId) -> impl Iterator<Item = RecordId> + '_ {
        self.type_index.get(type_id)
    }

    // ==================== Statistics ====================

    /// Get the number of records in the store.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Get all record IDs.
    pub fn all_record_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.keys().copied()
    }
}
