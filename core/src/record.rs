//! Record structures for graft.
//!
//! A record is a node in the object graph: a type tag, a mutable collection
//! of named scalar fields, and a set of named association slots pointing at
//! other records.

use crate::{Fields, RecordId, TypeId, Value};
use std::collections::HashMap;

/// What an association slot holds.
///
/// Singular associations store one related record, plural associations store
/// an ordered collection. Order in `Many` is meaningful and preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationValue {
    One(RecordId),
    Many(Vec<RecordId>),
}

impl AssociationValue {
    /// Returns true if this is a singular slot value.
    pub fn is_one(&self) -> bool {
        matches!(self, AssociationValue::One(_))
    }

    /// Returns true if this is a plural slot value.
    pub fn is_many(&self) -> bool {
        matches!(self, AssociationValue::Many(_))
    }

    /// Get the related record if this is a singular slot value.
    pub fn as_one(&self) -> Option<RecordId> {
        match self {
            AssociationValue::One(id) => Some(*id),
            AssociationValue::Many(_) => None,
        }
    }

    /// Get the related records if this is a plural slot value.
    pub fn as_many(&self) -> Option<&[RecordId]> {
        match self {
            AssociationValue::One(_) => None,
            AssociationValue::Many(ids) => Some(ids),
        }
    }

    /// All record IDs referenced by this slot value.
    pub fn target_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        match self {
            AssociationValue::One(id) => std::slice::from_ref(id).iter().copied(),
            AssociationValue::Many(ids) => ids.iter().copied(),
        }
    }
}

impl From<RecordId> for AssociationValue {
    fn from(id: RecordId) -> Self {
        AssociationValue::One(id)
    }
}

impl From<Vec<RecordId>> for AssociationValue {
    fn from(ids: Vec<RecordId>) -> Self {
        AssociationValue::Many(ids)
    }
}

/// A record in the object graph.
#[derive(Debug, Clone)]
pub struct Record {
    /// Unique identifier for this record.
    pub id: RecordId,
    /// Type of this record (reference to registry).
    pub type_id: TypeId,
    /// Scalar field values.
    pub fields: Fields,
    /// Association slots, keyed by association name. A slot that was never
    /// assigned is simply absent.
    associations: HashMap<String, AssociationValue>,
}

impl Record {
    /// Create a new record with the given fields and no association slots.
    pub fn new(id: RecordId, type_id: TypeId, fields: Fields) -> Self {
        Self {
            id,
            type_id,
            fields,
            associations: HashMap::new(),
        }
    }

    /// Get a field value by name.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field value.
    pub fn set_field(&mut self, name: String, value: Value) {
        self.fields.insert(name, value);
    }

    /// Remove a field.
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Get an association slot by name. Absent means the slot was never
    /// assigned.
    pub fn association(&self, name: &str) -> Option<&AssociationValue> {
        self.associations.get(name)
    }

    /// Assign an association slot.
    pub fn set_association(&mut self, name: String, value: AssociationValue) {
        self.associations.insert(name, value);
    }

    /// Iterate over assigned association slots.
    pub fn associations(&self) -> impl Iterator<Item = (&str, &AssociationValue)> {
        self.associations.iter().map(|(k, v)| (k.as_str(), v))
    }
}
