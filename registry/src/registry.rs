//! The Registry - immutable schema lookup.

use crate::{AssociationDef, FieldDef, TypeDef};
use graft_core::TypeId;
use std::collections::HashMap;

/// The Registry provides runtime lookup of schema definitions.
/// It is immutable after construction.
#[derive(Debug, Default)]
pub struct Registry {
    /// Type definitions by ID.
    types: HashMap<TypeId, TypeDef>,
    /// Type ID lookup by name.
    type_names: HashMap<String, TypeId>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(types: HashMap<TypeId, TypeDef>, type_names: HashMap<String, TypeId>) -> Self {
        Self { types, type_names }
    }

    // ==================== Type Lookups ====================

    /// Get a type definition by name.
    pub fn get_type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    /// Get a type definition by ID.
    pub fn get_type(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(&id)
    }

    /// Get a type ID by name.
    pub fn get_type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Get all type definitions.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Get the number of types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ==================== Field / Association Lookups ====================

    /// Get a field definition on a type.
    pub fn get_field(&self, type_id: TypeId, name: &str) -> Option<&FieldDef> {
        self.types.get(&type_id).and_then(|t| t.get_field(name))
    }

    /// Get an association definition on a type.
    pub fn get_association(&self, type_id: TypeId, name: &str) -> Option<&AssociationDef> {
        self.types
            .get(&type_id)
            .and_then(|t| t.get_association(name))
    }

    /// Find the reverse association on a child type: the first association
    /// declared on `child_type` whose foreign key equals `foreign_key`.
    ///
    /// When several associations share the foreign key, the first declared
    /// one wins; when none matches, the relationship is one-directional and
    /// None is returned.
    pub fn find_reverse(&self, child_type: TypeId, foreign_key: &str) -> Option<&AssociationDef> {
        self.types
            .get(&child_type)?
            .associations
            .iter()
            .find(|a| a.foreign_key == foreign_key)
    }
}
