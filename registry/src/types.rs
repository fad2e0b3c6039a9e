//! Schema definition types.

use graft_core::{TypeId, Value};
use std::collections::HashMap;

/// Cardinality of an association.
///
/// Resolved once from the schema; the cloner dispatches on this tag and never
/// inspects runtime slot shapes to decide how to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// One related record.
    Singular,
    /// An ordered collection of related records.
    Plural,
}

impl Cardinality {
    /// Returns true for the plural variant.
    pub fn is_plural(&self) -> bool {
        matches!(self, Cardinality::Plural)
    }
}

/// Field definition within a type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Type name (String, Int, Float, Bool, etc.).
    pub type_name: String,
    /// Default value. Excluding a field during a clone resets it to this
    /// (Null when no default is declared).
    pub default: Option<Value>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Association definition within a type.
///
/// Describes one association slot: its cardinality, the type on the other
/// side, and the foreign-key field on the "many" side that points back at
/// the owner.
#[derive(Debug, Clone)]
pub struct AssociationDef {
    /// Association name.
    pub name: String,
    /// Singular or plural.
    pub cardinality: Cardinality,
    /// Type of the related record(s).
    pub target: TypeId,
    /// Foreign-key field name on the "many" side.
    pub foreign_key: String,
}

/// Record type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Unique identifier.
    pub id: TypeId,
    /// Type name.
    pub name: String,
    /// Field definitions.
    pub fields: HashMap<String, FieldDef>,
    /// Association definitions. Declaration order is meaningful: reverse
    /// lookup returns the first match.
    pub associations: Vec<AssociationDef>,
}

impl TypeDef {
    pub fn new(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: HashMap::new(),
            associations: Vec::new(),
        }
    }

    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Check if this type has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Get an association definition by name.
    pub fn get_association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Get all association names, in declaration order.
    pub fn association_names(&self) -> impl Iterator<Item = &str> {
        self.associations.iter().map(|a| a.name.as_str())
    }
}
