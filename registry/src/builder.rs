//! RegistryBuilder for constructing an immutable Registry.

use crate::{AssociationDef, Cardinality, FieldDef, Registry, TypeDef};
use graft_core::TypeId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Duplicate association name: {association} on type {type_name}")]
    DuplicateAssociationName {
        type_name: String,
        association: String,
    },

    #[error("Unknown target type {target} for association {type_name}.{association}")]
    UnknownTargetType {
        type_name: String,
        association: String,
        target: String,
    },

    #[error("Foreign key {field} of association {type_name}.{association} is not a field of its target type")]
    UnknownForeignKey {
        type_name: String,
        association: String,
        field: String,
    },
}

/// An association whose target is still a type name. Targets are resolved to
/// IDs at build() so mutually-referencing type pairs can be declared in any
/// order.
#[derive(Debug)]
struct PendingAssociation {
    name: String,
    cardinality: Cardinality,
    target_name: String,
    foreign_key: String,
}

#[derive(Debug)]
struct PendingType {
    id: TypeId,
    name: String,
    fields: HashMap<String, FieldDef>,
    associations: Vec<PendingAssociation>,
}

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Next type ID to allocate.
    next_type_id: u32,
    /// Types being built, in declaration order.
    types: Vec<PendingType>,
    /// Type name to ID mapping.
    type_names: HashMap<String, TypeId>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type definition.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        let name = name.into();
        let id = TypeId::new(self.next_type_id);
        self.next_type_id += 1;

        TypeBuilder {
            builder: self,
            id,
            name,
            fields: HashMap::new(),
            associations: Vec::new(),
        }
    }

    /// Build the immutable Registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut types = HashMap::new();

        for pending in &self.types {
            let mut type_def = TypeDef::new(pending.id, pending.name.clone());
            type_def.fields = pending.fields.clone();

            for assoc in &pending.associations {
                let target = self.type_names.get(&assoc.target_name).copied().ok_or(
                    RegistryError::UnknownTargetType {
                        type_name: pending.name.clone(),
                        association: assoc.name.clone(),
                        target: assoc.target_name.clone(),
                    },
                )?;

                // The foreign key of a plural association lives on the target
                // ("many") side and must be a declared field there, since
                // relinking writes it.
                if assoc.cardinality.is_plural() {
                    let target_fields = self
                        .types
                        .iter()
                        .find(|t| t.id == target)
                        .map(|t| &t.fields);
                    let known = target_fields
                        .map(|f| f.contains_key(&assoc.foreign_key))
                        .unwrap_or(false);
                    if !known {
                        return Err(RegistryError::UnknownForeignKey {
                            type_name: pending.name.clone(),
                            association: assoc.name.clone(),
                            field: assoc.foreign_key.clone(),
                        });
                    }
                }

                type_def.associations.push(AssociationDef {
                    name: assoc.name.clone(),
                    cardinality: assoc.cardinality,
                    target,
                    foreign_key: assoc.foreign_key.clone(),
                });
            }

            types.insert(pending.id, type_def);
        }

        Ok(Registry::new(types, self.type_names))
    }
}

/// Builder for a single type definition.
#[derive(Debug)]
pub struct TypeBuilder<'b> {
    builder: &'b mut RegistryBuilder,
    id: TypeId,
    name: String,
    fields: HashMap<String, FieldDef>,
    associations: Vec<PendingAssociation>,
}

impl<'b> TypeBuilder<'b> {
    /// Add a field definition.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.insert(def.name.clone(), def);
        self
    }

    /// Add a singular association (one related record).
    pub fn singular(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.association(name, Cardinality::Singular, target, foreign_key)
    }

    /// Add a plural association (an ordered collection of related records).
    pub fn plural(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.association(name, Cardinality::Plural, target, foreign_key)
    }

    fn association(
        mut self,
        name: impl Into<String>,
        cardinality: Cardinality,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.associations.push(PendingAssociation {
            name: name.into(),
            cardinality,
            target_name: target.into(),
            foreign_key: foreign_key.into(),
        });
        self
    }

    /// Finish this type and register it with the builder.
    pub fn done(self) -> Result<(), RegistryError> {
        if self.builder.type_names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateTypeName(self.name));
        }

        let mut seen = std::collections::HashSet::new();
        for assoc in &self.associations {
            if !seen.insert(assoc.name.as_str()) {
                return Err(RegistryError::DuplicateAssociationName {
                    type_name: self.name.clone(),
                    association: assoc.name.clone(),
                });
            }
        }

        self.builder.type_names.insert(self.name.clone(), self.id);
        self.builder.types.push(PendingType {
            id: self.id,
            name: self.name,
            fields: self.fields,
            associations: self.associations,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::Value;

    #[test]
    fn test_build_basic_schema() {
        // GIVEN
        let mut builder = RegistryBuilder::new();
        builder
            .add_type("Folder")
            .field(FieldDef::new("name", "String"))
            .plural("bookmarks", "Bookmark", "folder_id")
            .done()
            .unwrap();
        builder
            .add_type("Bookmark")
            .field(FieldDef::new("url", "String"))
            .field(FieldDef::new("visit_count", "Int").with_default(Value::Int(0)))
            .field(FieldDef::new("folder_id", "RecordRef"))
            .done()
            .unwrap();

        // WHEN
        let registry = builder.build().unwrap();

        // THEN
        assert_eq!(registry.type_count(), 2);
        let folder = registry.get_type_by_name("Folder").unwrap();
        assert_eq!(folder.associations.len(), 1);
        assert_eq!(
            registry
                .get_type_by_name("Bookmark")
                .unwrap()
                .get_field("visit_count")
                .and_then(|f| f.default.clone()),
            Some(Value::Int(0))
        );
    }

    #[test]
    fn test_cyclic_schema_builds() {
        // GIVEN types that reference each other
        let mut builder = RegistryBuilder::new();
        builder
            .add_type("Pirate")
            .field(FieldDef::new("name", "String"))
            .plural("treasures", "Treasure", "pirate_id")
            .done()
            .unwrap();
        builder
            .add_type("Treasure")
            .field(FieldDef::new("pirate_id", "RecordRef"))
            .singular("pirate", "Pirate", "pirate_id")
            .done()
            .unwrap();

        // WHEN / THEN
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_duplicate_type_name() {
        // GIVEN
        let mut builder = RegistryBuilder::new();
        builder.add_type("Task").done().unwrap();

        // WHEN
        let result = builder.add_type("Task").done();

        // THEN
        assert!(matches!(result, Err(RegistryError::DuplicateTypeName(_))));
    }

    #[test]
    fn test_duplicate_association_name() {
        // GIVEN
        let mut builder = RegistryBuilder::new();

        // WHEN
        let result = builder
            .add_type("Person")
            .singular("avatar", "Image", "person_id")
            .singular("avatar", "Image", "person_id")
            .done();

        // THEN
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateAssociationName { .. })
        ));
    }

    #[test]
    fn test_unknown_target_type() {
        // GIVEN
        let mut builder = RegistryBuilder::new();
        builder
            .add_type("Person")
            .plural("pets", "Pet", "person_id")
            .done()
            .unwrap();

        // WHEN
        let result = builder.build();

        // THEN
        assert!(matches!(
            result,
            Err(RegistryError::UnknownTargetType { .. })
        ));
    }

    #[test]
    fn test_unknown_foreign_key_on_plural_target() {
        // GIVEN a plural association whose foreign key is not declared on the
        // target type
        let mut builder = RegistryBuilder::new();
        builder
            .add_type("Person")
            .plural("pets", "Pet", "owner_id")
            .done()
            .unwrap();
        builder
            .add_type("Pet")
            .field(FieldDef::new("name", "String"))
            .done()
            .unwrap();

        // WHEN
        let result = builder.build();

        // THEN
        assert!(matches!(
            result,
            Err(RegistryError::UnknownForeignKey { .. })
        ));
    }
}
