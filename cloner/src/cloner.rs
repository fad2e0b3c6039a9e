//! The cloner - recursive deep copy of records.
//!
//! The public entry points normalize the caller's directive into a plan,
//! validate it against the schema, then run a single recursive descent that
//! copies fields, applies exclusions, clones included associations and
//! relinks plural children to the new parent copy.

use graft_core::{AssociationValue, RecordId, TypeId, Value};
use graft_registry::{AssociationDef, Cardinality, Registry};
use graft_store::Store;

use crate::dictionary::CloneDictionary;
use crate::directive::Directive;
use crate::error::{CloneError, CloneResult};
use crate::plan::ClonePlan;

/// Record cloner.
pub struct Cloner<'r, 's> {
    registry: &'r Registry,
    store: &'s mut Store,
}

impl<'r, 's> Cloner<'r, 's> {
    /// Create a new cloner.
    pub fn new(registry: &'r Registry, store: &'s mut Store) -> Self {
        Self { registry, store }
    }

    /// Clone a record per the directive.
    ///
    /// With `use_dictionary` set, a fresh dictionary is shared across the
    /// whole descent; otherwise every path to a record produces its own copy.
    pub fn clone_record(&mut self, id: RecordId, directive: &Directive) -> CloneResult<RecordId> {
        let plan = ClonePlan::from_directive(directive);
        self.validate(id, &plan)?;
        if directive.use_dictionary {
            let mut dictionary = CloneDictionary::new();
            clone_node(self.registry, self.store, id, &plan, Some(&mut dictionary))
        } else {
            clone_node(self.registry, self.store, id, &plan, None)
        }
    }

    /// Clone a record with a caller-provided dictionary.
    ///
    /// The dictionary may be pre-seeded to force reuse of existing copies,
    /// and is left populated with every copy this call records.
    pub fn clone_record_with(
        &mut self,
        id: RecordId,
        directive: &Directive,
        dictionary: &mut CloneDictionary,
    ) -> CloneResult<RecordId> {
        let plan = ClonePlan::from_directive(directive);
        self.validate(id, &plan)?;
        clone_node(self.registry, self.store, id, &plan, Some(dictionary))
    }

    fn validate(&self, id: RecordId, plan: &ClonePlan) -> CloneResult<()> {
        let root = self
            .store
            .get_record(id)
            .ok_or(CloneError::RecordNotFound(id))?;
        validate_plan(self.registry, root.type_id, plan)
    }
}

/// Check every association name in the plan against the schema, descending
/// through association target types. Runs before any record is created, so
/// an unknown name fails the call with no partial copy.
fn validate_plan(registry: &Registry, type_id: TypeId, plan: &ClonePlan) -> CloneResult<()> {
    let type_def = registry
        .get_type(type_id)
        .ok_or(CloneError::TypeNotFound(type_id))?;

    for (name, child_plan) in plan.children() {
        let association = type_def
            .get_association(name)
            .ok_or_else(|| CloneError::association_not_found(&type_def.name, name))?;
        validate_plan(registry, association.target, child_plan)?;
    }
    Ok(())
}

/// Clone one record and, per the plan, its associated records.
fn clone_node(
    registry: &Registry,
    store: &mut Store,
    original: RecordId,
    plan: &ClonePlan,
    mut dictionary: Option<&mut CloneDictionary>,
) -> CloneResult<RecordId> {
    let (type_id, base_fields) = {
        let record = store
            .get_record(original)
            .ok_or(CloneError::RecordNotFound(original))?;
        (record.type_id, record.fields.clone())
    };

    // Cycle-breaking step: a recurring original resolves to the copy already
    // recorded for it, with no second base copy and no second descent.
    if let Some(dict) = dictionary.as_deref_mut() {
        if let Some(existing) = dict.get(type_id, original) {
            return Ok(existing);
        }
    }

    // The base copy: same type, scalar fields copied verbatim, association
    // slots empty. Recorded in the dictionary before descending so a cycle
    // reached below resolves to this in-progress copy.
    let copy = store.create_record(type_id, base_fields);
    if let Some(dict) = dictionary.as_deref_mut() {
        dict.insert(type_id, original, copy);
    }

    let type_def = registry
        .get_type(type_id)
        .ok_or(CloneError::TypeNotFound(type_id))?;

    // Exclusions at this level reset to the declared default. An undeclared
    // name resets to Null when the copy carries it and is ignored otherwise.
    for name in plan.except_fields() {
        match type_def.get_field(name) {
            Some(field) => {
                let reset = field.default.clone().unwrap_or(Value::Null);
                store.set_field(copy, name, reset)?;
            }
            None => {
                if store.get_field(copy, name)?.is_some() {
                    store.set_field(copy, name, Value::Null)?;
                }
            }
        }
    }

    for (name, child_plan) in plan.children() {
        let association = type_def
            .get_association(name)
            .ok_or_else(|| CloneError::association_not_found(&type_def.name, name))?;

        match association.cardinality {
            Cardinality::Singular => {
                let related = store
                    .get_record(original)
                    .ok_or(CloneError::RecordNotFound(original))?
                    .association(name)
                    .and_then(|slot| slot.as_one());

                // An empty slot produces no related copy; the slot on the
                // copy stays unset.
                if let Some(related) = related {
                    let related_copy = clone_node(
                        registry,
                        store,
                        related,
                        child_plan,
                        dictionary.as_deref_mut(),
                    )?;
                    store.set_association(copy, name, AssociationValue::One(related_copy))?;
                }
            }
            Cardinality::Plural => {
                let related: Vec<RecordId> = store
                    .get_record(original)
                    .ok_or(CloneError::RecordNotFound(original))?
                    .association(name)
                    .and_then(|slot| slot.as_many())
                    .map(|ids| ids.to_vec())
                    .unwrap_or_default();

                let mut copies = Vec::with_capacity(related.len());
                for related_id in related {
                    let related_copy = clone_node(
                        registry,
                        store,
                        related_id,
                        child_plan,
                        dictionary.as_deref_mut(),
                    )?;
                    relink_plural_child(registry, store, related_copy, copy, association)?;
                    copies.push(related_copy);
                }
                store.set_association(copy, name, AssociationValue::Many(copies))?;
            }
        }
    }

    Ok(copy)
}

/// Relink a plural child copy to its new parent.
///
/// The foreign key still pointing at the original parent is cleared first.
/// When the child's type declares a reverse association (first declared
/// association matching the foreign key), both the key and the reverse slot
/// are pointed at the parent copy; otherwise the relationship stays
/// one-directional with the key cleared.
fn relink_plural_child(
    registry: &Registry,
    store: &mut Store,
    child: RecordId,
    parent: RecordId,
    association: &AssociationDef,
) -> CloneResult<()> {
    store.set_field(child, &association.foreign_key, Value::Null)?;

    let child_type = store
        .get_record(child)
        .ok_or(CloneError::RecordNotFound(child))?
        .type_id;

    if let Some(reverse) = registry.find_reverse(child_type, &association.foreign_key) {
        store.set_field(child, &association.foreign_key, Value::RecordRef(parent))?;
        let back_reference = match reverse.cardinality {
            Cardinality::Singular => AssociationValue::One(parent),
            Cardinality::Plural => AssociationValue::Many(vec![parent]),
        };
        store.set_association(child, &reverse.name, back_reference)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::fields;
    use graft_registry::{FieldDef, RegistryBuilder};

    fn blog_registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder
            .add_type("Author")
            .field(FieldDef::new("name", "String"))
            .field(FieldDef::new("rating", "Int").with_default(Value::Int(0)))
            .plural("posts", "Post", "author_id")
            .singular("avatar", "Image", "author_id")
            .done()
            .unwrap();
        builder
            .add_type("Post")
            .field(FieldDef::new("title", "String"))
            .field(FieldDef::new("author_id", "RecordRef"))
            .singular("author", "Author", "author_id")
            .plural("comments", "Comment", "post_id")
            .plural("images", "Image", "post_id")
            .done()
            .unwrap();
        builder
            .add_type("Comment")
            .field(FieldDef::new("body", "String"))
            .field(FieldDef::new("post_id", "RecordRef"))
            .singular("post", "Post", "post_id")
            .done()
            .unwrap();
        // Image declares no association matching "post_id": the
        // Post.images relationship is one-directional.
        builder
            .add_type("Image")
            .field(FieldDef::new("url", "String"))
            .field(FieldDef::new("post_id", "RecordRef"))
            .done()
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_bare_copy_is_detached() {
        // GIVEN
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let original = store.create_record(author_type, fields! { "name" => "Alice" });

        // WHEN cloned with an empty directive
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(original, &Directive::new())
            .unwrap();

        // THEN fields match at clone time
        assert_ne!(copy, original);
        assert_eq!(
            store.get_field(copy, "name").unwrap(),
            Some(&Value::String("Alice".into()))
        );

        // AND mutating the copy never changes the original
        store
            .set_field(copy, "name", Value::String("Bob".into()))
            .unwrap();
        assert_eq!(
            store.get_field(original, "name").unwrap(),
            Some(&Value::String("Alice".into()))
        );
    }

    #[test]
    fn test_exclusion_resets_to_default() {
        // GIVEN a field with a declared default and one without
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let original = store.create_record(
            author_type,
            fields! { "name" => "Alice", "rating" => 9i64 },
        );

        // WHEN both are excluded
        let directive = Directive::new().except("name").except("rating");
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(original, &directive)
            .unwrap();

        // THEN the defaulted field resets to its default, the other to Null
        assert_eq!(store.get_field(copy, "rating").unwrap(), Some(&Value::Int(0)));
        assert_eq!(store.get_field(copy, "name").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_unincluded_association_is_not_visited() {
        // GIVEN an author with posts
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let post_type = registry.get_type_id("Post").unwrap();
        let author = store.create_record(author_type, fields! { "name" => "Alice" });
        let post = store.create_record(post_type, fields! { "title" => "One" });
        store
            .set_association(author, "posts", AssociationValue::Many(vec![post]))
            .unwrap();

        // WHEN cloned without including "posts"
        let before = store.record_count();
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(author, &Directive::new())
            .unwrap();

        // THEN no post was copied and the slot stays unset
        assert_eq!(store.record_count(), before + 1);
        assert!(store.get_association(copy, "posts").unwrap().is_none());
    }

    #[test]
    fn test_singular_association_cloned() {
        // GIVEN an author with an avatar
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let image_type = registry.get_type_id("Image").unwrap();
        let author = store.create_record(author_type, fields! { "name" => "Alice" });
        let avatar = store.create_record(image_type, fields! { "url" => "a.png" });
        store
            .set_association(author, "avatar", AssociationValue::One(avatar))
            .unwrap();

        // WHEN
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(author, &Directive::new().include("avatar"))
            .unwrap();

        // THEN the slot holds a new image, not the original
        let avatar_copy = store
            .get_association(copy, "avatar")
            .unwrap()
            .and_then(|slot| slot.as_one())
            .expect("Slot should be set");
        assert_ne!(avatar_copy, avatar);
        assert_eq!(
            store.get_field(avatar_copy, "url").unwrap(),
            Some(&Value::String("a.png".into()))
        );
    }

    #[test]
    fn test_empty_singular_slot_produces_no_copy() {
        // GIVEN an author without an avatar
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let author = store.create_record(author_type, fields! { "name" => "Alice" });

        // WHEN
        let before = store.record_count();
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(author, &Directive::new().include("avatar"))
            .unwrap();

        // THEN only the author was copied and the slot stays unset
        assert_eq!(store.record_count(), before + 1);
        assert!(store.get_association(copy, "avatar").unwrap().is_none());
    }

    #[test]
    fn test_plural_children_relinked_to_new_parent() {
        // GIVEN a post with two comments whose keys point at it
        let registry = blog_registry();
        let mut store = Store::new();
        let post_type = registry.get_type_id("Post").unwrap();
        let comment_type = registry.get_type_id("Comment").unwrap();
        let post = store.create_record(post_type, fields! { "title" => "One" });
        let c1 = store.create_record(
            comment_type,
            fields! { "body" => "first", "post_id" => post },
        );
        let c2 = store.create_record(
            comment_type,
            fields! { "body" => "second", "post_id" => post },
        );
        store
            .set_association(post, "comments", AssociationValue::Many(vec![c1, c2]))
            .unwrap();

        // WHEN
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(post, &Directive::new().include("comments"))
            .unwrap();

        // THEN the copy has two new comments in source order
        let copies: Vec<RecordId> = store
            .get_association(copy, "comments")
            .unwrap()
            .and_then(|slot| slot.as_many())
            .expect("Slot should be set")
            .to_vec();
        assert_eq!(copies.len(), 2);
        assert!(!copies.contains(&c1));
        assert!(!copies.contains(&c2));
        assert_eq!(
            store.get_field(copies[0], "body").unwrap(),
            Some(&Value::String("first".into()))
        );
        assert_eq!(
            store.get_field(copies[1], "body").unwrap(),
            Some(&Value::String("second".into()))
        );

        // AND each key and reverse slot points at the new parent, not the
        // original
        for comment_copy in copies {
            assert_eq!(
                store.get_field(comment_copy, "post_id").unwrap(),
                Some(&Value::RecordRef(copy))
            );
            assert_eq!(
                store
                    .get_association(comment_copy, "post")
                    .unwrap()
                    .and_then(|slot| slot.as_one()),
                Some(copy)
            );
        }
    }

    #[test]
    fn test_plural_child_without_reverse_keeps_key_cleared() {
        // GIVEN Image declares no association matching "post_id"
        // (the relationship is one-directional)
        let registry = blog_registry();
        let mut store = Store::new();
        let post_type = registry.get_type_id("Post").unwrap();
        let image_type = registry.get_type_id("Image").unwrap();
        let post = store.create_record(post_type, fields!());
        let image = store.create_record(image_type, fields! { "post_id" => post });
        store
            .set_association(post, "images", AssociationValue::Many(vec![image]))
            .unwrap();

        assert!(registry.find_reverse(image_type, "post_id").is_none());

        // WHEN
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(post, &Directive::new().include("images"))
            .unwrap();

        // THEN the key is cleared and no back-reference is set
        let image_copy = store
            .get_association(copy, "images")
            .unwrap()
            .and_then(|slot| slot.as_many())
            .unwrap()[0];
        assert_eq!(
            store.get_field(image_copy, "post_id").unwrap(),
            Some(&Value::Null)
        );
        assert_eq!(store.get_record(image_copy).unwrap().associations().count(), 0);
    }

    #[test]
    fn test_missing_association_fails_with_no_partial_copy() {
        // GIVEN
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let author = store.create_record(author_type, fields! { "name" => "Alice" });

        // WHEN cloned with an unknown association name
        let before = store.record_count();
        let result = Cloner::new(&registry, &mut store)
            .clone_record(author, &Directive::new().include("bookmarks"));

        // THEN the call fails and nothing was created
        assert!(matches!(
            result,
            Err(CloneError::AssociationNotFound { .. })
        ));
        assert_eq!(store.record_count(), before);
    }

    #[test]
    fn test_missing_nested_association_fails_with_no_partial_copy() {
        // GIVEN an author with a post
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let post_type = registry.get_type_id("Post").unwrap();
        let author = store.create_record(author_type, fields!());
        let post = store.create_record(post_type, fields!());
        store
            .set_association(author, "posts", AssociationValue::Many(vec![post]))
            .unwrap();

        // WHEN the nested name is unknown on Post
        let before = store.record_count();
        let directive = Directive::new().include(crate::directive::Include::nested(
            "posts",
            vec!["reactions".into()],
        ));
        let result = Cloner::new(&registry, &mut store).clone_record(author, &directive);

        // THEN validation catches it before any copy exists
        assert!(matches!(
            result,
            Err(CloneError::AssociationNotFound { .. })
        ));
        assert_eq!(store.record_count(), before);
    }

    #[test]
    fn test_without_dictionary_paths_duplicate() {
        // GIVEN two posts sharing one author reachable twice
        let registry = blog_registry();
        let mut store = Store::new();
        let author_type = registry.get_type_id("Author").unwrap();
        let post_type = registry.get_type_id("Post").unwrap();
        let author = store.create_record(author_type, fields! { "name" => "Alice" });
        let p1 = store.create_record(post_type, fields! { "title" => "One" });
        let p2 = store.create_record(post_type, fields! { "title" => "Two" });
        store
            .set_association(p1, "author", AssociationValue::One(author))
            .unwrap();
        store
            .set_association(p2, "author", AssociationValue::One(author))
            .unwrap();
        store
            .set_association(author, "posts", AssociationValue::Many(vec![p1, p2]))
            .unwrap();

        // WHEN each post is cloned including its author, no dictionary
        let directive = Directive::new().include("author");
        let c1 = Cloner::new(&registry, &mut store)
            .clone_record(p1, &directive)
            .unwrap();
        let c2 = Cloner::new(&registry, &mut store)
            .clone_record(p2, &directive)
            .unwrap();

        // THEN the author was copied independently for each path
        let a1 = store
            .get_association(c1, "author")
            .unwrap()
            .and_then(|slot| slot.as_one())
            .unwrap();
        let a2 = store
            .get_association(c2, "author")
            .unwrap()
            .and_then(|slot| slot.as_one())
            .unwrap();
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_dictionary_collapses_duplicate_collection_entries() {
        // GIVEN a post whose collection lists the same comment twice
        let registry = blog_registry();
        let mut store = Store::new();
        let post_type = registry.get_type_id("Post").unwrap();
        let comment_type = registry.get_type_id("Comment").unwrap();
        let post = store.create_record(post_type, fields!());
        let comment = store.create_record(comment_type, fields! { "body" => "hi" });
        store
            .set_association(
                post,
                "comments",
                AssociationValue::Many(vec![comment, comment]),
            )
            .unwrap();

        // WHEN cloned with a dictionary
        let directive = Directive::new().include("comments").use_dictionary();
        let copy = Cloner::new(&registry, &mut store)
            .clone_record(post, &directive)
            .unwrap();

        // THEN the collection still has two entries, both the same copy
        let copies = store
            .get_association(copy, "comments")
            .unwrap()
            .and_then(|slot| slot.as_many())
            .unwrap()
            .to_vec();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0], copies[1]);
    }
}
