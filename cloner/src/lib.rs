//! Graft Cloner
//!
//! Deep copy of a record together with a caller-selected subset of its
//! associated records, without duplicating shared sub-records and without
//! infinite recursion on cyclic association graphs.
//!
//! Responsibilities:
//! - Parse the loose caller-facing directive into a typed traversal plan
//! - Copy scalar fields, applying per-level exclusions
//! - Descend into included associations, singular and plural
//! - Relink foreign keys of plural children to the new parent copy
//! - Deduplicate recurring records through an opt-in dictionary
//!
//! # Module Structure
//!
//! - `cloner` - Main Cloner that drives the recursive copy
//! - `directive` - Raw include/except/dictionary input surface
//! - `plan` - Normalized traversal plan built once per call
//! - `dictionary` - Original-to-copy memo map
//! - `error` - Error types for clone failures

mod cloner;
mod dictionary;
mod directive;
mod error;
mod plan;

pub use cloner::Cloner;
pub use dictionary::CloneDictionary;
pub use directive::{Directive, DirectiveError, Except, Include};
pub use error::{CloneError, CloneResult};
pub use plan::ClonePlan;
