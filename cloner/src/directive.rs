//! Raw clone directives - the caller-facing input structure.
//!
//! A directive says which associations to descend into, which fields to
//! reset, and whether recurring records should be deduplicated through a
//! dictionary. It is parsed once into a [`ClonePlan`](crate::ClonePlan) at
//! the entry point; the recursive engine never sees this raw form.
//!
//! The same structure can be supplied as loosely-shaped JSON:
//!
//! ```json
//! {
//!     "include": ["members", {"albums": ["tracks"]}],
//!     "except": ["name", {"manager": ["name"]}],
//!     "use_dictionary": true
//! }
//! ```

use serde_json::Value as Json;
use thiserror::Error;

/// Errors raised while interpreting a JSON-shaped directive.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("Invalid directive shape: expected object, string or array, got {0}")]
    InvalidShape(String),

    #[error("Invalid include entry: {0}")]
    InvalidInclude(String),

    #[error("Invalid except entry: {0}")]
    InvalidExcept(String),

    #[error("Unexpected directive key: {0}")]
    UnexpectedKey(String),
}

/// One entry of the include list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Include {
    /// Descend into this association; its records are copied without
    /// descending further.
    Assoc(String),
    /// Descend into this association with a constrained subtree.
    Nested(String, Vec<Include>),
}

impl Include {
    pub fn assoc(name: impl Into<String>) -> Self {
        Include::Assoc(name.into())
    }

    pub fn nested(name: impl Into<String>, children: Vec<Include>) -> Self {
        Include::Nested(name.into(), children)
    }
}

impl From<&str> for Include {
    fn from(name: &str) -> Self {
        Include::Assoc(name.to_string())
    }
}

impl From<String> for Include {
    fn from(name: String) -> Self {
        Include::Assoc(name)
    }
}

/// One entry of the except list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Except {
    /// Reset this field at the current level.
    Field(String),
    /// Exclusions carried into the recursive call for this association only.
    Nested(String, Vec<Except>),
}

impl Except {
    pub fn field(name: impl Into<String>) -> Self {
        Except::Field(name.into())
    }

    pub fn nested(association: impl Into<String>, children: Vec<Except>) -> Self {
        Except::Nested(association.into(), children)
    }
}

impl From<&str> for Except {
    fn from(name: &str) -> Self {
        Except::Field(name.to_string())
    }
}

impl From<String> for Except {
    fn from(name: String) -> Self {
        Except::Field(name)
    }
}

/// The full clone directive for one top-level call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    /// Associations to descend into, in order.
    pub include: Vec<Include>,
    /// Fields to reset, at this level or nested under an association.
    pub except: Vec<Except>,
    /// Deduplicate recurring records through a dictionary shared across the
    /// whole invocation.
    pub use_dictionary: bool,
}

impl Directive {
    /// An empty directive: copy the record's fields, touch no association.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include entry.
    pub fn include(mut self, entry: impl Into<Include>) -> Self {
        self.include.push(entry.into());
        self
    }

    /// Add an except entry.
    pub fn except(mut self, entry: impl Into<Except>) -> Self {
        self.except.push(entry.into());
        self
    }

    /// Request a fresh shared dictionary for this call.
    pub fn use_dictionary(mut self) -> Self {
        self.use_dictionary = true;
        self
    }

    /// Interpret a loosely-shaped JSON rendition of a directive.
    ///
    /// Accepts a full object, or a bare string/array as shorthand for the
    /// include list.
    pub fn from_json(json: &Json) -> Result<Self, DirectiveError> {
        match json {
            Json::Object(map) => {
                let mut directive = Directive::new();
                for (key, value) in map {
                    match key.as_str() {
                        "include" => directive.include = parse_include_list(value)?,
                        "except" => directive.except = parse_except_list(value)?,
                        "use_dictionary" => {
                            directive.use_dictionary = value.as_bool().unwrap_or(false)
                        }
                        other => return Err(DirectiveError::UnexpectedKey(other.to_string())),
                    }
                }
                Ok(directive)
            }
            Json::String(_) | Json::Array(_) => Ok(Directive {
                include: parse_include_list(json)?,
                ..Directive::new()
            }),
            other => Err(DirectiveError::InvalidShape(other.to_string())),
        }
    }
}

fn parse_include_list(json: &Json) -> Result<Vec<Include>, DirectiveError> {
    match json {
        Json::String(name) => Ok(vec![Include::assoc(name.clone())]),
        Json::Array(entries) => {
            let mut list = Vec::with_capacity(entries.len());
            for entry in entries {
                list.extend(parse_include_entry(entry)?);
            }
            Ok(list)
        }
        Json::Object(_) => parse_include_entry(json),
        other => Err(DirectiveError::InvalidInclude(other.to_string())),
    }
}

fn parse_include_entry(json: &Json) -> Result<Vec<Include>, DirectiveError> {
    match json {
        Json::String(name) => Ok(vec![Include::assoc(name.clone())]),
        // Each object entry maps an association name to its subtree.
        Json::Object(map) => map
            .iter()
            .map(|(name, nested)| {
                Ok(Include::nested(name.clone(), parse_include_list(nested)?))
            })
            .collect(),
        other => Err(DirectiveError::InvalidInclude(other.to_string())),
    }
}

fn parse_except_list(json: &Json) -> Result<Vec<Except>, DirectiveError> {
    match json {
        Json::String(name) => Ok(vec![Except::field(name.clone())]),
        Json::Array(entries) => {
            let mut list = Vec::with_capacity(entries.len());
            for entry in entries {
                list.extend(parse_except_entry(entry)?);
            }
            Ok(list)
        }
        Json::Object(_) => parse_except_entry(json),
        other => Err(DirectiveError::InvalidExcept(other.to_string())),
    }
}

fn parse_except_entry(json: &Json) -> Result<Vec<Except>, DirectiveError> {
    match json {
        Json::String(name) => Ok(vec![Except::field(name.clone())]),
        Json::Object(map) => map
            .iter()
            .map(|(name, nested)| Ok(Except::nested(name.clone(), parse_except_list(nested)?)))
            .collect(),
        other => Err(DirectiveError::InvalidExcept(other.to_string())),
    }
}
