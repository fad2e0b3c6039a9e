//! Normalized traversal plans.
//!
//! A plan is the typed form of a directive, built once per top-level call.
//! Each node carries the fields to reset at that level and the associations
//! to descend into, each with its own sub-plan. Nested except entries are
//! routed to the matching child here, so the recursive engine never has to
//! interpret raw input.

use crate::directive::{Directive, Except, Include};

/// The traversal plan for one node-type context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClonePlan {
    /// Fields reset at this level.
    except: Vec<String>,
    /// Associations to descend into, in directive order.
    children: Vec<(String, ClonePlan)>,
}

impl ClonePlan {
    /// Build the plan for a directive.
    pub fn from_directive(directive: &Directive) -> Self {
        Self::build(&directive.include, &directive.except)
    }

    fn build(include: &[Include], except: &[Except]) -> Self {
        let mut plan = ClonePlan::default();

        for entry in except {
            if let Except::Field(name) = entry {
                plan.except.push(name.clone());
            }
        }

        for entry in include {
            let (name, nested_include) = match entry {
                Include::Assoc(name) => (name, &[][..]),
                Include::Nested(name, children) => (name, children.as_slice()),
            };

            // Except entries nested under this association belong to its
            // sub-plan. Entries nested under an association that is not
            // included are inert.
            let nested_except: Vec<Except> = except
                .iter()
                .filter_map(|entry| match entry {
                    Except::Nested(association, children) if association == name => {
                        Some(children.clone())
                    }
                    _ => None,
                })
                .flatten()
                .collect();

            plan.children
                .push((name.clone(), Self::build(nested_include, &nested_except)));
        }

        plan
    }

    /// Fields reset at this level.
    pub fn except_fields(&self) -> &[String] {
        &self.except
    }

    /// Associations to descend into, with their sub-plans.
    pub fn children(&self) -> &[(String, ClonePlan)] {
        &self.children
    }
}
