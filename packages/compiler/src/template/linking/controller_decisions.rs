//! Controller decision tables.
//!
//! Applied in order: branch reclassification, generic resolution, branch
//! placement, iterator command, tail props.

use crate::diagnostics::reason;
use crate::schema::{BranchRelationship, ControllerConfig, ControllerTrigger, SemanticsLookup};
use crate::template::ir::IteratorTailPropIR;

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerClass {
    /// Branch of an enclosing controller (`then` inside `promise`).
    Branch { config: ControllerConfig, parent: String },
    Resolved(ControllerConfig),
    Unresolved(ControllerConfig),
}

impl ControllerClass {
    pub fn config(&self) -> &ControllerConfig {
        match self {
            ControllerClass::Branch { config, .. }
            | ControllerClass::Resolved(config)
            | ControllerClass::Unresolved(config) => config,
        }
    }

    pub fn into_config(self) -> (ControllerConfig, bool) {
        match self {
            ControllerClass::Branch { config, .. } | ControllerClass::Resolved(config) => (config, true),
            ControllerClass::Unresolved(config) => (config, false),
        }
    }
}

/// Classify `name` given the enclosing controllers, innermost last.
///
/// Child branches are matched against enclosing controllers before the
/// catalog is consulted, so a branch still links when its own entry is missing.
pub fn classify_controller(
    lookup: &SemanticsLookup,
    name: &str,
    command: Option<&str>,
    enclosing: &[ControllerConfig],
) -> ControllerClass {
    let key = name.to_ascii_lowercase();
    let owner = enclosing.iter().rev().find(|c| {
        c.branches.as_ref().map_or(false, |b| {
            b.relationship == BranchRelationship::Child && b.names.iter().any(|n| *n == key)
        })
    });
    if let Some(owner) = owner {
        let config = lookup.controller(&key).cloned().unwrap_or_else(|| {
            ControllerConfig::new(
                key.clone(),
                ControllerTrigger::Branch {
                    parents: vec![owner.name.clone()],
                    prop: None,
                },
            )
        });
        return ControllerClass::Branch {
            config,
            parent: owner.name.clone(),
        };
    }
    match lookup.controller(&key) {
        Some(config) => ControllerClass::Resolved(config.clone()),
        None if command == Some("for") => {
            let mut stub = ControllerConfig::stub(&key);
            stub.trigger = ControllerTrigger::Iterator {
                prop: "items".to_string(),
                command: "for".to_string(),
                tail_props: Default::default(),
            };
            ControllerClass::Unresolved(stub)
        }
        None => ControllerClass::Unresolved(ControllerConfig::stub(&key)),
    }
}

/// Relationship a branch controller must satisfy, from its parents' configs.
pub fn branch_relationship(lookup: &SemanticsLookup, config: &ControllerConfig) -> Option<BranchRelationship> {
    config
        .branch_parents()
        .iter()
        .filter_map(|p| lookup.controller(p))
        .find_map(|p| p.branches.as_ref().map(|b| b.relationship))
}

/// `Some(reason)` when the authored command does not fit the controller's trigger.
pub fn iterator_command_mismatch(config: &ControllerConfig, command: Option<&str>) -> Option<&'static str> {
    let expected = match &config.trigger {
        ControllerTrigger::Iterator { command, .. } => Some(command.as_str()),
        _ => None,
    };
    match (expected, command) {
        (Some(expected), Some(actual)) if expected == actual => None,
        (Some(_), _) => Some(reason::ITERATOR_COMMAND_REQUIRED),
        (None, Some("for")) => Some(reason::ITERATOR_COMMAND_UNEXPECTED),
        (None, _) => None,
    }
}

/// `Some(reason)` when a tail prop is unknown or uses a command it does not accept.
pub fn tail_prop_violation(config: &ControllerConfig, tail: &IteratorTailPropIR) -> Option<&'static str> {
    let ControllerTrigger::Iterator { tail_props, .. } = &config.trigger else {
        return Some(reason::TAIL_PROP_UNKNOWN);
    };
    match tail_props.get(&tail.to) {
        None => Some(reason::TAIL_PROP_UNKNOWN),
        Some(prop) if !prop.accepts(tail.command.as_deref()) => Some(reason::TAIL_PROP_MODE),
        Some(_) => None,
    }
}
