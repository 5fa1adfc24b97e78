//! Schema Module
//!
//! Resource definitions, template controller configuration, the built-in catalog,
//! the scoped resource graph and name lookup.

pub mod builtins;
pub mod controllers;
pub mod lookup;
pub mod resource_graph;
pub mod resources;

pub use builtins::builtin_resources;
pub use controllers::*;
pub use lookup::{ProjectSemantics, SemanticsLookup};
pub use resource_graph::{ResourceGraph, ResourceScope, ResourceScopeId};
pub use resources::*;
