//! Resource Graph
//!
//! A tree of resource scopes. Each scope registers its own resources and inherits
//! from its parent; when materialized from a scope, child registrations win.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::resources::ResourceCollections;
use crate::error::{CompilerError, Result};

pub type ResourceScopeId = String;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceScope {
    pub id: ResourceScopeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceScopeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub resources: ResourceCollections,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraph {
    pub root: ResourceScopeId,
    pub scopes: IndexMap<ResourceScopeId, ResourceScope>,
}

impl ResourceGraph {
    pub fn new(root: impl Into<ResourceScopeId>) -> Self {
        let root = root.into();
        let mut scopes = IndexMap::new();
        scopes.insert(
            root.clone(),
            ResourceScope {
                id: root.clone(),
                label: Some("root".to_string()),
                ..Default::default()
            },
        );
        ResourceGraph { root, scopes }
    }

    pub fn root_scope_mut(&mut self) -> &mut ResourceScope {
        let root = self.root.clone();
        self.scopes.entry(root.clone()).or_insert_with(|| ResourceScope {
            id: root,
            ..Default::default()
        })
    }

    /// Add (or replace) a scope. A missing parent defaults to the root.
    pub fn add_scope(
        &mut self,
        id: impl Into<ResourceScopeId>,
        parent: Option<&str>,
        resources: ResourceCollections,
    ) -> &mut ResourceScope {
        let id = id.into();
        let parent = Some(parent.map(str::to_string).unwrap_or_else(|| self.root.clone())).filter(|p| *p != id);
        self.scopes.insert(
            id.clone(),
            ResourceScope {
                id: id.clone(),
                parent,
                label: None,
                resources,
            },
        );
        // `id` was inserted on the line above.
        &mut self.scopes[&id]
    }

    pub fn scope(&self, id: &str) -> Option<&ResourceScope> {
        self.scopes.get(id)
    }

    /// Scopes from `id` up to the root, innermost first. Cycles are cut at the first repeat.
    pub fn chain(&self, id: &str) -> Result<Vec<&ResourceScope>> {
        let mut scope = self.scopes.get(id).ok_or_else(|| CompilerError::UnknownScope(id.to_string()))?;
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut chain = Vec::new();
        loop {
            if !seen.insert(scope.id.as_str()) {
                break;
            }
            chain.push(scope);
            match scope.parent.as_deref().and_then(|p| self.scopes.get(p)) {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        Ok(chain)
    }

    /// Resources visible from `id`: `base`, then each scope from the root down to `id`.
    pub fn materialize(&self, base: &ResourceCollections, id: &str) -> Result<ResourceCollections> {
        let chain = self.chain(id)?;
        let mut out = base.clone();
        for scope in chain.iter().rev() {
            out.overlay(&scope.resources);
        }
        tracing::trace!(scope = id, depth = chain.len(), resources = out.len(), "materialized resource scope");
        Ok(out)
    }
}
