//! Semantics Lookup
//!
//! Name resolution over a materialized resource catalog: exact lower-case lookup
//! first, then aliases. Catalog gaps are indexed alongside so callers can
//! qualify misses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::builtins::builtin_resources;
use super::controllers::ControllerConfig;
use super::resource_graph::ResourceGraph;
use super::resources::{
    AttrRes, BindingBehaviorSig, CatalogGap, ElementRes, ResourceCollections, ResourceKind, ValueConverterSig,
};
use crate::error::Result;

/// A project-wide semantics snapshot: global resources, optional scope graph and gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSemantics {
    #[serde(default)]
    pub resources: ResourceCollections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<ResourceGraph>,
    #[serde(default)]
    pub gaps: Vec<CatalogGap>,
}

impl ProjectSemantics {
    /// Built-in resources only.
    pub fn builtins() -> Self {
        ProjectSemantics {
            resources: builtin_resources().clone(),
            graph: None,
            gaps: Vec::new(),
        }
    }

    pub fn with_resources(mut self, resources: &ResourceCollections) -> Self {
        self.resources.overlay(resources);
        self
    }

    pub fn with_gap(mut self, gap: CatalogGap) -> Self {
        self.gaps.push(gap);
        self
    }

    pub fn with_graph(mut self, graph: ResourceGraph) -> Self {
        self.graph = Some(graph);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SemanticsLookup {
    resources: ResourceCollections,
    aliases: HashMap<(ResourceKind, String), String>,
    gaps: HashMap<(ResourceKind, String), CatalogGap>,
}

impl SemanticsLookup {
    /// Build a lookup, materializing the resource graph from `scope` when both are present.
    pub fn new(semantics: &ProjectSemantics, scope: Option<&str>) -> Result<Self> {
        let resources = match (&semantics.graph, scope) {
            (Some(graph), Some(scope)) => graph.materialize(&semantics.resources, scope)?,
            (Some(graph), None) => graph.materialize(&semantics.resources, &graph.root)?,
            (None, _) => semantics.resources.clone(),
        };
        Ok(Self::from_parts(resources, semantics.gaps.iter().cloned()))
    }

    pub fn from_parts(resources: ResourceCollections, gaps: impl IntoIterator<Item = CatalogGap>) -> Self {
        let mut aliases = HashMap::new();
        for (key, el) in &resources.elements {
            for alias in &el.aliases {
                aliases.insert((ResourceKind::CustomElement, alias.to_ascii_lowercase()), key.clone());
            }
        }
        for (key, attr) in &resources.attributes {
            for alias in &attr.aliases {
                aliases.insert((ResourceKind::CustomAttribute, alias.to_ascii_lowercase()), key.clone());
            }
        }
        for (key, ctrl) in &resources.controllers {
            for alias in &ctrl.aliases {
                aliases.insert((ResourceKind::TemplateController, alias.to_ascii_lowercase()), key.clone());
            }
        }
        for key in resources.value_converters.keys() {
            aliases.insert((ResourceKind::ValueConverter, key.to_ascii_lowercase()), key.clone());
        }
        for key in resources.binding_behaviors.keys() {
            aliases.insert((ResourceKind::BindingBehavior, key.to_ascii_lowercase()), key.clone());
        }
        let gaps = gaps
            .into_iter()
            .map(|gap| ((gap.kind, normalize(&gap.name)), gap))
            .collect();
        SemanticsLookup {
            resources,
            aliases,
            gaps,
        }
    }

    pub fn resources(&self) -> &ResourceCollections {
        &self.resources
    }

    fn canonical(&self, kind: ResourceKind, name: &str) -> Option<&str> {
        self.aliases
            .get(&(kind, name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn element(&self, name: &str) -> Option<&ElementRes> {
        let key = name.to_ascii_lowercase();
        self.resources.elements.get(&key).or_else(|| {
            self.canonical(ResourceKind::CustomElement, name)
                .and_then(|k| self.resources.elements.get(k))
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrRes> {
        let key = name.to_ascii_lowercase();
        self.resources.attributes.get(&key).or_else(|| {
            self.canonical(ResourceKind::CustomAttribute, name)
                .and_then(|k| self.resources.attributes.get(k))
        })
    }

    pub fn controller(&self, name: &str) -> Option<&ControllerConfig> {
        let key = name.to_ascii_lowercase();
        self.resources.controllers.get(&key).or_else(|| {
            self.canonical(ResourceKind::TemplateController, name)
                .and_then(|k| self.resources.controllers.get(k))
        })
    }

    pub fn value_converter(&self, name: &str) -> Option<&ValueConverterSig> {
        self.resources.value_converters.get(name).or_else(|| {
            self.canonical(ResourceKind::ValueConverter, name)
                .and_then(|k| self.resources.value_converters.get(k))
        })
    }

    pub fn binding_behavior(&self, name: &str) -> Option<&BindingBehaviorSig> {
        self.resources.binding_behaviors.get(name).or_else(|| {
            self.canonical(ResourceKind::BindingBehavior, name)
                .and_then(|k| self.resources.binding_behaviors.get(k))
        })
    }

    pub fn gap(&self, kind: ResourceKind, name: &str) -> Option<&CatalogGap> {
        self.gaps.get(&(kind, normalize(name)))
    }

    pub fn has_gap(&self, kind: ResourceKind, name: &str) -> bool {
        self.gap(kind, name).is_some()
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}
