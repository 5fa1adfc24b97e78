//! Template Controller Configuration
//!
//! A controller is described by how it is triggered, whether it opens a new scope,
//! which sibling/child branches it owns and which locals it injects. Frame origins
//! and typing strategies are derived from this configuration, never from the name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::resources::{Bindable, Bindables, ResourceOrigin};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ControllerTrigger {
    /// `if.bind="x"`: a single value bound to `prop`.
    Value { prop: String },
    /// `repeat.for="x of xs; key: id"`.
    #[serde(rename_all = "camelCase")]
    Iterator {
        prop: String,
        command: String,
        #[serde(default)]
        tail_props: IndexMap<String, TailPropConfig>,
    },
    /// Activated relative to a parent controller (`else`, `case`, `then`).
    Branch {
        parents: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prop: Option<String>,
    },
    /// Presence alone activates the controller; the attribute value is ignored.
    Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailPropConfig {
    pub name: String,
    /// Accepted commands; the empty string stands for a bare `name: value` literal.
    pub accepts: Vec<String>,
}

impl TailPropConfig {
    pub fn new(name: &str, accepts: &[&str]) -> Self {
        TailPropConfig {
            name: name.to_string(),
            accepts: accepts.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn accepts(&self, command: Option<&str>) -> bool {
        let command = command.unwrap_or("");
        self.accepts.iter().any(|a| a == command)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControllerScope {
    #[default]
    Reuse,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BranchRelationship {
    /// Branches are the controller's immediate next siblings (`if` / `else`).
    Sibling,
    /// Branches live inside the controller's content (`promise` / `then`).
    Child,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchConfig {
    pub names: Vec<String>,
    pub relationship: BranchRelationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AliasSource {
    Fulfilled,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualVar {
    pub name: String,
    pub type_expr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasInject {
    pub source: AliasSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectConfig {
    #[serde(default)]
    pub contextuals: Vec<ContextualVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<AliasInject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub name: String,
    pub trigger: ControllerTrigger,
    #[serde(default)]
    pub scope: ControllerScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<BranchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injects: Option<InjectConfig>,
    #[serde(default)]
    pub bindables: Bindables,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub origin: ResourceOrigin,
}

/// How a controller's frame is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FramePattern {
    Iterator,
    PromiseValue,
    PromiseBranch,
    ValueOverlay,
    /// A scope boundary with no value of its own; only contextuals are injected.
    Plain,
}

impl ControllerConfig {
    pub fn new(name: impl Into<String>, trigger: ControllerTrigger) -> Self {
        let name = name.into();
        let bindables = match &trigger {
            ControllerTrigger::Value { prop } | ControllerTrigger::Iterator { prop, .. } => {
                vec![Bindable::new(prop.clone()).primary()]
            }
            ControllerTrigger::Branch { prop: Some(prop), .. } => vec![Bindable::new(prop.clone()).primary()],
            _ => Vec::new(),
        };
        ControllerConfig {
            name,
            trigger,
            scope: ControllerScope::Reuse,
            branches: None,
            injects: None,
            bindables: super::resources::bindables_of(bindables),
            aliases: Vec::new(),
            class_name: None,
            file: None,
            origin: ResourceOrigin::Builtin,
        }
    }

    /// Placeholder for a controller absent from the catalog.
    pub fn stub(name: &str) -> Self {
        let mut config = ControllerConfig::new(
            name,
            ControllerTrigger::Value {
                prop: "value".to_string(),
            },
        );
        config.origin = ResourceOrigin::Discovered;
        config
    }

    pub fn overlay(mut self) -> Self {
        self.scope = ControllerScope::Overlay;
        self
    }

    pub fn with_branches(mut self, relationship: BranchRelationship, names: &[&str]) -> Self {
        self.branches = Some(BranchConfig {
            names: names.iter().map(|s| s.to_string()).collect(),
            relationship,
        });
        self
    }

    pub fn with_contextuals(mut self, vars: &[(&str, &str)]) -> Self {
        let injects = self.injects.get_or_insert_with(InjectConfig::default);
        injects.contextuals = vars
            .iter()
            .map(|(name, ty)| ContextualVar {
                name: name.to_string(),
                type_expr: ty.to_string(),
            })
            .collect();
        self
    }

    pub fn with_alias(mut self, source: AliasSource) -> Self {
        let injects = self.injects.get_or_insert_with(InjectConfig::default);
        injects.alias = Some(AliasInject { source });
        self
    }

    /// Property receiving the controller's main value, if it takes one.
    pub fn value_prop(&self) -> Option<&str> {
        match &self.trigger {
            ControllerTrigger::Value { prop } | ControllerTrigger::Iterator { prop, .. } => Some(prop),
            ControllerTrigger::Branch { prop, .. } => prop.as_deref(),
            ControllerTrigger::Marker => None,
        }
    }

    pub fn is_iterator(&self) -> bool {
        matches!(self.trigger, ControllerTrigger::Iterator { .. })
    }

    pub fn is_overlay(&self) -> bool {
        self.scope == ControllerScope::Overlay
    }

    pub fn alias_source(&self) -> Option<AliasSource> {
        self.injects.as_ref().and_then(|i| i.alias.as_ref()).map(|a| a.source)
    }

    pub fn contextuals(&self) -> &[ContextualVar] {
        self.injects.as_ref().map(|i| i.contextuals.as_slice()).unwrap_or(&[])
    }

    pub fn branch_parents(&self) -> &[String] {
        match &self.trigger {
            ControllerTrigger::Branch { parents, .. } => parents,
            _ => &[],
        }
    }

    /// Classify the frame this controller opens. `None` when it reuses the parent scope.
    pub fn frame_pattern(&self) -> Option<FramePattern> {
        if self.scope != ControllerScope::Overlay {
            return None;
        }
        match &self.trigger {
            ControllerTrigger::Iterator { .. } => Some(FramePattern::Iterator),
            ControllerTrigger::Value { .. } if self.branches.is_some() => Some(FramePattern::PromiseValue),
            ControllerTrigger::Value { .. } => Some(FramePattern::ValueOverlay),
            ControllerTrigger::Branch { .. } if self.alias_source().is_some() => Some(FramePattern::PromiseBranch),
            ControllerTrigger::Branch { .. } | ControllerTrigger::Marker => Some(FramePattern::Plain),
        }
    }
}
