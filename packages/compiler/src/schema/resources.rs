//! Resource Definitions
//!
//! Declarative metadata for custom elements, custom attributes, value converters
//! and binding behaviors, plus the collections and catalog gaps they live in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::controllers::ControllerConfig;
use crate::util::camel_case_to_dash_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    CustomElement,
    CustomAttribute,
    TemplateController,
    ValueConverter,
    BindingBehavior,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::CustomElement => "custom-element",
            ResourceKind::CustomAttribute => "custom-attribute",
            ResourceKind::TemplateController => "template-controller",
            ResourceKind::ValueConverter => "value-converter",
            ResourceKind::BindingBehavior => "binding-behavior",
        }
    }

    /// `kind:name`, the identity used by degradation summaries and the reference index.
    pub fn key(&self, name: &str) -> String {
        format!("{}:{}", self.as_str(), name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceOrigin {
    #[default]
    Builtin,
    Discovered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingMode {
    #[default]
    Default,
    OneTime,
    ToView,
    FromView,
    TwoWay,
}

impl BindingMode {
    /// Mode implied by a property-binding-kind command.
    pub fn from_command(command: &str) -> Option<BindingMode> {
        match command {
            "bind" => Some(BindingMode::Default),
            "one-time" => Some(BindingMode::OneTime),
            "to-view" => Some(BindingMode::ToView),
            "from-view" => Some(BindingMode::FromView),
            "two-way" => Some(BindingMode::TwoWay),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<BindingMode> {
        match name {
            "default" => Some(BindingMode::Default),
            "one-time" | "oneTime" => Some(BindingMode::OneTime),
            "to-view" | "toView" => Some(BindingMode::ToView),
            "from-view" | "fromView" => Some(BindingMode::FromView),
            "two-way" | "twoWay" => Some(BindingMode::TwoWay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingMode::Default => "default",
            BindingMode::OneTime => "one-time",
            BindingMode::ToView => "to-view",
            BindingMode::FromView => "from-view",
            BindingMode::TwoWay => "two-way",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bindable {
    /// View-model property name.
    pub name: String,
    /// Attribute name used in markup (kebab-case of `name` unless overridden).
    pub attribute: String,
    #[serde(default)]
    pub mode: BindingMode,
    #[serde(default)]
    pub primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<String>,
}

impl Bindable {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Bindable {
            attribute: camel_case_to_dash_case(&name),
            name,
            mode: BindingMode::Default,
            primary: false,
            type_expr: None,
        }
    }

    pub fn with_mode(mut self, mode: BindingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn with_type(mut self, type_expr: impl Into<String>) -> Self {
        self.type_expr = Some(type_expr.into());
        self
    }
}

/// Bindables keyed by property name.
pub type Bindables = IndexMap<String, Bindable>;

pub fn bindables_of(list: impl IntoIterator<Item = Bindable>) -> Bindables {
    list.into_iter().map(|b| (b.name.clone(), b)).collect()
}

/// Find a bindable by markup attribute name or by property name.
pub fn find_bindable<'a>(bindables: &'a Bindables, attribute: &str) -> Option<&'a Bindable> {
    bindables
        .values()
        .find(|b| b.attribute == attribute)
        .or_else(|| bindables.get(attribute))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRes {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub bindables: Bindables,
    #[serde(default)]
    pub containerless: bool,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub origin: ResourceOrigin,
}

impl ElementRes {
    pub fn new(name: impl Into<String>) -> Self {
        ElementRes {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_bindables(mut self, bindables: impl IntoIterator<Item = Bindable>) -> Self {
        self.bindables = bindables_of(bindables);
        self
    }

    pub fn bindable(&self, attribute: &str) -> Option<&Bindable> {
        find_bindable(&self.bindables, attribute)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttrRes {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub bindables: Bindables,
    /// Property receiving a single unnamed value (`tooltip.bind="x"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default)]
    pub no_multi_bindings: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub origin: ResourceOrigin,
}

impl AttrRes {
    pub fn new(name: impl Into<String>) -> Self {
        AttrRes {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_bindables(mut self, bindables: impl IntoIterator<Item = Bindable>) -> Self {
        self.bindables = bindables_of(bindables);
        self
    }

    pub fn bindable(&self, attribute: &str) -> Option<&Bindable> {
        find_bindable(&self.bindables, attribute)
    }

    /// The bindable that receives the attribute value when no property is named.
    pub fn primary_bindable(&self) -> Option<&Bindable> {
        self.primary
            .as_deref()
            .and_then(|p| self.bindables.get(p))
            .or_else(|| self.bindables.values().find(|b| b.primary))
            .or_else(|| self.bindables.get("value"))
            .or_else(|| self.bindables.values().next())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueConverterSig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub origin: ResourceOrigin,
}

impl ValueConverterSig {
    pub fn new(name: impl Into<String>) -> Self {
        ValueConverterSig {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingBehaviorSig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub origin: ResourceOrigin,
}

impl BindingBehaviorSig {
    pub fn new(name: impl Into<String>) -> Self {
        BindingBehaviorSig {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// All resources visible from one place, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCollections {
    #[serde(default)]
    pub elements: IndexMap<String, ElementRes>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrRes>,
    #[serde(default)]
    pub controllers: IndexMap<String, ControllerConfig>,
    #[serde(default)]
    pub value_converters: IndexMap<String, ValueConverterSig>,
    #[serde(default)]
    pub binding_behaviors: IndexMap<String, BindingBehaviorSig>,
}

impl ResourceCollections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: ElementRes) -> &mut Self {
        self.elements.insert(element.name.to_ascii_lowercase(), element);
        self
    }

    pub fn add_attribute(&mut self, attribute: AttrRes) -> &mut Self {
        self.attributes.insert(attribute.name.to_ascii_lowercase(), attribute);
        self
    }

    pub fn add_controller(&mut self, controller: ControllerConfig) -> &mut Self {
        self.controllers.insert(controller.name.to_ascii_lowercase(), controller);
        self
    }

    pub fn add_value_converter(&mut self, converter: ValueConverterSig) -> &mut Self {
        self.value_converters.insert(converter.name.clone(), converter);
        self
    }

    pub fn add_binding_behavior(&mut self, behavior: BindingBehaviorSig) -> &mut Self {
        self.binding_behaviors.insert(behavior.name.clone(), behavior);
        self
    }

    /// Overlay `other` on top of `self`; entries in `other` win on name collision.
    pub fn overlay(&mut self, other: &ResourceCollections) {
        for (k, v) in &other.elements {
            self.elements.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.attributes {
            self.attributes.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.controllers {
            self.controllers.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.value_converters {
            self.value_converters.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.binding_behaviors {
            self.binding_behaviors.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
            + self.attributes.len()
            + self.controllers.len()
            + self.value_converters.len()
            + self.binding_behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resource whose shape static analysis could not fully determine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGap {
    pub kind: ResourceKind,
    pub name: String,
    /// The part that is unknown (`bindables`); `None` when the whole resource is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CatalogGap {
    pub fn new(kind: ResourceKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogGap {
            kind,
            name: name.into(),
            field: None,
            reason: reason.into(),
            file: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}
