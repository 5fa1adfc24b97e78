//! Resolution of extracted facts into project semantics.
//!
//! Every class that declares a resource (by decorator, by `static $au` or by
//! naming convention) becomes a discovered resource. Globally registered ones
//! land in the root scope of the resource graph; `dependencies` open a local
//! scope per element. Shapes that are not statically readable become catalog
//! gaps instead of guesses.

use std::path::Path;

use au_compiler::diagnostics::{DiagnosticCode, DiagnosticData, Stage};
use au_compiler::schema::{
    builtin_resources, AttrRes, Bindable, BindingBehaviorSig, BindingMode, CatalogGap, ControllerConfig,
    ControllerTrigger, ElementRes, ResourceCollections, ResourceGraph, ResourceKind, ResourceOrigin, ResourceScopeId,
    ValueConverterSig,
};
use au_compiler::{CompilerDiagnostic, ProjectSemantics};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::conventions::{default_name, element_name_for_file, resource_from_class_name};
use super::facts::{ClassFacts, FactValue, FileFacts, ObjectFact};
use super::ExtractError;
use crate::config::DiscoveryOptions;

pub const ROOT_SCOPE: &str = "root";

pub mod gap_reason {
    pub const NON_LITERAL_NAME: &str = "non-literal-name";
    pub const NON_LITERAL_DEFINITION: &str = "non-literal-definition";
    pub const OPEN_DEFINITION: &str = "open-definition";
    pub const NON_LITERAL_BINDABLES: &str = "non-literal-bindables";
    pub const NON_LITERAL_ALIASES: &str = "non-literal-aliases";
    pub const EXTRACTION_FAILED: &str = "extraction-failed";
}

pub fn local_scope_id(file: &str, class_name: &str) -> ResourceScopeId {
    format!("local:{file}#{class_name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredResource {
    pub kind: ResourceKind,
    pub name: String,
    pub class_name: String,
    pub file: String,
    pub global: bool,
    /// Local scope opened by this element's `dependencies`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ResourceScopeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProject {
    pub semantics: ProjectSemantics,
    pub resources: Vec<DiscoveredResource>,
    pub diagnostics: Vec<CompilerDiagnostic>,
}

impl ResolvedProject {
    pub fn resource(&self, kind: ResourceKind, name: &str) -> Option<&DiscoveredResource> {
        self.resources.iter().find(|r| r.kind == kind && r.name == name)
    }

    /// Scope a template compiles against: the local scope of the element
    /// declared in the script next to it (`foo.html` pairs with `foo.ts`).
    pub fn scope_for_template(&self, template_path: &str) -> Option<&str> {
        self.element_for_template(template_path).and_then(|r| r.scope.as_deref())
    }

    /// The custom element whose script sits next to `template_path` (`foo.html` pairs with `foo.ts`).
    pub fn element_for_template(&self, template_path: &str) -> Option<&DiscoveredResource> {
        let stem = Path::new(template_path).with_extension("");
        self.resources
            .iter()
            .filter(|r| r.kind == ResourceKind::CustomElement)
            .find(|r| Path::new(&r.file).with_extension("") == stem)
    }
}

enum ResourceDef {
    Element(ElementRes),
    Attribute(AttrRes),
    Controller(ControllerConfig),
    Converter(ValueConverterSig),
    Behavior(BindingBehaviorSig),
}

impl ResourceDef {
    fn kind(&self) -> ResourceKind {
        match self {
            ResourceDef::Element(_) => ResourceKind::CustomElement,
            ResourceDef::Attribute(_) => ResourceKind::CustomAttribute,
            ResourceDef::Controller(_) => ResourceKind::TemplateController,
            ResourceDef::Converter(_) => ResourceKind::ValueConverter,
            ResourceDef::Behavior(_) => ResourceKind::BindingBehavior,
        }
    }

    fn name(&self) -> &str {
        match self {
            ResourceDef::Element(r) => &r.name,
            ResourceDef::Attribute(r) => &r.name,
            ResourceDef::Controller(r) => &r.name,
            ResourceDef::Converter(r) => &r.name,
            ResourceDef::Behavior(r) => &r.name,
        }
    }

    fn add_to(&self, collections: &mut ResourceCollections) {
        match self {
            ResourceDef::Element(r) => collections.add_element(r.clone()),
            ResourceDef::Attribute(r) => collections.add_attribute(r.clone()),
            ResourceDef::Controller(r) => collections.add_controller(r.clone()),
            ResourceDef::Converter(r) => collections.add_value_converter(r.clone()),
            ResourceDef::Behavior(r) => collections.add_binding_behavior(r.clone()),
        };
    }
}

struct ClassResource<'f> {
    file: &'f str,
    class: &'f ClassFacts,
    def: ResourceDef,
    dependencies: Vec<&'f FactValue>,
}

const DECORATORS: [(&str, ResourceKind); 5] = [
    ("customElement", ResourceKind::CustomElement),
    ("customAttribute", ResourceKind::CustomAttribute),
    ("templateController", ResourceKind::TemplateController),
    ("valueConverter", ResourceKind::ValueConverter),
    ("bindingBehavior", ResourceKind::BindingBehavior),
];

pub fn resolve_project(
    facts: &IndexMap<String, FileFacts>,
    failures: &IndexMap<String, ExtractError>,
    options: &DiscoveryOptions,
) -> ResolvedProject {
    let mut files: Vec<&String> = facts.keys().collect();
    files.sort();

    let mut gaps = Vec::new();
    let mut classified = Vec::new();
    for file in &files {
        let file_facts = &facts[*file];
        for class in &file_facts.classes {
            if let Some(resource) = classify(file, class, options, &mut gaps) {
                classified.push(resource);
            }
        }
    }

    // Class name -> indices into `classified`, same-file entries first when resolving.
    let mut by_class: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (i, resource) in classified.iter().enumerate() {
        by_class.entry(resource.class.name.as_str()).or_default().push(i);
    }
    let find_class = |name: &str, from_file: &str| -> Option<usize> {
        let candidates = by_class.get(name)?;
        candidates
            .iter()
            .copied()
            .find(|&i| classified[i].file == from_file)
            .or_else(|| candidates.first().copied())
    };

    let mut registered: IndexSet<usize> = IndexSet::new();
    let mut any_registration = false;
    let mut opaque = false;
    for file in &files {
        let file_facts = &facts[*file];
        for registration in &file_facts.registrations {
            any_registration = true;
            for arg in &registration.args {
                collect_registered(arg, file_facts, &find_class, &mut registered, &mut opaque);
            }
        }
    }
    let all_global = !any_registration || opaque;

    let mut global = ResourceCollections::new();
    let mut graph = ResourceGraph::new(ROOT_SCOPE);
    let mut resources = Vec::new();
    for (i, resource) in classified.iter().enumerate() {
        let is_global = all_global || registered.contains(&i);
        if is_global {
            resource.def.add_to(&mut global);
        }
        let mut scope = None;
        if matches!(resource.def, ResourceDef::Element(_)) && !resource.dependencies.is_empty() {
            let mut local = ResourceCollections::new();
            for dep in &resource.dependencies {
                for name in reference_names(dep) {
                    match find_class(name, resource.file) {
                        Some(j) => classified[j].def.add_to(&mut local),
                        None => tracing::trace!(dependency = name, file = resource.file, "dependency is not a discovered resource"),
                    }
                }
            }
            let id = local_scope_id(resource.file, &resource.class.name);
            graph.add_scope(id.clone(), None, local).label = Some(resource.def.name().to_string());
            scope = Some(id);
        }
        resources.push(DiscoveredResource {
            kind: resource.def.kind(),
            name: resource.def.name().to_string(),
            class_name: resource.class.name.clone(),
            file: resource.file.to_string(),
            global: is_global,
            scope,
        });
    }
    graph.root_scope_mut().resources = global;

    let mut failed: Vec<(&String, &ExtractError)> = failures.iter().collect();
    failed.sort_by(|a, b| a.0.cmp(b.0));
    for (file, error) in failed {
        let Some(name) = element_name_for_file(file) else {
            continue;
        };
        tracing::warn!(file = file.as_str(), %error, "fact extraction failed");
        let mut gap = CatalogGap::new(ResourceKind::CustomElement, name, gap_reason::EXTRACTION_FAILED);
        gap.file = Some(file.clone());
        gaps.push(gap);
    }

    let diagnostics = gaps.iter().map(gap_diagnostic).collect();
    tracing::debug!(
        files = facts.len(),
        resources = resources.len(),
        gaps = gaps.len(),
        scopes = graph.scopes.len(),
        all_global,
        "resolved project semantics"
    );

    ResolvedProject {
        semantics: ProjectSemantics {
            resources: builtin_resources().clone(),
            graph: Some(graph),
            gaps,
        },
        resources,
        diagnostics,
    }
}

fn gap_diagnostic(gap: &CatalogGap) -> CompilerDiagnostic {
    let mut data = DiagnosticData::resource(gap.kind, gap.name.clone());
    data.reason = Some(gap.reason.clone());
    let what = match &gap.field {
        Some(field) => format!("{} of {} '{}'", field, gap.kind.as_str(), gap.name),
        None => format!("{} '{}'", gap.kind.as_str(), gap.name),
    };
    CompilerDiagnostic::warning(
        DiagnosticCode::DiscoveryGap,
        Stage::Discovery,
        format!("Cannot statically determine {what} ({})", gap.reason),
        None,
    )
    .with_data(data)
}

fn collect_registered(
    arg: &FactValue,
    file: &FileFacts,
    find_class: &dyn Fn(&str, &str) -> Option<usize>,
    registered: &mut IndexSet<usize>,
    opaque: &mut bool,
) {
    match arg {
        FactValue::Array(items) => {
            for item in items {
                collect_registered(item, file, find_class, registered, opaque);
            }
        }
        FactValue::Reference(path) => {
            let local = path.split('.').next().unwrap_or(path);
            if let Some(i) = arg.reference_name().and_then(|name| find_class(name, &file.path)) {
                registered.insert(i);
            } else if file.import_of(local).is_some_and(|(_, name)| name.imported == "*") {
                // A namespace of resources; which ones is unknown.
                *opaque = true;
            }
        }
        FactValue::Unknown => *opaque = true,
        _ => {}
    }
}

fn reference_names(value: &FactValue) -> Vec<&str> {
    match value {
        FactValue::Array(items) => items.iter().flat_map(reference_names).collect(),
        other => other.reference_name().into_iter().collect(),
    }
}

fn classify<'f>(
    file: &'f str,
    class: &'f ClassFacts,
    options: &DiscoveryOptions,
    gaps: &mut Vec<CatalogGap>,
) -> Option<ClassResource<'f>> {
    let (kind, definition, convention_name) = if let Some((decorator, kind)) = DECORATORS
        .iter()
        .find_map(|(name, kind)| class.decorator(name).map(|d| (d, *kind)))
    {
        (kind, decorator.args.first(), None)
    } else if let Some(kind) = class.static_au.as_ref().and_then(static_au_kind) {
        (kind, class.static_au.as_ref(), None)
    } else if options.conventions {
        let (kind, name) = resource_from_class_name(&class.name)?;
        (kind, None, Some(name))
    } else {
        return None;
    };

    let mut gap = |field: Option<&str>, name: &str, reason: &str| {
        let mut gap = CatalogGap::new(kind, name, reason);
        gap.field = field.map(str::to_string);
        gap.file = Some(file.to_string());
        gaps.push(gap);
    };

    let fallback = convention_name.unwrap_or_else(|| default_name(kind, &class.name));
    let mut config: Option<&ObjectFact> = None;
    let name = match definition {
        None => fallback,
        Some(FactValue::String(name)) => name.clone(),
        Some(FactValue::Object(object)) => {
            config = Some(object);
            let name = match object.get("name") {
                Some(FactValue::String(name)) => name.clone(),
                None if !object.open => fallback,
                _ => {
                    gap(None, &fallback, gap_reason::NON_LITERAL_NAME);
                    fallback
                }
            };
            if object.open {
                gap(None, &name, gap_reason::OPEN_DEFINITION);
            }
            name
        }
        Some(_) => {
            gap(None, &fallback, gap_reason::NON_LITERAL_DEFINITION);
            fallback
        }
    };

    let mut bindables = Vec::new();
    let mut bindables_known = true;
    if let Some(value) = config.and_then(|c| c.get("bindables")) {
        bindables_known &= collect_bindables(value, &mut bindables);
    }
    for fact in &class.bindables {
        match bindable_from_config(&fact.property, fact.config.as_ref()) {
            Some(bindable) => bindables.push(bindable),
            None => {
                bindables.push(Bindable::new(fact.property.clone()));
                bindables_known = false;
            }
        }
    }
    if !bindables_known {
        gap(Some("bindables"), &name, gap_reason::NON_LITERAL_BINDABLES);
    }

    let mut aliases = Vec::new();
    if let Some(value) = config.and_then(|c| c.get("aliases")) {
        if !collect_strings(value, &mut aliases) {
            gap(Some("aliases"), &name, gap_reason::NON_LITERAL_ALIASES);
        }
    }
    if let Some(alias) = class.decorator("alias") {
        for arg in &alias.args {
            collect_strings(arg, &mut aliases);
        }
    }

    let flag = |key: &str| config.and_then(|c| c.get(key)).is_some_and(FactValue::is_truthy_literal);
    let class_name = Some(class.name.clone());
    let file_name = Some(file.to_string());
    let def = match kind {
        ResourceKind::CustomElement => {
            let mut res = ElementRes::new(name).with_bindables(bindables);
            res.aliases = aliases;
            res.containerless = flag("containerless") || class.decorator("containerless").is_some();
            res.shadow = config
                .and_then(|c| c.get("shadowOptions"))
                .is_some_and(|v| !matches!(v, FactValue::Null))
                || class.decorator("useShadowDOM").is_some();
            res.class_name = class_name;
            res.file = file_name;
            res.origin = ResourceOrigin::Discovered;
            ResourceDef::Element(res)
        }
        ResourceKind::CustomAttribute => {
            let mut res = AttrRes::new(name).with_bindables(bindables);
            res.aliases = aliases;
            res.no_multi_bindings = flag("noMultiBindings");
            res.primary = config
                .and_then(|c| c.get("defaultProperty"))
                .and_then(FactValue::as_str)
                .map(str::to_string);
            res.class_name = class_name;
            res.file = file_name;
            res.origin = ResourceOrigin::Discovered;
            ResourceDef::Attribute(res)
        }
        ResourceKind::TemplateController => {
            let prop = bindables
                .iter()
                .find(|b| b.primary)
                .or_else(|| bindables.first())
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "value".to_string());
            let mut res = ControllerConfig::new(name, ControllerTrigger::Value { prop });
            if !bindables.is_empty() {
                res.bindables = bindables.into_iter().map(|b| (b.name.clone(), b)).collect();
            }
            res.aliases = aliases;
            res.class_name = class_name;
            res.file = file_name;
            res.origin = ResourceOrigin::Discovered;
            ResourceDef::Controller(res)
        }
        ResourceKind::ValueConverter => {
            let mut res = ValueConverterSig::new(name);
            res.class_name = class_name;
            res.file = file_name;
            res.origin = ResourceOrigin::Discovered;
            ResourceDef::Converter(res)
        }
        ResourceKind::BindingBehavior => {
            let mut res = BindingBehaviorSig::new(name);
            res.class_name = class_name;
            res.file = file_name;
            res.origin = ResourceOrigin::Discovered;
            ResourceDef::Behavior(res)
        }
    };

    let mut dependencies = Vec::new();
    dependencies.extend(config.and_then(|c| c.get("dependencies")));
    dependencies.extend(class.static_dependencies.as_ref());
    tracing::trace!(file, class = class.name.as_str(), kind = kind.as_str(), name = def.name(), "classified resource");
    Some(ClassResource {
        file,
        class,
        def,
        dependencies,
    })
}

fn static_au_kind(value: &FactValue) -> Option<ResourceKind> {
    let object = value.as_object()?;
    let kind = match object.get("type").and_then(FactValue::as_str)? {
        "custom-element" => ResourceKind::CustomElement,
        "custom-attribute" if object.get("isTemplateController").is_some_and(FactValue::is_truthy_literal) => {
            ResourceKind::TemplateController
        }
        "custom-attribute" => ResourceKind::CustomAttribute,
        "template-controller" => ResourceKind::TemplateController,
        "value-converter" => ResourceKind::ValueConverter,
        "binding-behavior" => ResourceKind::BindingBehavior,
        _ => return None,
    };
    Some(kind)
}

/// `['a', {name: 'b', mode: ...}]` or `{a: {...}, b: true}`; false when any part is not literal.
fn collect_bindables(value: &FactValue, out: &mut Vec<Bindable>) -> bool {
    match value {
        FactValue::Array(items) => items.iter().fold(true, |known, item| {
            let bindable = match item {
                FactValue::String(name) => Some(Bindable::new(name.clone())),
                FactValue::Object(object) => match object.get("name") {
                    Some(FactValue::String(name)) => bindable_from_object(name, object),
                    _ => None,
                },
                _ => None,
            };
            match bindable {
                Some(b) => {
                    out.push(b);
                    known
                }
                None => false,
            }
        }),
        FactValue::Object(object) => {
            let mut known = !object.open;
            for (name, config) in &object.entries {
                match bindable_from_config(name, Some(config)) {
                    Some(b) => out.push(b),
                    None => known = false,
                }
            }
            known
        }
        _ => false,
    }
}

fn bindable_from_config(property: &str, config: Option<&FactValue>) -> Option<Bindable> {
    match config {
        None | Some(FactValue::Bool(true)) | Some(FactValue::Null) => Some(Bindable::new(property)),
        Some(FactValue::Object(object)) => {
            let name = object.get("name").and_then(FactValue::as_str).unwrap_or(property);
            bindable_from_object(name, object)
        }
        Some(_) => None,
    }
}

fn bindable_from_object(name: &str, object: &ObjectFact) -> Option<Bindable> {
    if object.open {
        return None;
    }
    let mut bindable = Bindable::new(name);
    match object.get("mode") {
        None => {}
        Some(FactValue::String(mode)) => bindable.mode = BindingMode::from_name(mode)?,
        Some(reference @ FactValue::Reference(_)) => {
            bindable.mode = BindingMode::from_name(reference.reference_name()?)?
        }
        Some(_) => return None,
    }
    match object.get("attribute") {
        None => {}
        Some(FactValue::String(attribute)) => bindable.attribute = attribute.clone(),
        Some(_) => return None,
    }
    match object.get("primary") {
        None => {}
        Some(FactValue::Bool(primary)) => bindable.primary = *primary,
        Some(_) => return None,
    }
    Some(bindable)
}

fn collect_strings(value: &FactValue, out: &mut Vec<String>) -> bool {
    match value {
        FactValue::String(s) => {
            out.push(s.clone());
            true
        }
        FactValue::Array(items) => items.iter().fold(true, |known, item| collect_strings(item, out) && known),
        _ => false,
    }
}
