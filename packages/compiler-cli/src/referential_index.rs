//! Referential Index
//!
//! Workspace-wide reverse index of reference sites for rename and
//! find-references. Each file contributes a list of sites; updating a file
//! replaces its whole contribution, so forward lookups (`site_at`) and reverse
//! lookups (`references`, `member_references`, `file_references`) always agree.

use au_compiler::expression_parser::{walk_expr, Expr, Visitor};
use au_compiler::parse_util::SourceSpan;
use au_compiler::schema::ResourceKind;
use au_compiler::template::ir::{ExprId, FrameId, NodeId};
use au_compiler::template::linking::{BindingTarget, LinkedInstruction, LinkedTemplate};
use au_compiler::template::scope::{Resolution, ScopeModule};
use au_compiler::{ModuleResolver, TemplateCompilation};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::discovery::{FactValue, FileFacts, ResolvedProject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    /// Renaming rewrites the text at `span`.
    Text,
    /// Renaming a file rewrites the module specifier at `span`.
    FileRename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceDomain {
    Template,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    TagName,
    CloseTagName,
    AttributeName,
    ControllerName,
    ConverterName,
    BehaviorName,
    BindableAttribute,
    BindableProperty,
    ResourceName,
    ClassName,
    VmProperty,
    Import,
}

/// How the name is spelled at the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameForm {
    KebabCase,
    CamelCase,
    PascalCase,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmMemberRef {
    pub file: String,
    pub class_name: String,
    pub property: String,
}

/// The view-model class a template binds against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmBinding {
    pub file: String,
    pub class_name: String,
}

impl VmBinding {
    pub fn for_template(project: &ResolvedProject, template_path: &str) -> Option<Self> {
        project.element_for_template(template_path).map(|r| VmBinding {
            file: r.file.clone(),
            class_name: r.class_name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSite {
    pub kind: SiteKind,
    pub domain: ReferenceDomain,
    pub reference_kind: ReferenceKind,
    pub file: String,
    pub span: SourceSpan,
    pub name_form: NameForm,
    /// Text at `span`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_key: Option<String>,
    /// `kind:name#property` for bindables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr_id: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<VmMemberRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
}

impl ReferenceSite {
    fn text(domain: ReferenceDomain, kind: ReferenceKind, file: &str, span: SourceSpan, form: NameForm, name: &str) -> Self {
        ReferenceSite {
            kind: SiteKind::Text,
            domain,
            reference_kind: kind,
            file: file.to_string(),
            span,
            name_form: form,
            name: name.to_string(),
            resource_key: None,
            symbol_id: None,
            expr_id: None,
            node_id: None,
            vm: None,
            target_file: None,
        }
    }

    fn with_resource(mut self, key: String) -> Self {
        self.resource_key = Some(key);
        self
    }

    /// What this site refers to; members and bindables take precedence over their owning resource.
    pub fn target(&self) -> Option<ReferenceTarget> {
        if let Some(vm) = &self.vm {
            return Some(ReferenceTarget::Member(vm.clone()));
        }
        if let Some(symbol) = &self.symbol_id {
            return Some(ReferenceTarget::Symbol(symbol.clone()));
        }
        if let Some(key) = &self.resource_key {
            return Some(ReferenceTarget::Resource(key.clone()));
        }
        self.target_file.clone().map(ReferenceTarget::File)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ReferenceTarget {
    Resource(String),
    /// A bindable of a resource without a known class (`kind:name#property`).
    Symbol(String),
    Member(VmMemberRef),
    File(String),
}

#[derive(Debug, Default)]
pub struct InMemoryReferentialIndex {
    by_file: IndexMap<String, Vec<ReferenceSite>>,
    by_resource: IndexMap<String, IndexSet<String>>,
    by_member: IndexMap<VmMemberRef, IndexSet<String>>,
    by_target_file: IndexMap<String, IndexSet<String>>,
}

impl InMemoryReferentialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `file`'s contribution with the sites of a compiled template.
    pub fn update_from_template(&mut self, file: &str, compilation: &TemplateCompilation, vm: Option<&VmBinding>) {
        let sites = template_sites(file, compilation, vm);
        self.replace_file(file, sites);
    }

    /// Replace `file`'s contribution with the sites of a script's resources.
    pub fn update_from_script(
        &mut self,
        file: &str,
        facts: &FileFacts,
        project: &ResolvedProject,
        resolver: Option<&dyn ModuleResolver>,
    ) {
        let sites = script_sites(file, facts, project, resolver);
        self.replace_file(file, sites);
    }

    pub fn remove_file(&mut self, file: &str) {
        let Some(sites) = self.by_file.shift_remove(file) else {
            return;
        };
        for site in &sites {
            if let Some(key) = &site.resource_key {
                remove_from(&mut self.by_resource, key, file);
            }
            if let Some(vm) = &site.vm {
                remove_from(&mut self.by_member, vm, file);
            }
            if let Some(target) = &site.target_file {
                remove_from(&mut self.by_target_file, target, file);
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_file.clear();
        self.by_resource.clear();
        self.by_member.clear();
        self.by_target_file.clear();
    }

    fn replace_file(&mut self, file: &str, sites: Vec<ReferenceSite>) {
        self.remove_file(file);
        for site in &sites {
            if let Some(key) = &site.resource_key {
                self.by_resource.entry(key.clone()).or_default().insert(file.to_string());
            }
            if let Some(vm) = &site.vm {
                self.by_member.entry(vm.clone()).or_default().insert(file.to_string());
            }
            if let Some(target) = &site.target_file {
                self.by_target_file.entry(target.clone()).or_default().insert(file.to_string());
            }
        }
        tracing::trace!(file, sites = sites.len(), "indexed reference sites");
        self.by_file.insert(file.to_string(), sites);
    }

    pub fn sites_in(&self, file: &str) -> &[ReferenceSite] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.by_file.keys().map(String::as_str)
    }

    /// Sites naming the resource itself; its bindables are reached through `symbol_references`.
    pub fn references(&self, resource_key: &str) -> Vec<&ReferenceSite> {
        self.collect(self.by_resource.get(resource_key), |s| {
            s.resource_key.as_deref() == Some(resource_key) && s.symbol_id.is_none()
        })
    }

    pub fn symbol_references(&self, symbol_id: &str) -> Vec<&ReferenceSite> {
        let owner = symbol_id.split('#').next().unwrap_or(symbol_id);
        self.collect(self.by_resource.get(owner), |s| s.symbol_id.as_deref() == Some(symbol_id))
    }

    pub fn resource_references(&self, kind: ResourceKind, name: &str) -> Vec<&ReferenceSite> {
        self.references(&kind.key(name))
    }

    pub fn member_references(&self, member: &VmMemberRef) -> Vec<&ReferenceSite> {
        self.collect(self.by_member.get(member), |s| s.vm.as_ref() == Some(member))
    }

    pub fn file_references(&self, target: &str) -> Vec<&ReferenceSite> {
        self.collect(self.by_target_file.get(target), |s| s.target_file.as_deref() == Some(target))
    }

    fn collect<'a>(
        &'a self,
        files: Option<&'a IndexSet<String>>,
        filter: impl Fn(&ReferenceSite) -> bool,
    ) -> Vec<&'a ReferenceSite> {
        files
            .into_iter()
            .flatten()
            .filter_map(|file| self.by_file.get(file))
            .flatten()
            .filter(|site| filter(*site))
            .collect()
    }

    /// Innermost site under the cursor.
    pub fn site_at(&self, file: &str, offset: usize) -> Option<&ReferenceSite> {
        self.sites_in(file)
            .iter()
            .filter(|s| s.span.touches(offset))
            .min_by_key(|s| s.span.len())
    }

    pub fn resolve_at(&self, file: &str, offset: usize) -> Option<ReferenceTarget> {
        self.site_at(file, offset).and_then(ReferenceSite::target)
    }

    /// Every site referring to what is under the cursor, the cursor's own site included.
    pub fn find_references_at(&self, file: &str, offset: usize) -> Vec<&ReferenceSite> {
        match self.resolve_at(file, offset) {
            Some(ReferenceTarget::Member(member)) => self.member_references(&member),
            Some(ReferenceTarget::Symbol(symbol)) => self.symbol_references(&symbol),
            Some(ReferenceTarget::Resource(key)) => self.references(&key),
            Some(ReferenceTarget::File(target)) => self.file_references(&target),
            None => Vec::new(),
        }
    }

    /// Every indexed site is reachable from the reverse maps and vice versa.
    pub fn is_coherent(&self) -> bool {
        let forward = self.by_file.iter().all(|(file, sites)| {
            sites.iter().all(|site| {
                site.resource_key
                    .as_ref()
                    .map_or(true, |k| self.by_resource.get(k).is_some_and(|f| f.contains(file)))
                    && site.vm.as_ref().map_or(true, |m| self.by_member.get(m).is_some_and(|f| f.contains(file)))
                    && site
                        .target_file
                        .as_ref()
                        .map_or(true, |t| self.by_target_file.get(t).is_some_and(|f| f.contains(file)))
            })
        });
        let reverse = self.by_resource.iter().all(|(key, files)| {
            files.iter().all(|f| self.sites_in(f).iter().any(|s| s.resource_key.as_ref() == Some(key)))
        }) && self.by_member.iter().all(|(member, files)| {
            files.iter().all(|f| self.sites_in(f).iter().any(|s| s.vm.as_ref() == Some(member)))
        }) && self.by_target_file.iter().all(|(target, files)| {
            files.iter().all(|f| self.sites_in(f).iter().any(|s| s.target_file.as_ref() == Some(target)))
        });
        forward && reverse
    }
}

fn remove_from<K: std::hash::Hash + Eq>(map: &mut IndexMap<K, IndexSet<String>>, key: &K, file: &str) {
    if let Some(files) = map.get_mut(key) {
        files.shift_remove(file);
        if files.is_empty() {
            map.shift_remove(key);
        }
    }
}

fn template_sites(file: &str, compilation: &TemplateCompilation, vm: Option<&VmBinding>) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();
    // Nested controller definitions are reached through their controller instruction.
    collect_template(file, &compilation.linked.root, &mut sites);

    let mut exprs = ExprSites {
        file,
        scope: &compilation.scope,
        vm,
        expr_id: ExprId(0),
        frame: FrameId::ROOT,
        locals: Vec::new(),
        sites: &mut sites,
    };
    for entry in compilation.expr_table.iter() {
        exprs.expr_id = entry.id;
        exprs.frame = compilation.scope.frame_of(entry.id);
        exprs.visit_expr(&entry.ast);
    }

    for import in &compilation.meta.imports {
        let Some(span) = import.from_span else {
            continue;
        };
        let mut site = ReferenceSite::text(
            ReferenceDomain::Template,
            ReferenceKind::Import,
            file,
            span,
            NameForm::Path,
            &import.from,
        );
        site.kind = SiteKind::FileRename;
        site.target_file = Some(import.resolved.clone().unwrap_or_else(|| import.from.clone()));
        sites.push(site);
    }
    sites.sort_by_key(|s| (s.span.start, s.span.end));
    sites
}

/// Script class backing a resource, when discovery recorded one.
#[derive(Clone, Copy)]
struct OwnerClass<'a> {
    file: &'a str,
    class_name: &'a str,
}

impl<'a> OwnerClass<'a> {
    fn of(file: &'a Option<String>, class_name: &'a Option<String>) -> Option<Self> {
        Some(OwnerClass {
            file: file.as_deref()?,
            class_name: class_name.as_deref()?,
        })
    }
}

fn collect_template(file: &str, template: &LinkedTemplate, sites: &mut Vec<ReferenceSite>) {
    for row in &template.rows {
        for instruction in &row.instructions {
            collect_instruction(file, row.target, instruction, None, sites);
        }
    }
}

fn collect_instruction(
    file: &str,
    node: NodeId,
    instruction: &LinkedInstruction,
    owner: Option<OwnerClass<'_>>,
    sites: &mut Vec<ReferenceSite>,
) {
    let mut push = |kind: ReferenceKind, span: SourceSpan, form: NameForm, name: &str, key: String| {
        let mut site = ReferenceSite::text(ReferenceDomain::Template, kind, file, span, form, name).with_resource(key);
        site.node_id = Some(node);
        sites.push(site);
    };
    match instruction {
        LinkedInstruction::HydrateElement(element) => {
            if let Some(res) = &element.res {
                let key = ResourceKind::CustomElement.key(&res.name);
                push(ReferenceKind::TagName, element.name_span, NameForm::KebabCase, &element.name, key.clone());
                if let Some(end) = element.end_name_span {
                    push(ReferenceKind::CloseTagName, end, NameForm::KebabCase, &element.name, key);
                }
            }
            let owner = element.res.as_ref().and_then(|r| OwnerClass::of(&r.file, &r.class_name));
            for prop in &element.props {
                collect_instruction(file, node, prop, owner, sites);
            }
        }
        LinkedInstruction::HydrateAttribute(attribute) => {
            if let Some(res) = &attribute.res {
                let key = ResourceKind::CustomAttribute.key(&res.name);
                push(ReferenceKind::AttributeName, attribute.loc.target_span, NameForm::KebabCase, &attribute.name, key);
            }
            let owner = attribute.res.as_ref().and_then(|r| OwnerClass::of(&r.file, &r.class_name));
            for prop in &attribute.props {
                collect_instruction(file, node, prop, owner, sites);
            }
        }
        LinkedInstruction::HydrateTemplateController(controller) => {
            if controller.resolved {
                let key = ResourceKind::TemplateController.key(&controller.res.name);
                push(ReferenceKind::ControllerName, controller.loc.target_span, NameForm::KebabCase, &controller.name, key);
            }
            let owner = OwnerClass::of(&controller.res.file, &controller.res.class_name);
            for prop in &controller.props {
                collect_instruction(file, node, prop, owner, sites);
            }
            collect_template(file, &controller.def, sites);
        }
        LinkedInstruction::PropertyBinding(binding) => {
            bindable_site(file, node, owner, &binding.target, binding.ir.loc.target_span, &binding.ir.attr, sites)
        }
        LinkedInstruction::Interpolation(interp) => {
            bindable_site(file, node, owner, &interp.target, interp.ir.loc.target_span, &interp.ir.attr, sites)
        }
        LinkedInstruction::SetProperty(set) => {
            bindable_site(file, node, owner, &set.target, set.ir.loc.target_span, &set.ir.attr, sites)
        }
        _ => {}
    }
}

fn bindable_site(
    file: &str,
    node: NodeId,
    owner_class: Option<OwnerClass<'_>>,
    target: &BindingTarget,
    span: SourceSpan,
    attr: &str,
    sites: &mut Vec<ReferenceSite>,
) {
    let (kind, owner, bindable) = match target {
        BindingTarget::ElementBindable { owner, bindable } => (ResourceKind::CustomElement, owner, bindable),
        BindingTarget::AttributeBindable { owner, bindable } => (ResourceKind::CustomAttribute, owner, bindable),
        BindingTarget::ControllerProp { owner, bindable } => (ResourceKind::TemplateController, owner, bindable),
        BindingTarget::Native { .. } | BindingTarget::Unknown => return,
    };
    // Primary-bindable shorthand (`tooltip.bind`) names the resource, not the bindable.
    if span.is_empty() || attr.split('.').next() != Some(bindable.attribute.as_str()) {
        return;
    }
    let key = kind.key(owner);
    let mut site = ReferenceSite::text(
        ReferenceDomain::Template,
        ReferenceKind::BindableAttribute,
        file,
        span,
        NameForm::KebabCase,
        &bindable.attribute,
    );
    site.symbol_id = Some(format!("{key}#{}", bindable.name));
    site.resource_key = Some(key);
    site.node_id = Some(node);
    site.vm = owner_class.map(|o| VmMemberRef {
        file: o.file.to_string(),
        class_name: o.class_name.to_string(),
        property: bindable.name.clone(),
    });
    sites.push(site);
}

struct ExprSites<'a> {
    file: &'a str,
    scope: &'a ScopeModule,
    vm: Option<&'a VmBinding>,
    expr_id: ExprId,
    frame: FrameId,
    /// Arrow parameters in scope at the current node.
    locals: Vec<String>,
    sites: &'a mut Vec<ReferenceSite>,
}

impl ExprSites<'_> {
    fn push(&mut self, kind: ReferenceKind, span: SourceSpan, form: NameForm, name: &str) -> &mut ReferenceSite {
        let mut site = ReferenceSite::text(ReferenceDomain::Template, kind, self.file, span, form, name);
        site.expr_id = Some(self.expr_id);
        self.sites.push(site);
        let last = self.sites.len() - 1;
        &mut self.sites[last]
    }

    fn vm_member(&mut self, name: &str, ancestor: u32, span: SourceSpan) {
        let Some(vm) = self.vm else {
            return;
        };
        if ancestor == 0 && self.locals.iter().any(|l| l == name) {
            return;
        }
        let frame = match ancestor {
            0 => self.frame,
            hops => match self.scope.ancestor(self.frame, hops) {
                Some(frame) => frame,
                None => return,
            },
        };
        if self.scope.resolve(frame, name) != Resolution::Vm {
            return;
        }
        let member = VmMemberRef {
            file: vm.file.clone(),
            class_name: vm.class_name.clone(),
            property: name.to_string(),
        };
        self.push(ReferenceKind::VmProperty, span, NameForm::CamelCase, name).vm = Some(member);
    }
}

impl Visitor for ExprSites<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::AccessScope(access) => self.vm_member(&access.name.name, access.ancestor, access.name.span),
            Expr::CallScope(call) => self.vm_member(&call.name.name, call.ancestor, call.name.span),
            Expr::ValueConverter(vc) => {
                let key = ResourceKind::ValueConverter.key(&vc.name.name);
                self.push(ReferenceKind::ConverterName, vc.name.span, NameForm::CamelCase, &vc.name.name)
                    .resource_key = Some(key);
            }
            Expr::BindingBehavior(bb) => {
                let key = ResourceKind::BindingBehavior.key(&bb.name.name);
                self.push(ReferenceKind::BehaviorName, bb.name.span, NameForm::CamelCase, &bb.name.name)
                    .resource_key = Some(key);
            }
            Expr::ArrowFunction(arrow) => {
                let pushed = arrow.args.len();
                self.locals.extend(arrow.args.iter().map(|a| a.name.name.clone()));
                walk_expr(self, expr);
                let keep = self.locals.len() - pushed;
                self.locals.truncate(keep);
                return;
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

fn script_sites(
    file: &str,
    facts: &FileFacts,
    project: &ResolvedProject,
    resolver: Option<&dyn ModuleResolver>,
) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();
    for resource in project.resources.iter().filter(|r| r.file == file) {
        let Some(class) = facts.class(&resource.class_name) else {
            continue;
        };
        let key = resource.kind.key(&resource.name);
        sites.push(
            ReferenceSite::text(
                ReferenceDomain::Script,
                ReferenceKind::ClassName,
                file,
                class.name_span,
                NameForm::PascalCase,
                &class.name,
            )
            .with_resource(key.clone()),
        );

        // The literal name argument of the defining decorator, quotes excluded.
        let literal = class.decorators.iter().find_map(|d| match (d.args.first(), d.arg_spans.first()) {
            (Some(FactValue::String(name)), Some(span)) if *name == resource.name && span.len() >= 2 => {
                Some(SourceSpan::new(span.start + 1, span.end - 1))
            }
            _ => None,
        });
        if let Some(span) = literal {
            let form = match resource.kind {
                ResourceKind::ValueConverter | ResourceKind::BindingBehavior => NameForm::CamelCase,
                _ => NameForm::KebabCase,
            };
            sites.push(
                ReferenceSite::text(ReferenceDomain::Script, ReferenceKind::ResourceName, file, span, form, &resource.name)
                    .with_resource(key.clone()),
            );
        }

        for bindable in &class.bindables {
            let mut site = ReferenceSite::text(
                ReferenceDomain::Script,
                ReferenceKind::BindableProperty,
                file,
                bindable.span,
                NameForm::CamelCase,
                &bindable.property,
            )
            .with_resource(key.clone());
            site.symbol_id = Some(format!("{key}#{}", bindable.property));
            site.vm = Some(VmMemberRef {
                file: file.to_string(),
                class_name: class.name.clone(),
                property: bindable.property.clone(),
            });
            sites.push(site);
        }
    }

    for import in facts.imports.iter().filter(|i| i.source.starts_with('.')) {
        let span = import.source_span;
        if span.len() < 2 {
            continue;
        }
        let mut site = ReferenceSite::text(
            ReferenceDomain::Script,
            ReferenceKind::Import,
            file,
            SourceSpan::new(span.start + 1, span.end - 1),
            NameForm::Path,
            &import.source,
        );
        site.kind = SiteKind::FileRename;
        site.target_file = Some(
            resolver
                .and_then(|r| r.resolve(&import.source, file))
                .unwrap_or_else(|| import.source.clone()),
        );
        sites.push(site);
    }
    sites.sort_by_key(|s| (s.span.start, s.span.end));
    sites
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(file: &str, key: &str, start: usize) -> ReferenceSite {
        ReferenceSite::text(
            ReferenceDomain::Template,
            ReferenceKind::TagName,
            file,
            SourceSpan::new(start, start + 3),
            NameForm::KebabCase,
            "x-a",
        )
        .with_resource(key.to_string())
    }

    #[test]
    fn test_replace_is_atomic_per_file() {
        let mut index = InMemoryReferentialIndex::new();
        index.replace_file("a.html", vec![site("a.html", "custom-element:x-a", 1)]);
        index.replace_file("b.html", vec![site("b.html", "custom-element:x-a", 5)]);
        assert_eq!(index.references("custom-element:x-a").len(), 2);

        index.replace_file("a.html", vec![site("a.html", "custom-element:x-b", 1)]);
        assert_eq!(index.references("custom-element:x-a").len(), 1);
        assert_eq!(index.references("custom-element:x-b").len(), 1);
        assert!(index.is_coherent());

        index.remove_file("b.html");
        assert!(index.references("custom-element:x-a").is_empty());
        assert!(index.is_coherent());
    }

    #[test]
    fn test_forward_resolution_uses_same_sites() {
        let mut index = InMemoryReferentialIndex::new();
        index.replace_file("a.html", vec![site("a.html", "custom-element:x-a", 1)]);
        index.replace_file("b.html", vec![site("b.html", "custom-element:x-a", 5)]);
        assert_eq!(
            index.resolve_at("a.html", 2),
            Some(ReferenceTarget::Resource("custom-element:x-a".to_string()))
        );
        let refs = index.find_references_at("a.html", 2);
        assert_eq!(refs.len(), 2);
        assert!(index.find_references_at("a.html", 100).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut index = InMemoryReferentialIndex::new();
        index.replace_file("a.html", vec![site("a.html", "custom-element:x-a", 1)]);
        index.clear();
        assert!(index.files().next().is_none());
        assert!(index.references("custom-element:x-a").is_empty());
    }
}
