//! Script fact extraction.
//!
//! Parses a TypeScript/JavaScript module with oxc and records the syntactic
//! facts resource resolution needs: classes with their decorators, bindable
//! properties and static definitions, imports, exports and `register(...)`
//! calls. Values are captured as `FactValue`s; anything that is not a literal
//! shape is kept as a reference or `Unknown` and decided on later.

use au_compiler::parse_util::SourceSpan;
use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ArrayExpressionElement, Class, ClassElement, Declaration, Decorator, ExportDefaultDeclarationKind,
    Expression, ImportDeclarationSpecifier, ObjectPropertyKind, PropertyKey, Statement,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use serde::{Deserialize, Serialize};

use super::ExtractError;

/// A statically readable value from decorator arguments or static fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FactValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    /// An identifier or dotted member path (`BindingMode.twoWay`).
    Reference(String),
    Array(Vec<FactValue>),
    Object(ObjectFact),
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFact {
    pub entries: IndexMap<String, FactValue>,
    /// Spread or computed keys were present, so `entries` may be incomplete.
    pub open: bool,
}

impl FactValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectFact> {
        match self {
            FactValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Last segment of a reference path.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            FactValue::Reference(path) => path.rsplit('.').next(),
            _ => None,
        }
    }

    pub fn is_truthy_literal(&self) -> bool {
        matches!(self, FactValue::Bool(true))
    }
}

impl ObjectFact {
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.entries.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorFact {
    /// Callee name; the last segment for member callees.
    pub name: String,
    pub args: Vec<FactValue>,
    pub span: SourceSpan,
    pub arg_spans: Vec<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindableFact {
    pub property: String,
    /// Argument of `@bindable(...)`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FactValue>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFacts {
    pub name: String,
    pub name_span: SourceSpan,
    pub span: SourceSpan,
    pub exported: bool,
    pub decorators: Vec<DecoratorFact>,
    pub bindables: Vec<BindableFact>,
    /// `static dependencies = [...]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dependencies: Option<FactValue>,
    /// `static $au = {...}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_au: Option<FactValue>,
}

impl ClassFacts {
    pub fn decorator(&self, name: &str) -> Option<&DecoratorFact> {
        self.decorators.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedName {
    /// `default`, `*` or the exported name.
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFact {
    pub source: String,
    pub source_span: SourceSpan,
    pub names: Vec<ImportedName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFact {
    /// Exported name; `*` for an unnamed re-export of everything.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationFact {
    pub args: Vec<FactValue>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacts {
    pub path: String,
    pub classes: Vec<ClassFacts>,
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub registrations: Vec<RegistrationFact>,
}

impl FileFacts {
    pub fn new(path: impl Into<String>) -> Self {
        FileFacts {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassFacts> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// The import that binds `local` in this file.
    pub fn import_of(&self, local: &str) -> Option<(&ImportFact, &ImportedName)> {
        self.imports
            .iter()
            .find_map(|import| import.names.iter().find(|n| n.local == local).map(|n| (import, n)))
    }
}

pub fn is_declaration_file(path: &str) -> bool {
    path.ends_with(".d.ts") || path.ends_with(".d.mts") || path.ends_with(".d.cts")
}

pub fn is_script_file(path: &str) -> bool {
    [".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

pub fn extract_facts(path: &str, source: &str) -> Result<FileFacts, ExtractError> {
    let source_type = SourceType::from_path(path).map_err(|_| ExtractError::UnsupportedFile {
        file: path.to_string(),
    })?;
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(ExtractError::Parse {
            file: path.to_string(),
            message,
        });
    }

    let mut facts = FileFacts::new(path);
    for stmt in &ret.program.body {
        visit_statement(stmt, &mut facts);
    }
    tracing::trace!(
        file = path,
        classes = facts.classes.len(),
        imports = facts.imports.len(),
        registrations = facts.registrations.len(),
        "extracted facts"
    );
    Ok(facts)
}

fn visit_statement(stmt: &Statement<'_>, facts: &mut FileFacts) {
    match stmt {
        Statement::ImportDeclaration(decl) => {
            let names = decl
                .specifiers
                .iter()
                .flatten()
                .map(|spec| match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => ImportedName {
                        imported: s.imported.name().to_string(),
                        local: s.local.name.to_string(),
                    },
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportedName {
                        imported: "default".to_string(),
                        local: s.local.name.to_string(),
                    },
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportedName {
                        imported: "*".to_string(),
                        local: s.local.name.to_string(),
                    },
                })
                .collect();
            facts.imports.push(ImportFact {
                source: decl.source.value.to_string(),
                source_span: span_of(decl.source.span),
                names,
            });
        }
        Statement::ClassDeclaration(class) => {
            if let Some(class) = class_facts(class, false, None) {
                facts.classes.push(class);
            }
        }
        Statement::ExportNamedDeclaration(decl) => {
            match &decl.declaration {
                Some(Declaration::ClassDeclaration(class)) => {
                    if let Some(class) = class_facts(class, true, None) {
                        facts.exports.push(ExportFact {
                            name: class.name.clone(),
                            local: Some(class.name.clone()),
                            source: None,
                            span: class.name_span,
                        });
                        facts.classes.push(class);
                    }
                }
                Some(Declaration::FunctionDeclaration(func)) => {
                    if let Some(id) = &func.id {
                        facts.exports.push(local_export(id.name.as_str(), id.span));
                    }
                }
                Some(Declaration::VariableDeclaration(var)) => {
                    for declarator in &var.declarations {
                        if let Some(name) = declarator.id.get_identifier_name() {
                            facts.exports.push(local_export(name.as_str(), declarator.span));
                        }
                        if let Some(init) = &declarator.init {
                            collect_registrations(init, facts);
                        }
                    }
                }
                _ => {}
            }
            let source = decl.source.as_ref().map(|s| s.value.to_string());
            for spec in &decl.specifiers {
                facts.exports.push(ExportFact {
                    name: spec.exported.name().to_string(),
                    local: Some(spec.local.name().to_string()),
                    source: source.clone(),
                    span: span_of(spec.span),
                });
            }
        }
        Statement::ExportDefaultDeclaration(decl) => {
            let local = match &decl.declaration {
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    class_facts(class, true, Some("default")).map(|class| {
                        let name = class.name.clone();
                        facts.classes.push(class);
                        name
                    })
                }
                ExportDefaultDeclarationKind::Identifier(id) => Some(id.name.to_string()),
                _ => None,
            };
            facts.exports.push(ExportFact {
                name: "default".to_string(),
                local,
                source: None,
                span: span_of(decl.span),
            });
        }
        Statement::ExportAllDeclaration(decl) => {
            facts.exports.push(ExportFact {
                name: decl
                    .exported
                    .as_ref()
                    .map(|e| e.name().to_string())
                    .unwrap_or_else(|| "*".to_string()),
                local: None,
                source: Some(decl.source.value.to_string()),
                span: span_of(decl.span),
            });
        }
        Statement::ExpressionStatement(stmt) => collect_registrations(&stmt.expression, facts),
        Statement::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                if let Some(init) = &declarator.init {
                    collect_registrations(init, facts);
                }
            }
        }
        _ => {}
    }
}

fn local_export(name: &str, span: Span) -> ExportFact {
    ExportFact {
        name: name.to_string(),
        local: Some(name.to_string()),
        source: None,
        span: span_of(span),
    }
}

fn class_facts(class: &Class<'_>, exported: bool, fallback_name: Option<&str>) -> Option<ClassFacts> {
    let (name, name_span) = match &class.id {
        Some(id) => (id.name.to_string(), span_of(id.span)),
        None => (fallback_name?.to_string(), SourceSpan::empty(class.span.start as usize)),
    };
    let mut facts = ClassFacts {
        name,
        name_span,
        span: span_of(class.span),
        exported,
        decorators: class.decorators.iter().filter_map(decorator_fact).collect(),
        bindables: Vec::new(),
        static_dependencies: None,
        static_au: None,
    };

    for element in &class.body.body {
        let (key, is_static, value, decorators) = match element {
            ClassElement::PropertyDefinition(prop) => (&prop.key, prop.r#static, prop.value.as_ref(), &prop.decorators),
            ClassElement::AccessorProperty(prop) => (&prop.key, prop.r#static, prop.value.as_ref(), &prop.decorators),
            _ => continue,
        };
        let Some(prop_name) = property_name(key) else {
            continue;
        };
        if is_static {
            match prop_name.as_str() {
                "dependencies" => facts.static_dependencies = Some(value.map(fact_value).unwrap_or(FactValue::Unknown)),
                "$au" => facts.static_au = Some(value.map(fact_value).unwrap_or(FactValue::Unknown)),
                _ => {}
            }
            continue;
        }
        for decorator in decorators.iter().filter_map(decorator_fact) {
            if decorator.name == "bindable" {
                facts.bindables.push(BindableFact {
                    property: prop_name.clone(),
                    config: decorator.args.into_iter().next(),
                    span: span_of(key.span()),
                });
                break;
            }
        }
    }
    Some(facts)
}

fn property_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn decorator_fact(decorator: &Decorator<'_>) -> Option<DecoratorFact> {
    let span = span_of(decorator.span);
    match &decorator.expression {
        Expression::CallExpression(call) => Some(DecoratorFact {
            name: callee_name(&call.callee)?,
            args: call.arguments.iter().map(argument_value).collect(),
            span,
            arg_spans: call.arguments.iter().map(|a| span_of(a.span())).collect(),
        }),
        expr => Some(DecoratorFact {
            name: callee_name(expr)?,
            args: Vec::new(),
            span,
            arg_spans: Vec::new(),
        }),
    }
}

fn callee_name(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => Some(member.property.name.to_string()),
        _ => None,
    }
}

fn argument_value(arg: &Argument<'_>) -> FactValue {
    arg.as_expression().map(fact_value).unwrap_or(FactValue::Unknown)
}

pub(crate) fn fact_value(expr: &Expression<'_>) -> FactValue {
    match expr {
        Expression::StringLiteral(s) => FactValue::String(s.value.to_string()),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() => t
            .quasis
            .first()
            .and_then(|q| q.value.cooked.as_ref())
            .map(|cooked| FactValue::String(cooked.to_string()))
            .unwrap_or(FactValue::Unknown),
        Expression::NumericLiteral(n) => FactValue::Number(n.value),
        Expression::BooleanLiteral(b) => FactValue::Bool(b.value),
        Expression::NullLiteral(_) => FactValue::Null,
        Expression::Identifier(id) if id.name == "undefined" => FactValue::Null,
        Expression::Identifier(id) => FactValue::Reference(id.name.to_string()),
        Expression::StaticMemberExpression(_) => member_path(expr).map(FactValue::Reference).unwrap_or(FactValue::Unknown),
        Expression::ArrayExpression(array) => FactValue::Array(
            array
                .elements
                .iter()
                .map(|el| match el {
                    ArrayExpressionElement::SpreadElement(_) | ArrayExpressionElement::Elision(_) => FactValue::Unknown,
                    el => el.as_expression().map(fact_value).unwrap_or(FactValue::Unknown),
                })
                .collect(),
        ),
        Expression::ObjectExpression(object) => {
            let mut fact = ObjectFact::default();
            for prop in &object.properties {
                match prop {
                    ObjectPropertyKind::ObjectProperty(p) if !p.computed => match property_name(&p.key) {
                        Some(key) => {
                            fact.entries.insert(key, fact_value(&p.value));
                        }
                        None => fact.open = true,
                    },
                    _ => fact.open = true,
                }
            }
            FactValue::Object(fact)
        }
        Expression::ParenthesizedExpression(p) => fact_value(&p.expression),
        Expression::TSAsExpression(e) => fact_value(&e.expression),
        Expression::TSSatisfiesExpression(e) => fact_value(&e.expression),
        Expression::TSNonNullExpression(e) => fact_value(&e.expression),
        _ => FactValue::Unknown,
    }
}

fn member_path(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => {
            Some(format!("{}.{}", member_path(&member.object)?, member.property.name))
        }
        _ => None,
    }
}

/// Records `<x>.register(...)` calls anywhere in a top-level expression chain.
fn collect_registrations(expr: &Expression<'_>, facts: &mut FileFacts) {
    match expr {
        Expression::CallExpression(call) => {
            if let Expression::StaticMemberExpression(member) = &call.callee {
                if member.property.name == "register" {
                    facts.registrations.push(RegistrationFact {
                        args: call.arguments.iter().map(argument_value).collect(),
                        span: span_of(call.span),
                    });
                }
            }
            collect_registrations(&call.callee, facts);
            for arg in &call.arguments {
                if let Some(arg) = arg.as_expression() {
                    collect_registrations(arg, facts);
                }
            }
        }
        Expression::StaticMemberExpression(member) => collect_registrations(&member.object, facts),
        Expression::AwaitExpression(e) => collect_registrations(&e.argument, facts),
        Expression::ParenthesizedExpression(e) => collect_registrations(&e.expression, facts),
        Expression::NewExpression(e) => {
            for arg in &e.arguments {
                if let Some(arg) = arg.as_expression() {
                    collect_registrations(arg, facts);
                }
            }
        }
        Expression::SequenceExpression(e) => {
            for expr in &e.expressions {
                collect_registrations(expr, facts);
            }
        }
        _ => {}
    }
}

fn span_of(span: Span) -> SourceSpan {
    SourceSpan::new(span.start as usize, span.end as usize)
}
