/**
 * Binding Expression AST
 *
 * Every node carries an absolute `SourceSpan` into the authored template, so the
 * emitters can map generated code back to the exact characters that produced it.
 * Serialized with a `$kind` discriminator.
 */
use serde::{Deserialize, Serialize};

use crate::parse_util::SourceSpan;

/// How an attribute value or text fragment is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionType {
    /// Plain binding expression (`value.bind`, `<let>`, controller values).
    IsProperty,
    /// Event handler (`click.trigger`).
    IsFunction,
    /// `repeat.for` header.
    IsIterator,
    /// `${...}` text or attribute interpolation.
    Interpolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: SourceSpan,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Identifier {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$kind")]
pub enum Expr {
    AccessThis(AccessThis),
    AccessBoundary(AccessBoundary),
    AccessScope(AccessScope),
    AccessGlobal(AccessGlobal),
    AccessMember(AccessMember),
    AccessKeyed(AccessKeyed),
    CallScope(CallScope),
    CallMember(CallMember),
    CallFunction(CallFunction),
    CallGlobal(CallGlobal),
    Unary(Unary),
    Binary(Binary),
    Conditional(Conditional),
    Assign(Assign),
    ArrowFunction(ArrowFunction),
    ValueConverter(ValueConverter),
    BindingBehavior(BindingBehavior),
    PrimitiveLiteral(PrimitiveLiteral),
    ArrayLiteral(ArrayLiteral),
    ObjectLiteral(ObjectLiteral),
    Template(TemplateExpression),
    TaggedTemplate(TaggedTemplate),
    Paren(Paren),
    Interpolation(Interpolation),
    ForOfStatement(ForOfStatement),
    BindingIdentifier(BindingIdentifier),
    ArrayBindingPattern(ArrayBindingPattern),
    ObjectBindingPattern(ObjectBindingPattern),
    BindingPatternDefault(BindingPatternDefault),
    BindingPatternHole(BindingPatternHole),
    BadExpression(BadExpression),
}

/// `$this` (ancestor 0), `$parent` (1), `$parent.$parent` (2), ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessThis {
    pub ancestor: u32,
    pub span: SourceSpan,
}

/// `this` / `$host`: the owning component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessBoundary {
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessScope {
    pub name: Identifier,
    pub ancestor: u32,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGlobal {
    pub name: Identifier,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessMember {
    pub object: Box<Expr>,
    pub name: Identifier,
    pub optional: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyed {
    pub object: Box<Expr>,
    pub key: Box<Expr>,
    pub optional: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallScope {
    pub name: Identifier,
    pub args: Vec<Expr>,
    pub ancestor: u32,
    pub optional: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMember {
    pub object: Box<Expr>,
    pub name: Identifier,
    pub args: Vec<Expr>,
    pub optional_member: bool,
    pub optional_call: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallFunction {
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
    pub optional: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallGlobal {
    pub name: Identifier,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub operation: String,
    pub expression: Box<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub operation: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: Box<Expr>,
    pub yes: Box<Expr>,
    pub no: Box<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub op: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub args: Vec<BindingIdentifier>,
    pub body: Box<Expr>,
    /// The last parameter is a rest parameter.
    pub rest: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueConverter {
    pub expression: Box<Expr>,
    pub name: Identifier,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingBehavior {
    pub expression: Box<Expr>,
    pub name: Identifier,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveLiteral {
    pub value: LiteralValue,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectKey {
    pub name: String,
    pub quoted: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLiteral {
    pub keys: Vec<ObjectKey>,
    pub values: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExpression {
    pub cooked: Vec<String>,
    pub expressions: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedTemplate {
    pub func: Box<Expr>,
    pub cooked: Vec<String>,
    pub expressions: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paren {
    pub expression: Box<Expr>,
    pub span: SourceSpan,
}

/// `parts.len() == expressions.len() + 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub parts: Vec<String>,
    pub expressions: Vec<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForOfStatement {
    /// `BindingIdentifier`, `ArrayBindingPattern`, `ObjectBindingPattern` or `BadExpression`.
    pub declaration: Box<Expr>,
    pub iterable: Box<Expr>,
    /// Offset of the `;` that starts the tail (`key: id`) relative to the attribute
    /// value, `-1` when there is no tail.
    pub semi_idx: isize,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingIdentifier {
    pub name: Identifier,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayBindingPattern {
    /// Targets, defaults and holes in positional order.
    pub elements: Vec<Expr>,
    pub rest: Option<Box<Expr>>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPatternProperty {
    pub key: String,
    pub key_span: SourceSpan,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectBindingPattern {
    pub properties: Vec<BindingPatternProperty>,
    pub rest: Option<Box<Expr>>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPatternDefault {
    pub target: Box<Expr>,
    pub default: Box<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPatternHole {
    pub span: SourceSpan,
}

/// Produced instead of failing when the source text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadExpression {
    pub text: String,
    pub message: String,
    pub span: SourceSpan,
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Expr::AccessThis(e) => e.span,
            Expr::AccessBoundary(e) => e.span,
            Expr::AccessScope(e) => e.span,
            Expr::AccessGlobal(e) => e.span,
            Expr::AccessMember(e) => e.span,
            Expr::AccessKeyed(e) => e.span,
            Expr::CallScope(e) => e.span,
            Expr::CallMember(e) => e.span,
            Expr::CallFunction(e) => e.span,
            Expr::CallGlobal(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::ArrowFunction(e) => e.span,
            Expr::ValueConverter(e) => e.span,
            Expr::BindingBehavior(e) => e.span,
            Expr::PrimitiveLiteral(e) => e.span,
            Expr::ArrayLiteral(e) => e.span,
            Expr::ObjectLiteral(e) => e.span,
            Expr::Template(e) => e.span,
            Expr::TaggedTemplate(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Interpolation(e) => e.span,
            Expr::ForOfStatement(e) => e.span,
            Expr::BindingIdentifier(e) => e.span,
            Expr::ArrayBindingPattern(e) => e.span,
            Expr::ObjectBindingPattern(e) => e.span,
            Expr::BindingPatternDefault(e) => e.span,
            Expr::BindingPatternHole(e) => e.span,
            Expr::BadExpression(e) => e.span,
        }
    }

    /// The `$kind` discriminator as it appears in serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::AccessThis(_) => "AccessThis",
            Expr::AccessBoundary(_) => "AccessBoundary",
            Expr::AccessScope(_) => "AccessScope",
            Expr::AccessGlobal(_) => "AccessGlobal",
            Expr::AccessMember(_) => "AccessMember",
            Expr::AccessKeyed(_) => "AccessKeyed",
            Expr::CallScope(_) => "CallScope",
            Expr::CallMember(_) => "CallMember",
            Expr::CallFunction(_) => "CallFunction",
            Expr::CallGlobal(_) => "CallGlobal",
            Expr::Unary(_) => "Unary",
            Expr::Binary(_) => "Binary",
            Expr::Conditional(_) => "Conditional",
            Expr::Assign(_) => "Assign",
            Expr::ArrowFunction(_) => "ArrowFunction",
            Expr::ValueConverter(_) => "ValueConverter",
            Expr::BindingBehavior(_) => "BindingBehavior",
            Expr::PrimitiveLiteral(_) => "PrimitiveLiteral",
            Expr::ArrayLiteral(_) => "ArrayLiteral",
            Expr::ObjectLiteral(_) => "ObjectLiteral",
            Expr::Template(_) => "Template",
            Expr::TaggedTemplate(_) => "TaggedTemplate",
            Expr::Paren(_) => "Paren",
            Expr::Interpolation(_) => "Interpolation",
            Expr::ForOfStatement(_) => "ForOfStatement",
            Expr::BindingIdentifier(_) => "BindingIdentifier",
            Expr::ArrayBindingPattern(_) => "ArrayBindingPattern",
            Expr::ObjectBindingPattern(_) => "ObjectBindingPattern",
            Expr::BindingPatternDefault(_) => "BindingPatternDefault",
            Expr::BindingPatternHole(_) => "BindingPatternHole",
            Expr::BadExpression(_) => "BadExpression",
        }
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, Expr::BadExpression(_))
    }

    /// Whether the expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expr::AccessScope(_) | Expr::AccessMember(_) | Expr::AccessKeyed(_)
        )
    }
}

/// Recursive visitor over the expression tree. Override `visit_expr` and call
/// `walk_expr` to keep descending.
pub trait Visitor {
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::AccessThis(_)
        | Expr::AccessBoundary(_)
        | Expr::AccessScope(_)
        | Expr::AccessGlobal(_)
        | Expr::PrimitiveLiteral(_)
        | Expr::BindingIdentifier(_)
        | Expr::BindingPatternHole(_)
        | Expr::BadExpression(_) => {}
        Expr::AccessMember(e) => visitor.visit_expr(&e.object),
        Expr::AccessKeyed(e) => {
            visitor.visit_expr(&e.object);
            visitor.visit_expr(&e.key);
        }
        Expr::CallScope(e) => e.args.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::CallMember(e) => {
            visitor.visit_expr(&e.object);
            e.args.iter().for_each(|a| visitor.visit_expr(a));
        }
        Expr::CallFunction(e) => {
            visitor.visit_expr(&e.func);
            e.args.iter().for_each(|a| visitor.visit_expr(a));
        }
        Expr::CallGlobal(e) => e.args.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::Unary(e) => visitor.visit_expr(&e.expression),
        Expr::Binary(e) => {
            visitor.visit_expr(&e.left);
            visitor.visit_expr(&e.right);
        }
        Expr::Conditional(e) => {
            visitor.visit_expr(&e.condition);
            visitor.visit_expr(&e.yes);
            visitor.visit_expr(&e.no);
        }
        Expr::Assign(e) => {
            visitor.visit_expr(&e.target);
            visitor.visit_expr(&e.value);
        }
        Expr::ArrowFunction(e) => visitor.visit_expr(&e.body),
        Expr::ValueConverter(e) => {
            visitor.visit_expr(&e.expression);
            e.args.iter().for_each(|a| visitor.visit_expr(a));
        }
        Expr::BindingBehavior(e) => {
            visitor.visit_expr(&e.expression);
            e.args.iter().for_each(|a| visitor.visit_expr(a));
        }
        Expr::ArrayLiteral(e) => e.elements.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::ObjectLiteral(e) => e.values.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::Template(e) => e.expressions.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::TaggedTemplate(e) => {
            visitor.visit_expr(&e.func);
            e.expressions.iter().for_each(|a| visitor.visit_expr(a));
        }
        Expr::Paren(e) => visitor.visit_expr(&e.expression),
        Expr::Interpolation(e) => e.expressions.iter().for_each(|a| visitor.visit_expr(a)),
        Expr::ForOfStatement(e) => {
            visitor.visit_expr(&e.declaration);
            visitor.visit_expr(&e.iterable);
        }
        Expr::ArrayBindingPattern(e) => {
            e.elements.iter().for_each(|a| visitor.visit_expr(a));
            if let Some(rest) = &e.rest {
                visitor.visit_expr(rest);
            }
        }
        Expr::ObjectBindingPattern(e) => {
            e.properties.iter().for_each(|p| visitor.visit_expr(&p.value));
            if let Some(rest) = &e.rest {
                visitor.visit_expr(rest);
            }
        }
        Expr::BindingPatternDefault(e) => {
            visitor.visit_expr(&e.target);
            visitor.visit_expr(&e.default);
        }
    }
}

/// Rewrite every span in the tree, identifier and key spans included.
pub fn map_spans(expr: &mut Expr, f: &impl Fn(SourceSpan) -> SourceSpan) {
    fn all(exprs: &mut [Expr], f: &impl Fn(SourceSpan) -> SourceSpan) {
        exprs.iter_mut().for_each(|e| map_spans(e, f));
    }
    match expr {
        Expr::AccessThis(e) => e.span = f(e.span),
        Expr::AccessBoundary(e) => e.span = f(e.span),
        Expr::AccessScope(e) => {
            e.name.span = f(e.name.span);
            e.span = f(e.span);
        }
        Expr::AccessGlobal(e) => {
            e.name.span = f(e.name.span);
            e.span = f(e.span);
        }
        Expr::AccessMember(e) => {
            map_spans(&mut e.object, f);
            e.name.span = f(e.name.span);
            e.span = f(e.span);
        }
        Expr::AccessKeyed(e) => {
            map_spans(&mut e.object, f);
            map_spans(&mut e.key, f);
            e.span = f(e.span);
        }
        Expr::CallScope(e) => {
            e.name.span = f(e.name.span);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::CallMember(e) => {
            map_spans(&mut e.object, f);
            e.name.span = f(e.name.span);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::CallFunction(e) => {
            map_spans(&mut e.func, f);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::CallGlobal(e) => {
            e.name.span = f(e.name.span);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::Unary(e) => {
            map_spans(&mut e.expression, f);
            e.span = f(e.span);
        }
        Expr::Binary(e) => {
            map_spans(&mut e.left, f);
            map_spans(&mut e.right, f);
            e.span = f(e.span);
        }
        Expr::Conditional(e) => {
            map_spans(&mut e.condition, f);
            map_spans(&mut e.yes, f);
            map_spans(&mut e.no, f);
            e.span = f(e.span);
        }
        Expr::Assign(e) => {
            map_spans(&mut e.target, f);
            map_spans(&mut e.value, f);
            e.span = f(e.span);
        }
        Expr::ArrowFunction(e) => {
            for arg in &mut e.args {
                arg.name.span = f(arg.name.span);
                arg.span = f(arg.span);
            }
            map_spans(&mut e.body, f);
            e.span = f(e.span);
        }
        Expr::ValueConverter(e) => {
            map_spans(&mut e.expression, f);
            e.name.span = f(e.name.span);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::BindingBehavior(e) => {
            map_spans(&mut e.expression, f);
            e.name.span = f(e.name.span);
            all(&mut e.args, f);
            e.span = f(e.span);
        }
        Expr::PrimitiveLiteral(e) => e.span = f(e.span),
        Expr::ArrayLiteral(e) => {
            all(&mut e.elements, f);
            e.span = f(e.span);
        }
        Expr::ObjectLiteral(e) => {
            for key in &mut e.keys {
                key.span = f(key.span);
            }
            all(&mut e.values, f);
            e.span = f(e.span);
        }
        Expr::Template(e) => {
            all(&mut e.expressions, f);
            e.span = f(e.span);
        }
        Expr::TaggedTemplate(e) => {
            map_spans(&mut e.func, f);
            all(&mut e.expressions, f);
            e.span = f(e.span);
        }
        Expr::Paren(e) => {
            map_spans(&mut e.expression, f);
            e.span = f(e.span);
        }
        Expr::Interpolation(e) => {
            all(&mut e.expressions, f);
            e.span = f(e.span);
        }
        Expr::ForOfStatement(e) => {
            map_spans(&mut e.declaration, f);
            map_spans(&mut e.iterable, f);
            e.span = f(e.span);
        }
        Expr::BindingIdentifier(e) => {
            e.name.span = f(e.name.span);
            e.span = f(e.span);
        }
        Expr::ArrayBindingPattern(e) => {
            all(&mut e.elements, f);
            if let Some(rest) = &mut e.rest {
                map_spans(rest, f);
            }
            e.span = f(e.span);
        }
        Expr::ObjectBindingPattern(e) => {
            for prop in &mut e.properties {
                prop.key_span = f(prop.key_span);
                map_spans(&mut prop.value, f);
            }
            if let Some(rest) = &mut e.rest {
                map_spans(rest, f);
            }
            e.span = f(e.span);
        }
        Expr::BindingPatternDefault(e) => {
            map_spans(&mut e.target, f);
            map_spans(&mut e.default, f);
            e.span = f(e.span);
        }
        Expr::BindingPatternHole(e) => e.span = f(e.span),
        Expr::BadExpression(e) => e.span = f(e.span),
    }
}

/// Names declared by a binding target (`item`, `[a, b]`, `{ x, y: z }`), in source order.
pub fn binding_target_names(target: &Expr) -> Vec<Identifier> {
    let mut names = Vec::new();
    collect_binding_names(target, &mut names);
    names
}

fn collect_binding_names(target: &Expr, out: &mut Vec<Identifier>) {
    match target {
        Expr::BindingIdentifier(b) => out.push(b.name.clone()),
        Expr::ArrayBindingPattern(p) => {
            p.elements.iter().for_each(|e| collect_binding_names(e, out));
            if let Some(rest) = &p.rest {
                collect_binding_names(rest, out);
            }
        }
        Expr::ObjectBindingPattern(p) => {
            p.properties.iter().for_each(|prop| collect_binding_names(&prop.value, out));
            if let Some(rest) = &p.rest {
                collect_binding_names(rest, out);
            }
        }
        Expr::BindingPatternDefault(d) => collect_binding_names(&d.target, out),
        _ => {}
    }
}
