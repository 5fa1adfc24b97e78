//! Mapped Emitter
//!
//! Prints expression ASTs as TypeScript while recording, for every sub-node, the
//! generated range and the source span it came from. Member, call and keyed
//! accesses additionally produce segments carrying a dotted path.

use serde::{Deserialize, Serialize};

use crate::expression_parser::*;
use crate::parse_util::SourceSpan;
use crate::util::quote_string;

/// A generated range `[start, end)` paired with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitMapping {
    pub start: usize,
    pub end: usize,
    pub source: SourceSpan,
}

/// A member name in generated code with its access path (`user.address.city`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitSegment {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub source: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emitted {
    pub code: String,
    pub mappings: Vec<EmitMapping>,
    pub segments: Vec<EmitSegment>,
    /// Access path of this node, when it is a plain access chain.
    pub path: Option<String>,
}

/// Piece of a combined emission.
pub enum Part {
    Text(String),
    Node(Emitted),
    /// Text that is itself a named segment.
    Segment { text: String, path: String, source: SourceSpan },
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Part::Text(text.to_string())
    }
}

impl From<Emitted> for Part {
    fn from(node: Emitted) -> Self {
        Part::Node(node)
    }
}

impl Emitted {
    /// Concatenate parts, shifting child mappings by the accumulated length, and map
    /// the whole to `source`.
    pub fn combine(parts: Vec<Part>, source: SourceSpan) -> Emitted {
        let mut out = Emitted::default();
        for part in parts {
            let offset = out.code.len();
            match part {
                Part::Text(text) => out.code.push_str(&text),
                Part::Node(node) => {
                    out.code.push_str(&node.code);
                    out.mappings.extend(node.mappings.into_iter().map(|m| EmitMapping {
                        start: m.start + offset,
                        end: m.end + offset,
                        source: m.source,
                    }));
                    out.segments.extend(node.segments.into_iter().map(|s| EmitSegment {
                        start: s.start + offset,
                        end: s.end + offset,
                        ..s
                    }));
                }
                Part::Segment { text, path, source } => {
                    out.code.push_str(&text);
                    out.segments.push(EmitSegment {
                        path,
                        start: offset,
                        end: offset + text.len(),
                        source,
                    });
                }
            }
        }
        out.mappings.push(EmitMapping {
            start: 0,
            end: out.code.len(),
            source,
        });
        out
    }

    fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }
}

/// How scope reads are rendered inside a lambda.
pub struct EmitContext<'a> {
    /// Lambda parameter holding the frame scope (`o`).
    pub param: &'a str,
    /// `$this` renders as `o.$this` instead of `o`.
    pub has_overlay_this: bool,
    /// Arrow-function parameters currently in scope.
    locals: Vec<String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(param: &'a str, has_overlay_this: bool) -> Self {
        EmitContext {
            param,
            has_overlay_this,
            locals: Vec::new(),
        }
    }

    fn scope_prefix(&self, ancestor: u32) -> String {
        let mut prefix = self.param.to_string();
        for _ in 0..ancestor {
            prefix.push_str(".$parent");
        }
        prefix
    }
}

fn join_path(base: Option<&str>, name: &str) -> String {
    match base {
        Some(base) if !base.is_empty() => format!("{base}.{name}"),
        _ => name.to_string(),
    }
}

fn args_parts(args: &[Expr], ctx: &mut EmitContext<'_>) -> Vec<Part> {
    let mut parts = vec![Part::from("(")];
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            parts.push(", ".into());
        }
        parts.push(emit_expr(arg, ctx).into());
    }
    parts.push(")".into());
    parts
}

fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary(_) | Expr::Conditional(_) | Expr::Assign(_) | Expr::ArrowFunction(_)
    )
}

fn operand(expr: &Expr, ctx: &mut EmitContext<'_>) -> Part {
    let emitted = emit_expr(expr, ctx);
    if needs_parens(expr) {
        Part::Node(Emitted::combine(vec!["(".into(), emitted.into(), ")".into()], expr.span()))
    } else {
        Part::Node(emitted)
    }
}

fn escape_template(cooked: &str) -> String {
    cooked.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

fn template_parts(cooked: &[String], expressions: &[Expr], ctx: &mut EmitContext<'_>) -> Vec<Part> {
    let mut parts = vec![Part::from("`")];
    for (i, text) in cooked.iter().enumerate() {
        parts.push(Part::Text(escape_template(text)));
        if let Some(expr) = expressions.get(i) {
            parts.push("${".into());
            parts.push(emit_expr(expr, ctx).into());
            parts.push("}".into());
        }
    }
    parts.push("`".into());
    parts
}

/// Placeholder standing in for unparseable text, padded to the original length.
pub fn bad_expression_placeholder(span: SourceSpan) -> String {
    let width = span.len().max(1);
    format!("0{}", " ".repeat(width - 1))
}

pub fn emit_expr(expr: &Expr, ctx: &mut EmitContext<'_>) -> Emitted {
    let span = expr.span();
    match expr {
        Expr::AccessScope(e) => {
            if e.ancestor == 0 && ctx.locals.iter().any(|l| *l == e.name.name) {
                return Emitted::combine(
                    vec![Part::Segment {
                        text: e.name.name.clone(),
                        path: e.name.name.clone(),
                        source: e.name.span,
                    }],
                    span,
                )
                .with_path(Some(e.name.name.clone()));
            }
            let prefix = ctx.scope_prefix(e.ancestor);
            Emitted::combine(
                vec![
                    Part::Text(format!("{prefix}.")),
                    Part::Segment {
                        text: e.name.name.clone(),
                        path: e.name.name.clone(),
                        source: e.name.span,
                    },
                ],
                span,
            )
            .with_path(Some(e.name.name.clone()))
        }
        Expr::AccessThis(e) => {
            let mut text = ctx.scope_prefix(e.ancestor);
            if e.ancestor == 0 && ctx.has_overlay_this {
                text.push_str(".$this");
            }
            Emitted::combine(vec![Part::Text(text)], span).with_path(Some(String::new()))
        }
        Expr::AccessBoundary(_) => {
            Emitted::combine(vec![Part::Text(format!("{}.$vm", ctx.param))], span).with_path(Some(String::new()))
        }
        Expr::AccessGlobal(e) => Emitted::combine(
            vec![Part::Segment {
                text: e.name.name.clone(),
                path: e.name.name.clone(),
                source: e.name.span,
            }],
            span,
        )
        .with_path(Some(e.name.name.clone())),
        Expr::AccessMember(e) => {
            let object = emit_expr(&e.object, ctx);
            let path = join_path(object.path.as_deref(), &e.name.name);
            Emitted::combine(
                vec![
                    object.into(),
                    if e.optional { "?.".into() } else { ".".into() },
                    Part::Segment {
                        text: e.name.name.clone(),
                        path: path.clone(),
                        source: e.name.span,
                    },
                ],
                span,
            )
            .with_path(Some(path))
        }
        Expr::AccessKeyed(e) => {
            let object = emit_expr(&e.object, ctx);
            let mut key = emit_expr(&e.key, ctx);
            let string_key = matches!(
                &*e.key,
                Expr::PrimitiveLiteral(PrimitiveLiteral {
                    value: LiteralValue::String(_),
                    ..
                })
            );
            let path = match &*e.key {
                Expr::PrimitiveLiteral(PrimitiveLiteral {
                    value: LiteralValue::String(k),
                    ..
                }) => join_path(object.path.as_deref(), k),
                _ => format!("{}[]", object.path.as_deref().unwrap_or_default()),
            };
            let key_span = e.key.span();
            // String keys map their contents without the quotes when the requoted
            // literal lines up with the authored one; otherwise the key is opaque.
            let quoted = usize::from(string_key && key.code.len() == key_span.len() && key_span.len() >= 2);
            key.segments.push(EmitSegment {
                path: path.clone(),
                start: quoted,
                end: key.code.len() - quoted,
                source: SourceSpan::new(key_span.start + quoted, key_span.end - quoted),
            });
            let mut parts = vec![Part::Node(object), if e.optional { "?.[".into() } else { "[".into() }];
            parts.push(Part::Node(key));
            parts.push("]".into());
            Emitted::combine(parts, span).with_path(Some(path))
        }
        Expr::CallScope(e) => {
            let (prefix, path) = if e.ancestor == 0 && ctx.locals.iter().any(|l| *l == e.name.name) {
                (String::new(), e.name.name.clone())
            } else {
                (format!("{}.", ctx.scope_prefix(e.ancestor)), e.name.name.clone())
            };
            let mut parts = vec![
                Part::Text(prefix),
                Part::Segment {
                    text: e.name.name.clone(),
                    path,
                    source: e.name.span,
                },
            ];
            if e.optional {
                parts.push("?.".into());
            }
            parts.extend(args_parts(&e.args, ctx));
            Emitted::combine(parts, span)
        }
        Expr::CallMember(e) => {
            let object = emit_expr(&e.object, ctx);
            let path = join_path(object.path.as_deref(), &e.name.name);
            let mut parts = vec![
                object.into(),
                if e.optional_member { "?.".into() } else { ".".into() },
                Part::Segment {
                    text: e.name.name.clone(),
                    path,
                    source: e.name.span,
                },
            ];
            if e.optional_call {
                parts.push("?.".into());
            }
            parts.extend(args_parts(&e.args, ctx));
            Emitted::combine(parts, span)
        }
        Expr::CallFunction(e) => {
            let mut parts = vec![operand(&e.func, ctx)];
            if e.optional {
                parts.push("?.".into());
            }
            parts.extend(args_parts(&e.args, ctx));
            Emitted::combine(parts, span)
        }
        Expr::CallGlobal(e) => {
            let mut parts = vec![Part::Segment {
                text: e.name.name.clone(),
                path: e.name.name.clone(),
                source: e.name.span,
            }];
            parts.extend(args_parts(&e.args, ctx));
            Emitted::combine(parts, span)
        }
        Expr::Unary(e) => {
            let inner = operand(&e.expression, ctx);
            let inner_start = match &inner {
                Part::Node(node) => node.code.chars().next(),
                _ => None,
            };
            // `- -x` and `+ +x` must not fuse into `--x` / `++x`.
            let fuses = matches!(e.operation.as_str(), "-" | "+") && inner_start.is_some_and(|c| c == '-' || c == '+');
            let op = if fuses || e.operation.chars().all(|c| c.is_ascii_alphabetic()) {
                format!("{} ", e.operation)
            } else {
                e.operation.clone()
            };
            Emitted::combine(vec![Part::Text(op), inner], span)
        }
        Expr::Binary(e) => Emitted::combine(
            vec![
                operand(&e.left, ctx),
                Part::Text(format!(" {} ", e.operation)),
                operand(&e.right, ctx),
            ],
            span,
        ),
        Expr::Conditional(e) => Emitted::combine(
            vec![
                operand(&e.condition, ctx),
                " ? ".into(),
                operand(&e.yes, ctx),
                " : ".into(),
                operand(&e.no, ctx),
            ],
            span,
        ),
        Expr::Assign(e) => Emitted::combine(
            vec![
                emit_expr(&e.target, ctx).into(),
                Part::Text(format!(" {} ", e.op)),
                operand(&e.value, ctx),
            ],
            span,
        ),
        Expr::ArrowFunction(e) => {
            let mut parts = vec![Part::from("(")];
            for (i, arg) in e.args.iter().enumerate() {
                if i > 0 {
                    parts.push(", ".into());
                }
                if e.rest && i + 1 == e.args.len() {
                    parts.push("...".into());
                }
                parts.push(Part::Segment {
                    text: arg.name.name.clone(),
                    path: arg.name.name.clone(),
                    source: arg.name.span,
                });
            }
            parts.push(") => ".into());
            let pushed = e.args.len();
            ctx.locals.extend(e.args.iter().map(|a| a.name.name.clone()));
            parts.push(operand(&e.body, ctx));
            let keep = ctx.locals.len() - pushed;
            ctx.locals.truncate(keep);
            Emitted::combine(parts, span)
        }
        // Converters and behaviors do not change what the expression reads.
        Expr::ValueConverter(e) => Emitted::combine(vec![emit_expr(&e.expression, ctx).into()], span),
        Expr::BindingBehavior(e) => Emitted::combine(vec![emit_expr(&e.expression, ctx).into()], span),
        Expr::PrimitiveLiteral(lit) => {
            let text = match &lit.value {
                LiteralValue::String(s) => quote_string(s),
                LiteralValue::Number(n) => format_number(*n),
                LiteralValue::Boolean(b) => b.to_string(),
                LiteralValue::Null => "null".to_string(),
                LiteralValue::Undefined => "undefined".to_string(),
            };
            Emitted::combine(vec![Part::Text(text)], span)
        }
        Expr::ArrayLiteral(e) => {
            let mut parts = vec![Part::from("[")];
            for (i, element) in e.elements.iter().enumerate() {
                if i > 0 {
                    parts.push(", ".into());
                }
                parts.push(emit_expr(element, ctx).into());
            }
            parts.push("]".into());
            Emitted::combine(parts, span)
        }
        Expr::ObjectLiteral(e) => {
            let mut parts = vec![Part::from("{ ")];
            for (i, (key, value)) in e.keys.iter().zip(&e.values).enumerate() {
                if i > 0 {
                    parts.push(", ".into());
                }
                let key_text = if key.quoted { quote_string(&key.name) } else { key.name.clone() };
                parts.push(Part::Text(format!("{key_text}: ")));
                parts.push(emit_expr(value, ctx).into());
            }
            parts.push(" }".into());
            Emitted::combine(parts, span)
        }
        Expr::Template(e) => Emitted::combine(template_parts(&e.cooked, &e.expressions, ctx), span),
        Expr::TaggedTemplate(e) => {
            let mut parts = vec![operand(&e.func, ctx)];
            parts.extend(template_parts(&e.cooked, &e.expressions, ctx));
            Emitted::combine(parts, span)
        }
        Expr::Interpolation(e) => Emitted::combine(template_parts(&e.parts, &e.expressions, ctx), span),
        Expr::Paren(e) => Emitted::combine(vec!["(".into(), emit_expr(&e.expression, ctx).into(), ")".into()], span),
        Expr::ForOfStatement(e) => Emitted::combine(vec![emit_expr(&e.iterable, ctx).into()], span),
        Expr::BindingIdentifier(e) => Emitted::combine(
            vec![Part::Segment {
                text: e.name.name.clone(),
                path: e.name.name.clone(),
                source: e.name.span,
            }],
            span,
        ),
        Expr::ArrayBindingPattern(e) => {
            let mut parts = vec![Part::from("[")];
            for (i, element) in e.elements.iter().enumerate() {
                if i > 0 {
                    parts.push(", ".into());
                }
                parts.push(emit_expr(element, ctx).into());
            }
            if let Some(rest) = &e.rest {
                if !e.elements.is_empty() {
                    parts.push(", ".into());
                }
                parts.push("...".into());
                parts.push(emit_expr(rest, ctx).into());
            }
            parts.push("]".into());
            Emitted::combine(parts, span)
        }
        Expr::ObjectBindingPattern(e) => {
            let mut parts = vec![Part::from("{ ")];
            for (i, property) in e.properties.iter().enumerate() {
                if i > 0 {
                    parts.push(", ".into());
                }
                parts.push(Part::Text(format!("{}: ", property.key)));
                parts.push(emit_expr(&property.value, ctx).into());
            }
            if let Some(rest) = &e.rest {
                if !e.properties.is_empty() {
                    parts.push(", ".into());
                }
                parts.push("...".into());
                parts.push(emit_expr(rest, ctx).into());
            }
            parts.push(" }".into());
            Emitted::combine(parts, span)
        }
        Expr::BindingPatternDefault(e) => Emitted::combine(
            vec![emit_expr(&e.target, ctx).into(), " = ".into(), operand(&e.default, ctx)],
            span,
        ),
        Expr::BindingPatternHole(_) => Emitted::combine(Vec::new(), span),
        Expr::BadExpression(e) => Emitted::combine(vec![Part::Text(bad_expression_placeholder(e.span))], span),
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
