//! Typing strategies, one per frame pattern.

use crate::expression_parser::Expr;
use crate::schema::{AliasSource, FramePattern};
use crate::template::ir::{ExprTable, FrameId};
use crate::template::scope::{FrameOrigin, ScopeFrame};

use super::expr_types::{member, ExprTyper};
use super::{FrameHints, UNKNOWN};

pub struct TypingContext<'a> {
    pub frame: &'a ScopeFrame,
    pub origin: &'a FrameOrigin,
    pub exprs: &'a ExprTable,
    pub(crate) typer: &'a ExprTyper<'a>,
}

impl<'a> TypingContext<'a> {
    /// Type of `expr` read in the parent frame.
    fn parent_type(&self, expr: &Expr) -> String {
        self.typer.type_of(expr, self.frame.parent.unwrap_or(FrameId::ROOT))
    }
}

pub trait TypingStrategy: Sync {
    fn hints(&self, ctx: &TypingContext<'_>) -> FrameHints;
}

struct IteratorTyping;
struct ValueOverlayTyping;
struct PromiseValueTyping;
struct PromiseBranchTyping;
struct PlainTyping;

static ITERATOR: IteratorTyping = IteratorTyping;
static VALUE_OVERLAY: ValueOverlayTyping = ValueOverlayTyping;
static PROMISE_VALUE: PromiseValueTyping = PromiseValueTyping;
static PROMISE_BRANCH: PromiseBranchTyping = PromiseBranchTyping;
static PLAIN: PlainTyping = PlainTyping;

pub fn strategy_for(pattern: FramePattern) -> &'static dyn TypingStrategy {
    match pattern {
        FramePattern::Iterator => &ITERATOR,
        FramePattern::ValueOverlay => &VALUE_OVERLAY,
        FramePattern::PromiseValue => &PROMISE_VALUE,
        FramePattern::PromiseBranch => &PROMISE_BRANCH,
        FramePattern::Plain => &PLAIN,
    }
}

/// Contextuals carry their own types; nothing else is projected.
impl TypingStrategy for PlainTyping {
    fn hints(&self, _ctx: &TypingContext<'_>) -> FrameHints {
        FrameHints::default()
    }
}

impl TypingStrategy for IteratorTyping {
    fn hints(&self, ctx: &TypingContext<'_>) -> FrameHints {
        let mut hints = FrameHints::default();
        let FrameOrigin::Iterator { for_of, .. } = ctx.origin else {
            return hints;
        };
        let Some(Expr::ForOfStatement(header)) = ctx.exprs.ast(*for_of) else {
            return hints;
        };
        let iterable = ctx.parent_type(&header.iterable);
        let element = if iterable == UNKNOWN {
            UNKNOWN.to_string()
        } else {
            format!("CollectionElement<{iterable}>")
        };
        project_pattern(&header.declaration, &element, &mut hints.locals);
        hints.iterable = Some(iterable);
        hints.element = Some(element);
        hints
    }
}

/// Assign types to the names of a destructuring target of type `ty`.
pub(crate) fn project_pattern(target: &Expr, ty: &str, out: &mut Vec<(String, String)>) {
    let unknown = ty == UNKNOWN;
    match target {
        Expr::BindingIdentifier(b) => out.push((b.name.name.clone(), ty.to_string())),
        Expr::BindingPatternDefault(d) => project_pattern(&d.target, ty, out),
        Expr::ArrayBindingPattern(p) => {
            for (index, element) in p.elements.iter().enumerate() {
                let element_ty = if unknown {
                    UNKNOWN.to_string()
                } else {
                    format!("TupleElement<{ty}, {index}>")
                };
                project_pattern(element, &element_ty, out);
            }
            if let Some(rest) = &p.rest {
                let rest_ty = if unknown {
                    UNKNOWN.to_string()
                } else {
                    format!("TupleElement<{ty}, number>[]")
                };
                project_pattern(rest, &rest_ty, out);
            }
        }
        Expr::ObjectBindingPattern(p) => {
            for property in &p.properties {
                project_pattern(&property.value, &member(ty, &property.key), out);
            }
            if let Some(rest) = &p.rest {
                let rest_ty = if unknown {
                    UNKNOWN.to_string()
                } else {
                    let keys: Vec<String> = p.properties.iter().map(|k| format!("'{}'", k.key)).collect();
                    if keys.is_empty() {
                        ty.to_string()
                    } else {
                        format!("Omit<{ty}, {}>", keys.join(" | "))
                    }
                };
                project_pattern(rest, &rest_ty, out);
            }
        }
        _ => {}
    }
}

impl TypingStrategy for ValueOverlayTyping {
    fn hints(&self, ctx: &TypingContext<'_>) -> FrameHints {
        let value = match ctx.origin {
            FrameOrigin::ValueOverlay { value: Some(value), .. } => ctx.exprs.ast(*value),
            _ => None,
        };
        FrameHints {
            overlay: Some(value.map_or_else(|| UNKNOWN.to_string(), |v| ctx.parent_type(v))),
            ..Default::default()
        }
    }
}

impl TypingStrategy for PromiseValueTyping {
    fn hints(&self, ctx: &TypingContext<'_>) -> FrameHints {
        let value = match ctx.origin {
            FrameOrigin::PromiseValue { value: Some(value), .. } => ctx.exprs.ast(*value),
            _ => None,
        };
        FrameHints {
            promise: Some(value.map_or_else(|| UNKNOWN.to_string(), |v| ctx.parent_type(v))),
            ..Default::default()
        }
    }
}

impl TypingStrategy for PromiseBranchTyping {
    fn hints(&self, ctx: &TypingContext<'_>) -> FrameHints {
        let mut hints = FrameHints::default();
        let FrameOrigin::PromiseBranch { source, promise, .. } = ctx.origin else {
            return hints;
        };
        let alias = ctx.frame.symbols.iter().find(|s| s.alias_kind.is_some());
        let ty = match source {
            AliasSource::Fulfilled => {
                // The promise value is read in the promise frame's parent.
                let promise_ty = promise
                    .and_then(|p| ctx.exprs.ast(p).map(|ast| (p, ast)))
                    .map(|(id, ast)| {
                        let at = ctx.typer.scope.frame_of(id);
                        ctx.typer.type_of(ast, at)
                    })
                    .unwrap_or_else(|| UNKNOWN.to_string());
                if promise_ty == UNKNOWN {
                    UNKNOWN.to_string()
                } else {
                    format!("Awaited<{promise_ty}>")
                }
            }
            AliasSource::Rejected => "any".to_string(),
        };
        if let Some(alias) = alias {
            hints.locals.push((alias.name.clone(), ty.clone()));
        }
        hints.alias = Some(ty);
        hints
    }
}
