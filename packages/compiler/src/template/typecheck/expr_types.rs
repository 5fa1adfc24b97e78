//! Structural type expressions for template expressions.
//!
//! Produces TypeScript type text, never a checked type; anything it cannot
//! describe is the `unknown` sentinel.

use crate::expression_parser::{Expr, LiteralValue};
use crate::template::ir::FrameId;
use crate::template::scope::{Resolution, ScopeModule};

use super::{FrameEnv, UNKNOWN};
use indexmap::IndexMap;

pub(crate) fn member(base: &str, name: &str) -> String {
    if base == UNKNOWN {
        return UNKNOWN.to_string();
    }
    format!("({base})['{name}']")
}

pub(crate) fn union(a: &str, b: &str) -> String {
    if a == b {
        return a.to_string();
    }
    if a == UNKNOWN || b == UNKNOWN {
        return UNKNOWN.to_string();
    }
    format!("({a}) | ({b})")
}

/// Types expressions read in a frame, using the environments computed so far.
pub(crate) struct ExprTyper<'a> {
    pub scope: &'a ScopeModule,
    pub envs: &'a IndexMap<FrameId, FrameEnv>,
    pub vm: &'a str,
}

impl<'a> ExprTyper<'a> {
    fn scope_type(&self, frame: FrameId, name: &str) -> String {
        match self.scope.resolve(frame, name) {
            Resolution::Local { frame, .. } => self
                .envs
                .get(&frame)
                .and_then(|env| env.locals.get(name))
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            Resolution::Overlay { frame } => {
                let base = self
                    .envs
                    .get(&frame)
                    .and_then(|env| env.overlay.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                member(&base, name)
            }
            Resolution::Vm => member(self.vm, name),
        }
    }

    fn frame_self_type(&self, frame: FrameId) -> String {
        match self.envs.get(&frame).and_then(|env| env.overlay.clone()) {
            Some(overlay) => overlay,
            None if frame == FrameId::ROOT => self.vm.to_string(),
            None => UNKNOWN.to_string(),
        }
    }

    pub fn type_of(&self, expr: &Expr, frame: FrameId) -> String {
        match expr {
            Expr::AccessScope(e) => match self.scope.ancestor(frame, e.ancestor) {
                Some(target) => self.scope_type(target, &e.name.name),
                None => UNKNOWN.to_string(),
            },
            Expr::AccessThis(e) => match self.scope.ancestor(frame, e.ancestor) {
                Some(target) => self.frame_self_type(target),
                None => UNKNOWN.to_string(),
            },
            Expr::AccessBoundary(_) => self.vm.to_string(),
            Expr::AccessGlobal(e) => format!("typeof globalThis['{}']", e.name.name),
            Expr::AccessMember(e) => {
                let object = self.type_of(&e.object, frame);
                if e.optional && object != UNKNOWN {
                    format!("NonNullable<{object}>['{}'] | undefined", e.name.name)
                } else {
                    member(&object, &e.name.name)
                }
            }
            Expr::AccessKeyed(e) => {
                let object = self.type_of(&e.object, frame);
                if object == UNKNOWN {
                    return object;
                }
                match &*e.key {
                    Expr::PrimitiveLiteral(lit) => match &lit.value {
                        LiteralValue::String(key) => member(&object, key),
                        LiteralValue::Number(_) => format!("({object})[number]"),
                        _ => UNKNOWN.to_string(),
                    },
                    _ => UNKNOWN.to_string(),
                }
            }
            Expr::CallScope(e) => {
                let callee = match self.scope.ancestor(frame, e.ancestor) {
                    Some(target) => self.scope_type(target, &e.name.name),
                    None => UNKNOWN.to_string(),
                };
                return_type(&callee)
            }
            Expr::CallMember(e) => {
                let object = self.type_of(&e.object, frame);
                return_type(&member(&object, &e.name.name))
            }
            Expr::CallFunction(e) => return_type(&self.type_of(&e.func, frame)),
            Expr::PrimitiveLiteral(lit) => match &lit.value {
                LiteralValue::String(_) => "string",
                LiteralValue::Number(_) => "number",
                LiteralValue::Boolean(_) => "boolean",
                LiteralValue::Null => "null",
                LiteralValue::Undefined => "undefined",
            }
            .to_string(),
            Expr::Template(_) => "string".to_string(),
            Expr::Interpolation(_) => "string".to_string(),
            Expr::Paren(e) => self.type_of(&e.expression, frame),
            Expr::BindingBehavior(e) => self.type_of(&e.expression, frame),
            Expr::Unary(e) => match e.operation.as_str() {
                "!" => "boolean".to_string(),
                "-" | "+" | "--" | "++" => "number".to_string(),
                "typeof" => "string".to_string(),
                "void" => "undefined".to_string(),
                _ => UNKNOWN.to_string(),
            },
            Expr::Binary(e) => match e.operation.as_str() {
                "&&" | "||" | "??" => union(&self.type_of(&e.left, frame), &self.type_of(&e.right, frame)),
                "==" | "===" | "!=" | "!==" | "<" | ">" | "<=" | ">=" | "in" | "instanceof" => {
                    "boolean".to_string()
                }
                "-" | "*" | "/" | "%" | "**" => "number".to_string(),
                "+" => {
                    let left = self.type_of(&e.left, frame);
                    let right = self.type_of(&e.right, frame);
                    if left == "string" || right == "string" {
                        "string".to_string()
                    } else if left == "number" && right == "number" {
                        "number".to_string()
                    } else {
                        UNKNOWN.to_string()
                    }
                }
                _ => UNKNOWN.to_string(),
            },
            Expr::Conditional(e) => union(&self.type_of(&e.yes, frame), &self.type_of(&e.no, frame)),
            Expr::Assign(e) => self.type_of(&e.value, frame),
            Expr::ArrayLiteral(e) => {
                let mut element: Option<String> = None;
                for item in &e.elements {
                    let ty = self.type_of(item, frame);
                    element = Some(match element {
                        Some(prev) => union(&prev, &ty),
                        None => ty,
                    });
                }
                match element {
                    Some(ty) if ty != UNKNOWN => format!("({ty})[]"),
                    _ => "unknown[]".to_string(),
                }
            }
            _ => UNKNOWN.to_string(),
        }
    }
}

fn return_type(callee: &str) -> String {
    if callee == UNKNOWN {
        return UNKNOWN.to_string();
    }
    format!("ReturnType<{callee}>")
}
