//! Expression Table
//!
//! Single owner of every parsed expression AST in a module. Everything else holds
//! an `ExprId`.

use serde::{Deserialize, Serialize};

use super::handle::ExprId;
use crate::expression_parser::{Expr, ExpressionType};
use crate::parse_util::SourceSpan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprTableEntry {
    pub id: ExprId,
    pub ast: Expr,
    pub expression_type: ExpressionType,
    /// Absolute span of the authored expression text in the template.
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExprTable {
    entries: Vec<ExprTableEntry>,
}

impl ExprTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ast: Expr, expression_type: ExpressionType, span: SourceSpan) -> ExprId {
        let id = ExprId(self.entries.len() as u32);
        self.entries.push(ExprTableEntry {
            id,
            ast,
            expression_type,
            span,
        });
        id
    }

    pub fn get(&self, id: ExprId) -> Option<&ExprTableEntry> {
        self.entries.get(id.as_usize())
    }

    pub fn ast(&self, id: ExprId) -> Option<&Expr> {
        self.get(id).map(|e| &e.ast)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExprTableEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(ExprId, span)` pairs, in allocation order.
    pub fn spans(&self) -> Vec<(ExprId, SourceSpan)> {
        self.entries.iter().map(|e| (e.id, e.span)).collect()
    }

    /// Innermost expression whose span touches `offset`.
    pub fn expr_at(&self, offset: usize) -> Option<&ExprTableEntry> {
        self.entries
            .iter()
            .filter(|e| e.span.touches(offset))
            .min_by_key(|e| e.span.len())
    }
}
