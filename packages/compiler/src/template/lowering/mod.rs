//! Lowering
//!
//! Markup + embedded expressions → `IrModule`. Attributes are split into
//! controller, custom-attribute, binding, interpolated and static groups;
//! `<let>` and meta-elements are special-cased. Every parsed expression gets one
//! entry in the expression table with absolute spans.

pub mod attribute_syntax;
mod element;
mod let_element;
mod meta;

use crate::diagnostics::{CompilerDiagnostic, DiagnosticCode, Stage};
use crate::expression_parser::{map_spans, Expr, ExpressionType, Parser};
use crate::ml_parser::{HtmlParser, Node};
use crate::parse_util::{OffsetMap, SourceSpan};
use crate::schema::SemanticsLookup;
use crate::template::ir::{
    ExprId, ExprTable, IrModule, IrTemplate, NodeIdAllocator, Row, TemplateMeta, TemplateNode, IR_VERSION,
};

pub use attribute_syntax::{parse_attribute_name, AttrSyntax};
pub(crate) use element::META_ELEMENTS;

#[derive(Debug, Clone)]
pub struct LowerOptions {
    /// Name of the root template (usually the component name).
    pub name: String,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            name: "template".to_string(),
        }
    }
}

pub fn lower_document(html: &str, options: &LowerOptions, lookup: &SemanticsLookup) -> IrModule {
    let parsed = HtmlParser::new().parse(html);
    let mut lowerer = Lowerer::new(lookup);
    for error in &parsed.errors {
        lowerer
            .diagnostics
            .push(CompilerDiagnostic::from_parse_error(DiagnosticCode::HtmlParseError, Stage::Lower, error));
    }

    let mut rows = Vec::new();
    let root_id = lowerer.ids.alloc();
    let nodes = lowerer.unwrap_root_template(&parsed.root_nodes);
    let children = lowerer.lower_children(nodes, &mut rows);

    let module = IrModule {
        version: IR_VERSION.to_string(),
        name: options.name.clone(),
        root: IrTemplate {
            name: options.name.clone(),
            dom: TemplateNode {
                id: root_id,
                attrs: Vec::new(),
                children,
                span: Some(SourceSpan::new(0, html.len())),
            },
            rows,
        },
        expr_table: lowerer.exprs,
        meta: lowerer.meta,
        diagnostics: lowerer.diagnostics,
    };
    tracing::debug!(
        template = %module.name,
        nodes = lowerer.ids.allocated(),
        exprs = module.expr_table.len(),
        diagnostics = module.diagnostics.len(),
        "lowered template"
    );
    module
}

/// Parse a single expression whose text starts at `base_span.start` in some document.
pub fn parse_expression_at(text: &str, expression_type: ExpressionType, base_span: SourceSpan) -> Expr {
    Parser::new().parse(text, expression_type, base_span.start)
}

pub(crate) struct Lowerer<'a> {
    pub(crate) lookup: &'a SemanticsLookup,
    pub(crate) parser: Parser,
    pub(crate) ids: NodeIdAllocator,
    pub(crate) exprs: ExprTable,
    pub(crate) meta: TemplateMeta,
    pub(crate) diagnostics: Vec<CompilerDiagnostic>,
}

impl<'a> Lowerer<'a> {
    fn new(lookup: &'a SemanticsLookup) -> Self {
        Lowerer {
            lookup,
            parser: Parser::new(),
            ids: NodeIdAllocator::default(),
            exprs: ExprTable::new(),
            meta: TemplateMeta::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Parse and register an expression whose decoded offsets map to the source
    /// through `at`. Parse failures are recorded as diagnostics and the
    /// `BadExpression` is still registered.
    pub(crate) fn add_expr(&mut self, text: &str, expression_type: ExpressionType, at: &OffsetMap) -> ExprId {
        let result = if at.is_verbatim() {
            self.parser.parse_with_errors(text, expression_type, at.source(0))
        } else {
            let mut result = self.parser.parse_with_errors(text, expression_type, 0);
            let remap = |span: SourceSpan| at.span(span.start, span.end);
            map_spans(&mut result.ast, &remap);
            for error in &mut result.errors {
                error.span = remap(error.span);
            }
            result
        };
        for error in &result.errors {
            self.diagnostics.push(CompilerDiagnostic::from_parse_error(
                DiagnosticCode::ExpressionParseError,
                Stage::Lower,
                error,
            ));
        }
        self.exprs.add(result.ast, expression_type, at.span(0, text.len()))
    }

    /// Register an interpolation if `text` contains one.
    pub(crate) fn add_interpolation(&mut self, text: &str, at: &OffsetMap) -> Option<ExprId> {
        crate::expression_parser::split_interpolation(text)?;
        Some(self.add_expr(text, ExpressionType::Interpolation, at))
    }

    /// A lone root `<template>` wraps the component view; its children become the root.
    fn unwrap_root_template<'n>(&mut self, nodes: &'n [Node]) -> &'n [Node] {
        let mut elements = nodes.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        });
        let (Some(only), None) = (elements.next(), elements.next()) else {
            return nodes;
        };
        let stray_text = nodes.iter().any(|n| matches!(n, Node::Text(t) if !t.value.trim().is_empty()));
        let has_controller = only
            .attrs
            .iter()
            .any(|a| self.is_controller_attr(&parse_attribute_name(&a.name)));
        if only.name != "template" || stray_text || has_controller {
            return nodes;
        }
        self.fold_root_template_attrs(only);
        &only.children
    }

    pub(crate) fn lower_children(&mut self, nodes: &[Node], rows: &mut Vec<Row>) -> Vec<crate::template::ir::DomNode> {
        let mut out = Vec::new();
        for node in nodes {
            if let Some(lowered) = self.lower_node(node, rows) {
                out.push(lowered);
            }
        }
        out
    }
}
