//! Scope Binding
//!
//! Builds the tree of lexical frames introduced by overlay controllers and maps
//! every expression to the frame it is evaluated in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expression_parser::{binding_target_names, Expr, Identifier};
use crate::parse_util::SourceSpan;
use crate::schema::{AliasSource, FramePattern};
use crate::template::ir::{ExprId, ExprTable, FrameId, NodeId, TailValue};
use crate::template::linking::{LinkedHydrateTemplateController, LinkedInstruction, LinkedModule, LinkedTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    Root,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    IteratorLocal,
    Contextual,
    Alias,
    Let,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSymbol {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_kind: Option<AliasSource>,
    /// Declared type of a contextual (`$index: number`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<String>,
    /// `<let>` value expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl ScopeSymbol {
    fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        ScopeSymbol {
            name: name.into(),
            kind,
            alias_kind: None,
            type_expr: None,
            expr: None,
            span: None,
        }
    }
}

/// Why a frame exists. Drives type analysis; the controller name is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FrameOrigin {
    #[serde(rename_all = "camelCase")]
    Iterator { controller: String, for_of: ExprId },
    #[serde(rename_all = "camelCase")]
    ValueOverlay { controller: String, value: Option<ExprId> },
    #[serde(rename_all = "camelCase")]
    PromiseValue { controller: String, value: Option<ExprId> },
    #[serde(rename_all = "camelCase")]
    PromiseBranch {
        controller: String,
        source: AliasSource,
        /// Value of the enclosing promise frame.
        promise: Option<ExprId>,
    },
    #[serde(rename_all = "camelCase")]
    Plain { controller: String },
}

impl FrameOrigin {
    pub fn pattern(&self) -> FramePattern {
        match self {
            FrameOrigin::Iterator { .. } => FramePattern::Iterator,
            FrameOrigin::ValueOverlay { .. } => FramePattern::ValueOverlay,
            FrameOrigin::PromiseValue { .. } => FramePattern::PromiseValue,
            FrameOrigin::PromiseBranch { .. } => FramePattern::PromiseBranch,
            FrameOrigin::Plain { .. } => FramePattern::Plain,
        }
    }

    pub fn controller(&self) -> &str {
        match self {
            FrameOrigin::Iterator { controller, .. }
            | FrameOrigin::ValueOverlay { controller, .. }
            | FrameOrigin::PromiseValue { controller, .. }
            | FrameOrigin::PromiseBranch { controller, .. }
            | FrameOrigin::Plain { controller } => controller,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFrame {
    pub id: FrameId,
    pub parent: Option<FrameId>,
    pub kind: FrameKind,
    pub symbols: Vec<ScopeSymbol>,
    pub origin: Option<FrameOrigin>,
    /// Value whose members become the scope (`with.bind="user"`).
    pub overlay: Option<ExprId>,
}

impl ScopeFrame {
    pub fn symbol(&self, name: &str) -> Option<&ScopeSymbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Later declarations of the same name replace earlier ones.
    fn declare(&mut self, symbol: ScopeSymbol) {
        match self.symbols.iter_mut().find(|s| s.name == symbol.name) {
            Some(existing) => *existing = symbol,
            None => self.symbols.push(symbol),
        }
    }

    /// Frames that capture every non-local identifier.
    pub fn is_value_overlay(&self) -> bool {
        matches!(self.origin, Some(FrameOrigin::ValueOverlay { .. }))
    }
}

/// Where an identifier read in some frame resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    Local {
        frame: FrameId,
        #[serde(rename = "symbolKind")]
        kind: SymbolKind,
    },
    Overlay { frame: FrameId },
    Vm,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeModule {
    pub frames: Vec<ScopeFrame>,
    pub expr_to_frame: IndexMap<ExprId, FrameId>,
    pub node_to_frame: IndexMap<NodeId, FrameId>,
}

impl ScopeModule {
    pub fn frame(&self, id: FrameId) -> Option<&ScopeFrame> {
        self.frames.get(id.as_usize())
    }

    pub fn frame_of(&self, expr: ExprId) -> FrameId {
        self.expr_to_frame.get(&expr).copied().unwrap_or(FrameId::ROOT)
    }

    /// Frames from `id` up to the root, `id` first.
    pub fn chain(&self, id: FrameId) -> Vec<&ScopeFrame> {
        let mut out = Vec::new();
        let mut current = self.frame(id);
        while let Some(frame) = current {
            out.push(frame);
            current = frame.parent.and_then(|p| self.frame(p));
        }
        out
    }

    /// Own symbols, then the overlay value (which stops resolution), then parents.
    pub fn resolve(&self, frame: FrameId, name: &str) -> Resolution {
        for frame in self.chain(frame) {
            if let Some(symbol) = frame.symbol(name) {
                return Resolution::Local {
                    frame: frame.id,
                    kind: symbol.kind,
                };
            }
            if frame.is_value_overlay() {
                return Resolution::Overlay { frame: frame.id };
            }
        }
        Resolution::Vm
    }

    /// Scope reached by `$parent` repeated `hops` times; `None` past the root.
    pub fn ancestor(&self, frame: FrameId, hops: u32) -> Option<FrameId> {
        let mut current = frame;
        for _ in 0..hops {
            current = self.frame(current)?.parent?;
        }
        Some(current)
    }
}

pub fn bind_scopes(linked: &LinkedModule, exprs: &ExprTable) -> ScopeModule {
    let mut binder = ScopeBinder {
        exprs,
        module: ScopeModule::default(),
    };
    binder.module.frames.push(ScopeFrame {
        id: FrameId::ROOT,
        parent: None,
        kind: FrameKind::Root,
        symbols: Vec::new(),
        origin: None,
        overlay: None,
    });
    binder.bind_template(&linked.root, FrameId::ROOT);
    tracing::debug!(
        template = %linked.name,
        frames = binder.module.frames.len(),
        exprs = binder.module.expr_to_frame.len(),
        "bound scopes"
    );
    binder.module
}

struct ScopeBinder<'a> {
    exprs: &'a ExprTable,
    module: ScopeModule,
}

impl<'a> ScopeBinder<'a> {
    fn map(&mut self, ids: impl IntoIterator<Item = ExprId>, frame: FrameId) {
        for id in ids {
            self.module.expr_to_frame.entry(id).or_insert(frame);
        }
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut ScopeFrame {
        &mut self.module.frames[id.as_usize()]
    }

    fn bind_template(&mut self, template: &LinkedTemplate, frame: FrameId) {
        self.module.node_to_frame.insert(template.dom.id, frame);
        let mut nodes = Vec::new();
        template.dom.walk(&mut |node| nodes.push(node.id()));
        for id in nodes {
            self.module.node_to_frame.insert(id, frame);
        }

        for row in &template.rows {
            for instruction in &row.instructions {
                match instruction {
                    LinkedInstruction::HydrateTemplateController(c) => self.bind_controller(c, frame),
                    LinkedInstruction::HydrateLetElement(l) => {
                        for binding in &l.bindings {
                            self.map([binding.from], frame);
                            let mut symbol = ScopeSymbol::new(binding.to.clone(), SymbolKind::Let);
                            symbol.expr = Some(binding.from);
                            symbol.span = Some(binding.loc.target_span);
                            self.frame_mut(frame).declare(symbol);
                        }
                    }
                    other => self.map(other.exprs(), frame),
                }
            }
        }
    }

    fn bind_controller(&mut self, c: &LinkedHydrateTemplateController, outer: FrameId) {
        let Some(pattern) = c.res.frame_pattern() else {
            self.map(c.props.iter().flat_map(|p| p.exprs()), outer);
            self.bind_template(&c.def, outer);
            return;
        };

        let value = c.props.iter().find_map(|p| match p {
            LinkedInstruction::PropertyBinding(b) => Some(b.ir.from),
            LinkedInstruction::Interpolation(i) => Some(i.ir.from),
            _ => None,
        });
        let header = c.props.iter().find_map(|p| match p {
            LinkedInstruction::IteratorBinding(b) => Some(b),
            _ => None,
        });

        let controller = c.name.clone();
        let origin = match pattern {
            FramePattern::Iterator => header.map(|h| FrameOrigin::Iterator {
                controller,
                for_of: h.from,
            }),
            FramePattern::ValueOverlay => Some(FrameOrigin::ValueOverlay { controller, value }),
            FramePattern::PromiseValue => Some(FrameOrigin::PromiseValue { controller, value }),
            FramePattern::PromiseBranch => c.res.alias_source().map(|source| FrameOrigin::PromiseBranch {
                controller,
                source,
                promise: self.enclosing_promise(outer),
            }),
            FramePattern::Plain => Some(FrameOrigin::Plain { controller }),
        };

        let id = FrameId::new(self.module.frames.len() as u32);
        let mut frame = ScopeFrame {
            id,
            parent: Some(outer),
            kind: FrameKind::Overlay,
            symbols: Vec::new(),
            overlay: match origin {
                Some(FrameOrigin::ValueOverlay { value, .. }) => value,
                _ => None,
            },
            origin,
        };

        // Controller values, the iterable included, are evaluated outside the
        // frame they open; only iterator options see the new locals.
        for prop in &c.props {
            match prop {
                LinkedInstruction::IteratorBinding(b) => {
                    self.map([b.from], outer);
                    for tail in &b.tail {
                        if let TailValue::Expr(e) = tail.value {
                            self.module.expr_to_frame.entry(e).or_insert(id);
                        }
                    }
                    if let Some(Expr::ForOfStatement(for_of)) = self.exprs.ast(b.from) {
                        for name in binding_target_names(&for_of.declaration) {
                            frame.declare(local(name, SymbolKind::IteratorLocal));
                        }
                    }
                }
                other => self.map(other.exprs(), outer),
            }
        }
        for contextual in c.res.contextuals() {
            let mut symbol = ScopeSymbol::new(contextual.name.clone(), SymbolKind::Contextual);
            symbol.type_expr = Some(contextual.type_expr.clone());
            frame.declare(symbol);
        }
        if let (Some(alias), Some(source)) = (&c.alias, c.res.alias_source()) {
            let mut symbol = local(alias.clone(), SymbolKind::Alias);
            symbol.alias_kind = Some(source);
            frame.declare(symbol);
        }

        tracing::trace!(frame = %id, controller = %c.name, symbols = frame.symbols.len(), "opened frame");
        self.module.frames.push(frame);
        self.bind_template(&c.def, id);
    }

    fn enclosing_promise(&self, from: FrameId) -> Option<ExprId> {
        self.module.chain(from).into_iter().find_map(|f| match &f.origin {
            Some(FrameOrigin::PromiseValue { value, .. }) => *value,
            _ => None,
        })
    }
}

fn local(name: Identifier, kind: SymbolKind) -> ScopeSymbol {
    let mut symbol = ScopeSymbol::new(name.name, kind);
    symbol.span = Some(name.span);
    symbol
}
