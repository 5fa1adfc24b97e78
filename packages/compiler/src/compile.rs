//! Compile Facade
//!
//! Runs the full pipeline for one template: lowering, linking, scope binding,
//! type analysis and overlay synthesis, then assembles the artifacts tooling
//! consumes. AOT and SSR outputs have their own entry points since most callers
//! need only one of them.

use std::path::Path;

use serde::Serialize;

use crate::diagnostics::{summarize_degradation, CompilerDiagnostic, DegradationSummary, DiagnosticCode, Stage};
use crate::error::{CompilerError, Result};
use crate::parse_util::SourceSpan;
use crate::schema::{ProjectSemantics, SemanticsLookup};
use crate::template::aot::{emit_aot, plan_aot, AotEmitResult, AotOptions, AotPlanModule};
use crate::template::ir::{ExprId, ExprTable, IrModule, TemplateMeta};
use crate::template::linking::{link_module, LinkOptions, LinkedModule};
use crate::template::lowering::{lower_document, LowerOptions};
use crate::template::overlay::{emit_overlay, plan_overlay, OverlayEmitResult, OverlayMapping, OverlayOptions, OverlayPlanModule};
use crate::template::query::TemplateQuery;
use crate::template::scope::{bind_scopes, ScopeModule};
use crate::template::ssr::{render_ssr, SsrOptions, SsrResult};
use crate::template::typecheck::{analyze_frames, FrameAnalysis};
use crate::template::usage::{collect_usage, TemplateUsage};
use crate::vm::{effective_vm_type, VmReflection};

/// Resolves `<import from="...">` specifiers relative to the template file.
pub trait ModuleResolver: Sync {
    fn resolve(&self, specifier: &str, containing_file: &str) -> Option<String>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str, &str) -> Option<String> + Sync,
{
    fn resolve(&self, specifier: &str, containing_file: &str) -> Option<String> {
        self(specifier, containing_file)
    }
}

pub struct CompileOptions<'a> {
    pub html: &'a str,
    pub template_file_path: &'a str,
    pub is_js: bool,
    pub vm: &'a dyn VmReflection,
    /// Project snapshot; resolved against `resource_scope` when set.
    pub project: Option<&'a ProjectSemantics>,
    pub resource_scope: Option<&'a str>,
    /// Pre-built lookup, used instead of `project` when both are given.
    pub semantics: Option<&'a SemanticsLookup>,
    pub module_resolver: Option<&'a dyn ModuleResolver>,
    pub overlay_base_name: Option<&'a str>,
    pub link: LinkOptions,
}

impl<'a> CompileOptions<'a> {
    pub fn new(html: &'a str, template_file_path: &'a str, vm: &'a dyn VmReflection) -> Self {
        CompileOptions {
            html,
            template_file_path,
            is_js: false,
            vm,
            project: None,
            resource_scope: None,
            semantics: None,
            module_resolver: None,
            overlay_base_name: None,
            link: LinkOptions::default(),
        }
    }

    pub fn with_project(mut self, project: &'a ProjectSemantics, scope: Option<&'a str>) -> Self {
        self.project = Some(project);
        self.resource_scope = scope;
        self
    }

    pub fn with_semantics(mut self, semantics: &'a SemanticsLookup) -> Self {
        self.semantics = Some(semantics);
        self
    }

    pub fn with_module_resolver(mut self, resolver: &'a dyn ModuleResolver) -> Self {
        self.module_resolver = Some(resolver);
        self
    }

    /// Emit a JSDoc-typed `.js` overlay.
    pub fn with_js(mut self, is_js: bool) -> Self {
        self.is_js = is_js;
        self
    }

    /// Overlay file stem, overriding the one derived from the template path.
    pub fn with_overlay_base_name(mut self, base: &'a str) -> Self {
        self.overlay_base_name = Some(base);
        self
    }

    fn lookup(&self) -> Result<std::borrow::Cow<'a, SemanticsLookup>> {
        if let Some(semantics) = self.semantics {
            return Ok(std::borrow::Cow::Borrowed(semantics));
        }
        let project = self.project.ok_or(CompilerError::MissingSemantics)?;
        Ok(std::borrow::Cow::Owned(SemanticsLookup::new(project, self.resource_scope)?))
    }

    /// Template name: the file stem (`my-app.html` → `my-app`).
    fn template_name(&self) -> String {
        Path::new(self.template_file_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("template")
            .to_string()
    }

    fn overlay_base(&self) -> String {
        if let Some(base) = self.overlay_base_name {
            return base.to_string();
        }
        let path = Path::new(self.template_file_path);
        path.with_extension("").to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCompilation {
    pub ir: IrModule,
    pub linked: LinkedModule,
    pub scope: ScopeModule,
    pub typecheck: FrameAnalysis,
    pub usage: TemplateUsage,
    pub overlay_plan: OverlayPlanModule,
    pub overlay: OverlayEmitResult,
    pub mapping: OverlayMapping,
    pub query: TemplateQuery,
    pub expr_table: ExprTable,
    pub expr_spans: Vec<(ExprId, SourceSpan)>,
    pub diagnostics: Vec<CompilerDiagnostic>,
    pub degradation: DegradationSummary,
    pub meta: TemplateMeta,
}

impl TemplateCompilation {
    pub fn errors(&self) -> impl Iterator<Item = &CompilerDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

/// Lower and link; shared by every entry point.
fn front_end(options: &CompileOptions<'_>) -> Result<(IrModule, LinkedModule)> {
    let lookup = options.lookup()?;
    let lower = LowerOptions {
        name: options.template_name(),
    };
    let mut ir = lower_document(options.html, &lower, &lookup);
    resolve_imports(&mut ir, options);
    let linked = link_module(&ir, &lookup, &options.link);
    Ok((ir, linked))
}

fn resolve_imports(ir: &mut IrModule, options: &CompileOptions<'_>) {
    let Some(resolver) = options.module_resolver else {
        return;
    };
    let mut unresolved = Vec::new();
    for import in &mut ir.meta.imports {
        import.resolved = resolver.resolve(&import.from, options.template_file_path);
        if import.resolved.is_none() {
            unresolved.push(
                CompilerDiagnostic::warning(
                    DiagnosticCode::UnresolvedImport,
                    Stage::Lower,
                    format!("Cannot resolve import '{}'", import.from),
                    Some(import.from_span.unwrap_or(import.span)),
                ),
            );
        }
    }
    ir.diagnostics.extend(unresolved);
}

pub fn compile_template(options: &CompileOptions<'_>) -> Result<TemplateCompilation> {
    let (ir, linked) = front_end(options)?;

    let scope = bind_scopes(&linked, &ir.expr_table);
    let vm_type = effective_vm_type(options.vm);
    let typecheck = analyze_frames(&scope, &ir.expr_table, &vm_type);
    let usage = collect_usage(&linked, &ir.expr_table);

    let overlay_options = OverlayOptions {
        is_js: options.is_js,
        synthetic_prefix: options.vm.synthetic_prefix(),
        base_name: options.overlay_base(),
    };
    let overlay_plan = plan_overlay(&linked, &scope, &ir.expr_table, &typecheck, &overlay_options.synthetic_prefix);
    let overlay = emit_overlay(&overlay_plan, &ir.expr_table, &overlay_options);
    let mapping = overlay.mapping.clone();
    let query = TemplateQuery::build(&linked, &scope, &ir.expr_table, &mapping);

    let mut diagnostics = ir.diagnostics.clone();
    diagnostics.extend(linked.diagnostics.iter().cloned());
    let degradation = summarize_degradation(&diagnostics);

    tracing::debug!(
        template = options.template_file_path,
        exprs = ir.expr_table.len(),
        frames = scope.frames.len(),
        diagnostics = diagnostics.len(),
        partial = degradation.gap_qualified_count,
        "compiled template"
    );

    Ok(TemplateCompilation {
        expr_table: ir.expr_table.clone(),
        expr_spans: ir.expr_table.spans(),
        meta: ir.meta.clone(),
        ir,
        linked,
        scope,
        typecheck,
        usage,
        overlay_plan,
        overlay,
        mapping,
        query,
        diagnostics,
        degradation,
    })
}

#[derive(Debug, Clone)]
pub struct AotCompilation {
    pub plan: AotPlanModule,
    pub emit: AotEmitResult,
    pub diagnostics: Vec<CompilerDiagnostic>,
}

pub fn compile_aot(options: &CompileOptions<'_>, aot: &AotOptions) -> Result<AotCompilation> {
    let (ir, linked) = front_end(options)?;
    let plan = plan_aot(&linked, &ir.expr_table);
    let emit = emit_aot(&plan, &ir.expr_table, aot)?;
    let mut diagnostics = ir.diagnostics;
    diagnostics.extend(linked.diagnostics);
    Ok(AotCompilation { plan, emit, diagnostics })
}

pub fn compile_ssr(options: &CompileOptions<'_>, ssr: &SsrOptions) -> Result<SsrResult> {
    let (ir, linked) = front_end(options)?;
    render_ssr(&linked, &ir.expr_table, ssr)
}
