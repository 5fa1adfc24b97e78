//! Batch compilation of every template in a program.
//!
//! Templates compile independently against the same resolved project, so the
//! work is spread over the rayon pool and gathered back in program order.

use std::time::Instant;

use au_compiler::template::aot::AotOptions;
use au_compiler::template::ssr::SsrOptions;
use au_compiler::{
    compile_aot, compile_ssr, compile_template, CompileOptions, CompilerDiagnostic, DegradationSummary,
    ModuleResolver, StaticVm,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::discovery::{Program, ResolvedProject};

/// View-model type used when a template has no paired element class.
const UNTYPED_VM: &str = "any";

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub aot: Option<AotOptions>,
    pub ssr: Option<SsrOptions>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOutput {
    pub path: String,
    pub overlay_filename: String,
    pub overlay: String,
    pub diagnostics: Vec<CompilerDiagnostic>,
    pub degradation: DegradationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssr_manifest: Option<String>,
    /// Set when compilation aborted; the other fields are then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateOutput {
    pub fn has_errors(&self) -> bool {
        self.error.is_some() || self.diagnostics.iter().any(|d| d.is_error())
    }
}

/// Compile every `.html` file in `program`. Results keep program order.
pub fn compile_project(
    program: &Program,
    project: &ResolvedProject,
    config: &ProjectConfig,
    resolver: Option<&dyn ModuleResolver>,
    options: &BatchOptions,
) -> Vec<TemplateOutput> {
    let start = Instant::now();
    let templates: Vec<(&str, &str)> = program.templates().collect();
    tracing::debug!(templates = templates.len(), "compiling project");

    let outputs: Vec<TemplateOutput> = templates
        .par_iter()
        .map(|(path, html)| compile_one(path, html, project, config, resolver, options))
        .collect();

    let failed = outputs.iter().filter(|o| o.has_errors()).count();
    tracing::debug!(
        templates = outputs.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "project compiled"
    );
    outputs
}

fn compile_one(
    path: &str,
    html: &str,
    project: &ResolvedProject,
    config: &ProjectConfig,
    resolver: Option<&dyn ModuleResolver>,
    options: &BatchOptions,
) -> TemplateOutput {
    let class_name = project.element_for_template(path).map(|r| r.class_name.as_str());
    let vm = StaticVm::new(class_name.unwrap_or(UNTYPED_VM)).with_prefix(config.synthetic_prefix.as_str());
    let scope = config.resource_scope.as_deref().or_else(|| project.scope_for_template(path));

    let mut compile_options = CompileOptions::new(html, path, &vm).with_project(&project.semantics, scope);
    if let Some(resolver) = resolver {
        compile_options = compile_options.with_module_resolver(resolver);
    }

    let mut output = TemplateOutput {
        path: path.to_string(),
        ..Default::default()
    };
    match run(&compile_options, options, &mut output) {
        Ok(()) => tracing::trace!(path, diagnostics = output.diagnostics.len(), "template compiled"),
        Err(error) => {
            tracing::warn!(path, %error, "template compilation failed");
            output.error = Some(error.to_string());
        }
    }
    output
}

fn run(compile_options: &CompileOptions<'_>, options: &BatchOptions, output: &mut TemplateOutput) -> au_compiler::Result<()> {
    let compilation = compile_template(compile_options)?;
    output.overlay_filename = compilation.overlay.filename;
    output.overlay = compilation.overlay.text;
    output.diagnostics = compilation.diagnostics;
    output.degradation = compilation.degradation;

    if let Some(aot) = &options.aot {
        output.aot = Some(compile_aot(compile_options, aot)?.emit.code);
    }
    if let Some(ssr) = &options.ssr {
        let result = compile_ssr(compile_options, ssr)?;
        output.ssr_html = Some(result.html);
        output.ssr_manifest = Some(result.manifest_json);
    }
    Ok(())
}
