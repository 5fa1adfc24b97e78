//! Meta-elements and root `<template>` attributes fold into `TemplateMeta`.

use super::Lowerer;
use crate::diagnostics::{CompilerDiagnostic, DiagnosticCode, Stage};
use crate::ml_parser::{Attribute, Element};
use crate::parse_util::{OffsetMap, SourceSpan};
use crate::schema::BindingMode;
use crate::template::ir::{MetaAlias, MetaBindable, ShadowMode, TemplateImport};

/// Split `a, b ,c` into trimmed names with absolute spans.
fn split_names(value: &str, map: &OffsetMap) -> Vec<(String, SourceSpan)> {
    let mut names = Vec::new();
    let mut offset = 0;
    for piece in value.split(',') {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            let at = offset + piece.find(trimmed).unwrap_or(0);
            names.push((trimmed.to_string(), map.span(at, at + trimmed.len())));
        }
        offset += piece.len() + 1;
    }
    names
}

fn shadow_mode(attr: Option<&Attribute>) -> ShadowMode {
    match attr.map(|a| a.value.trim()) {
        Some("closed") => ShadowMode::Closed,
        _ => ShadowMode::Open,
    }
}

impl<'a> Lowerer<'a> {
    pub(crate) fn fold_meta_element(&mut self, el: &Element) {
        match el.name.as_str() {
            "bindable" => self.fold_bindable(el),
            "containerless" => self.meta.containerless = true,
            "use-shadow-dom" => self.meta.shadow_dom = Some(shadow_mode(el.attr("mode"))),
            "alias" => match el.attr("name") {
                Some(name) => {
                    let names = split_names(&name.value, &name.value_map);
                    self.meta
                        .aliases
                        .extend(names.into_iter().map(|(name, span)| MetaAlias { name, span }));
                }
                None => self.invalid_meta(el, "<alias> requires a 'name' attribute"),
            },
            "import" | "require" => match el.attr("from") {
                Some(from) if !from.value.trim().is_empty() => self.meta.imports.push(TemplateImport {
                    from: from.value.trim().to_string(),
                    from_span: from.value_span,
                    resolved: None,
                    alias: el.attr("as").map(|a| a.value.trim().to_string()),
                    span: el.span,
                }),
                _ => self.invalid_meta(el, &format!("<{}> requires a 'from' attribute", el.name)),
            },
            _ => {}
        }
    }

    fn fold_bindable(&mut self, el: &Element) {
        let Some(name) = el.attr("name").filter(|a| !a.value.trim().is_empty()) else {
            self.invalid_meta(el, "<bindable> requires a 'name' attribute");
            return;
        };
        let mode = el.attr("mode").map(|m| m.value.trim()).and_then(|m| {
            let parsed = BindingMode::from_name(m);
            if parsed.is_none() {
                self.diagnostics.push(CompilerDiagnostic::warning(
                    DiagnosticCode::InvalidMetaElement,
                    Stage::Lower,
                    format!("Unknown binding mode '{m}' on <bindable>"),
                    Some(el.span),
                ));
            }
            parsed
        });
        self.meta.bindables.push(MetaBindable {
            name: name.value.trim().to_string(),
            attribute: el.attr("attribute").map(|a| a.value.trim().to_string()),
            mode,
            span: el.span,
            name_span: name.value_span,
        });
    }

    /// Definition attributes on a lone root `<template>`.
    pub(crate) fn fold_root_template_attrs(&mut self, el: &Element) {
        for attr in &el.attrs {
            match attr.name.as_str() {
                "bindable" => {
                    for (name, span) in split_names(&attr.value, &attr.value_map) {
                        self.meta.bindables.push(MetaBindable {
                            name,
                            attribute: None,
                            mode: None,
                            span,
                            name_span: Some(span),
                        });
                    }
                }
                "alias" => {
                    for (name, span) in split_names(&attr.value, &attr.value_map) {
                        self.meta.aliases.push(MetaAlias { name, span });
                    }
                }
                "containerless" => self.meta.containerless = true,
                "use-shadow-dom" => {
                    self.meta.shadow_dom = Some(if attr.value.trim() == "closed" {
                        ShadowMode::Closed
                    } else {
                        ShadowMode::Open
                    })
                }
                _ => {}
            }
        }
    }

    fn invalid_meta(&mut self, el: &Element, message: &str) {
        self.diagnostics.push(CompilerDiagnostic::error(
            DiagnosticCode::InvalidMetaElement,
            Stage::Lower,
            message,
            Some(el.name_span),
        ));
    }
}
