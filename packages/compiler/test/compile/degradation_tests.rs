/**
 * Degradation Tests
 *
 * Gap-qualified diagnostics end to end: which misses are downgraded to
 * partial warnings, how they are counted and which resources they name.
 */

#[cfg(test)]
mod tests {
    use au_compiler::diagnostics::{AffectedResource, DegradationSummary};
    use au_compiler::schema::{CatalogGap, ElementRes, ProjectSemantics, ResourceCollections, ResourceKind};
    use au_compiler::{compile_template, CompileOptions, DiagnosticCode, Severity, StaticVm, TemplateCompilation};

    fn semantics() -> ProjectSemantics {
        let mut res = ResourceCollections::new();
        res.add_element(ElementRes::new("data-grid"));
        ProjectSemantics::builtins()
            .with_resources(&res)
            .with_gap(CatalogGap::new(ResourceKind::CustomElement, "data-grid", "bindables are computed").with_field("bindables"))
            .with_gap(CatalogGap::new(ResourceKind::CustomElement, "lazy-panel", "class is re-exported"))
            .with_gap(CatalogGap::new(ResourceKind::CustomAttribute, "drag-handle", "opaque registration"))
            .with_gap(CatalogGap::new(ResourceKind::ValueConverter, "currency", "plugin registration"))
    }

    fn compile(html: &str) -> TemplateCompilation {
        let project = semantics();
        let vm = StaticVm::new("App");
        let options = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
        compile_template(&options).unwrap()
    }

    fn resource(kind: ResourceKind, name: &str) -> AffectedResource {
        AffectedResource {
            kind,
            name: name.to_string(),
        }
    }

    #[test]
    fn gapped_element_yields_one_partial() {
        let out = compile("<data-grid rows.bind=\"items\" page-size.bind=\"10\"></data-grid>");
        assert_eq!(out.errors().count(), 0);
        assert_eq!(
            out.degradation,
            DegradationSummary {
                has_gaps: true,
                gap_qualified_count: 1,
                affected_resources: vec![resource(ResourceKind::CustomElement, "data-grid")],
            }
        );
        let partial = &out.diagnostics[0];
        assert_eq!(partial.code, DiagnosticCode::UnknownBindable);
        assert_eq!(partial.severity, Severity::Warning);
    }

    #[test]
    fn clean_template_has_no_gaps() {
        let out = compile("<div if.bind=\"true\"></div>");
        assert_eq!(out.degradation, DegradationSummary::default());
        assert!(!out.degradation.has_gaps);
        assert_eq!(out.degradation.gap_qualified_count, 0);
        assert!(out.degradation.affected_resources.is_empty());
    }

    #[test]
    fn every_gap_kind_downgrades() {
        let out = compile(
            "<lazy-panel open.bind=\"x\"></lazy-panel>\
             <li drag-handle.bind=\"row\"></li>\
             <p>${price | currency}</p>",
        );
        assert_eq!(out.errors().count(), 0, "{:?}", out.diagnostics);
        let codes: Vec<DiagnosticCode> = out.diagnostics.iter().map(|d| d.code).collect();
        assert!(codes.contains(&DiagnosticCode::UnknownElement));
        assert!(codes.contains(&DiagnosticCode::UnknownAttribute));
        assert!(codes.contains(&DiagnosticCode::UnknownConverter));
        assert_eq!(out.degradation.gap_qualified_count, 3);
        assert_eq!(
            out.degradation.affected_resources,
            vec![
                resource(ResourceKind::CustomElement, "lazy-panel"),
                resource(ResourceKind::CustomAttribute, "drag-handle"),
                resource(ResourceKind::ValueConverter, "currency"),
            ]
        );
    }

    #[test]
    fn misses_without_gaps_stay_errors() {
        let out = compile(
            "<data-grid rows.bind=\"a\"></data-grid>\
             <order-grid rows.bind=\"b\"></order-grid>\
             <p>${total | money}</p>",
        );
        let errors: Vec<DiagnosticCode> = out.errors().map(|d| d.code).collect();
        assert_eq!(errors, vec![DiagnosticCode::UnknownElement, DiagnosticCode::UnknownConverter]);
        assert_eq!(out.degradation.gap_qualified_count, 1);
        assert_eq!(
            out.degradation.affected_resources,
            vec![resource(ResourceKind::CustomElement, "data-grid")]
        );
    }

    #[test]
    fn repeated_resource_counted_once_per_site() {
        let out = compile(
            "<data-grid rows.bind=\"a\"></data-grid><data-grid cols.bind=\"b\" rows.bind=\"c\"></data-grid>",
        );
        assert_eq!(out.degradation.gap_qualified_count, 2);
        assert_eq!(out.degradation.affected_resources.len(), 1);
    }

    #[test]
    fn summary_is_deterministic() {
        let html = "<lazy-panel></lazy-panel><data-grid x.bind=\"y\"></data-grid><p>${v | currency}</p>";
        let first = compile(html);
        let second = compile(html);
        assert_eq!(first.degradation, second.degradation);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn summary_serializes_in_camel_case() {
        let out = compile("<data-grid rows.bind=\"items\"></data-grid>");
        let json = serde_json::to_value(&out.degradation).unwrap();
        assert_eq!(json["hasGaps"], true);
        assert_eq!(json["gapQualifiedCount"], 1);
        assert_eq!(json["affectedResources"][0]["kind"], "custom-element");
        assert_eq!(json["affectedResources"][0]["name"], "data-grid");
    }
}
