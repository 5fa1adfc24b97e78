/**
 * Compile Facade Tests
 *
 * Option handling for a single template compile: semantics sources, resource
 * scopes, import resolution and the artifacts assembled from every stage.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::{
        BindingMode, ElementRes, ProjectSemantics, ResourceCollections, ResourceGraph, ResourceKind, SemanticsLookup,
    };
    use au_compiler::template::aot::AotOptions;
    use au_compiler::template::ssr::SsrOptions;
    use au_compiler::{
        compile_aot, compile_ssr, compile_template, CompileOptions, CompilerError, DiagnosticCode, Severity, StaticVm,
    };

    fn scoped_project() -> ProjectSemantics {
        let mut graph = ResourceGraph::new("root");
        graph.add_scope("local:src/user-list.ts#UserList", None, {
            let mut res = ResourceCollections::new();
            res.add_element(ElementRes::new("user-row"));
            res
        });
        ProjectSemantics::builtins().with_graph(graph)
    }

    mod options {
        use super::*;

        #[test]
        fn should_require_semantics_for_every_entry_point() {
            let vm = StaticVm::new("App");
            let options = CompileOptions::new("<p></p>", "app.html", &vm);
            assert!(matches!(compile_template(&options), Err(CompilerError::MissingSemantics)));
            assert!(matches!(
                compile_aot(&options, &AotOptions::default()),
                Err(CompilerError::MissingSemantics)
            ));
            assert!(matches!(
                compile_ssr(&options, &SsrOptions::default()),
                Err(CompilerError::MissingSemantics)
            ));
        }

        #[test]
        fn should_prefer_prebuilt_lookup() {
            let mut res = ResourceCollections::new();
            res.add_element(ElementRes::new("only-here"));
            let lookup = SemanticsLookup::from_parts(res, Vec::new());
            let empty = ProjectSemantics::builtins();
            let vm = StaticVm::new("App");
            let options = CompileOptions::new("<only-here></only-here>", "app.html", &vm)
                .with_project(&empty, None)
                .with_semantics(&lookup);
            let out = compile_template(&options).unwrap();
            assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        }

        #[test]
        fn should_resolve_against_resource_scope() {
            let project = scoped_project();
            let vm = StaticVm::new("UserList");
            let html = "<user-row></user-row>";

            let local = CompileOptions::new(html, "src/user-list.html", &vm)
                .with_project(&project, Some("local:src/user-list.ts#UserList"));
            assert!(compile_template(&local).unwrap().diagnostics.is_empty());

            let root = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
            let out = compile_template(&root).unwrap();
            assert_eq!(out.errors().next().map(|d| d.code), Some(DiagnosticCode::UnknownElement));

            let missing = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, Some("local:nowhere"));
            assert!(matches!(
                compile_template(&missing),
                Err(CompilerError::UnknownScope(id)) if id == "local:nowhere"
            ));
        }

        #[test]
        fn should_skip_import_checks_without_resolver() {
            let project = ProjectSemantics::builtins();
            let vm = StaticVm::new("App");
            let html = "<import from=\"./nowhere\"></import><p></p>";
            let options = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
            let out = compile_template(&options).unwrap();
            assert!(out.diagnostics.is_empty());
            assert_eq!(out.meta.imports.len(), 1);
            assert!(out.meta.imports[0].resolved.is_none());
        }

        #[test]
        fn should_warn_on_unresolved_imports() {
            let project = ProjectSemantics::builtins();
            let vm = StaticVm::new("App");
            let resolver = |spec: &str, from: &str| (spec == "./card" && from == "src/app.html").then(|| "src/card.ts".to_string());
            let html = "<import from=\"./card\"></import><import from=\"./gone\"></import>";
            let options = CompileOptions::new(html, "src/app.html", &vm)
                .with_project(&project, None)
                .with_module_resolver(&resolver);
            let out = compile_template(&options).unwrap();
            assert_eq!(out.meta.imports[0].resolved.as_deref(), Some("src/card.ts"));
            assert_eq!(out.diagnostics.len(), 1);
            let warning = &out.diagnostics[0];
            assert_eq!(warning.code, DiagnosticCode::UnresolvedImport);
            assert_eq!(warning.severity, Severity::Warning);
            assert_eq!(warning.span.unwrap().slice(html), "./gone");
        }

        #[test]
        fn should_honor_overlay_base_name() {
            let project = ProjectSemantics::builtins();
            let vm = StaticVm::new("App");
            let options = CompileOptions::new("<p>${a}</p>", "src/pages/home.html", &vm)
                .with_project(&project, None)
                .with_overlay_base_name("out/home");
            let out = compile_template(&options).unwrap();
            assert_eq!(out.overlay.filename, "out/home.__au.ttc.overlay.ts");
            assert_eq!(out.ir.name, "home");

            let js = compile_template(&options.with_js(true)).unwrap();
            assert_eq!(js.overlay.filename, "out/home.__au.ttc.overlay.js");
        }
    }

    mod artifacts {
        use super::*;

        fn compile(html: &str) -> au_compiler::TemplateCompilation {
            let project = ProjectSemantics::builtins();
            let vm = StaticVm::new("App");
            let options = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
            compile_template(&options).unwrap()
        }

        #[test]
        fn should_fold_meta_elements() {
            let out = compile(
                "<bindable name=\"value\" mode=\"two-way\"></bindable><containerless></containerless><p>${value}</p>",
            );
            assert!(out.meta.containerless);
            assert_eq!(out.meta.bindables.len(), 1);
            assert_eq!(out.meta.bindables[0].name, "value");
            assert_eq!(out.meta.bindables[0].mode, Some(BindingMode::TwoWay));
            assert!(!out.usage.tags.contains("bindable"));
        }

        #[test]
        fn should_collect_usage() {
            let out = compile(
                "<input value.bind=\"q & debounce:100\"><button click.trigger=\"go()\">go</button>\
                 <li repeat.for=\"x of xs\">${x | sanitize}</li>",
            );
            assert!(out.usage.uses(ResourceKind::TemplateController, "repeat"));
            assert!(out.usage.uses(ResourceKind::BindingBehavior, "debounce"));
            assert!(out.usage.uses(ResourceKind::ValueConverter, "sanitize"));
            assert!(!out.usage.uses(ResourceKind::CustomElement, "input"));
            for command in ["bind", "trigger", "for"] {
                assert!(out.usage.commands.contains(command), "missing {command}");
            }
            assert!(out.usage.tags.contains("button"));
        }

        #[test]
        fn should_expose_expression_spans() {
            let html = "<p title.bind=\"title\">${body}</p>";
            let out = compile(html);
            let texts: Vec<&str> = out.expr_spans.iter().map(|(_, span)| span.slice(html)).collect();
            assert!(texts.contains(&"title"));
            assert_eq!(out.expr_spans.len(), out.expr_table.len());
            for (id, span) in &out.expr_spans {
                assert_eq!(out.expr_table.get(*id).unwrap().span, *span);
            }
        }

        #[test]
        fn should_report_parse_errors_as_diagnostics() {
            let out = compile("<p title.bind=\"a +\"></p><div></span></div>");
            let codes: Vec<DiagnosticCode> = out.errors().map(|d| d.code).collect();
            assert!(codes.contains(&DiagnosticCode::ExpressionParseError));
            assert!(codes.contains(&DiagnosticCode::HtmlParseError));
            assert!(!out.overlay.text.is_empty());
        }

        #[test]
        fn should_serialize_compilation() {
            let out = compile("<p>${a}</p>");
            let json = serde_json::to_value(&out).unwrap();
            assert!(json.get("overlayPlan").is_some());
            assert!(json.get("exprSpans").is_some());
            assert_eq!(json["overlay"]["filename"], "src/app.__au.ttc.overlay.ts");
            assert_eq!(json["degradation"]["hasGaps"], false);
        }
    }
}
