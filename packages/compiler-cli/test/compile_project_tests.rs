/**
 * Batch Compile Tests
 *
 * Discovery feeding batch compilation: scoped semantics per template,
 * gap-qualified degradation and optional AOT/SSR output.
 */

#[cfg(test)]
mod tests {
    use au_compiler_cli::compiler::diagnostics::AffectedResource;
    use au_compiler_cli::compiler::schema::ResourceKind;
    use au_compiler_cli::compiler::template::aot::AotOptions;
    use au_compiler_cli::compiler::DiagnosticCode;
    use au_compiler_cli::config::ProjectConfig;
    use au_compiler_cli::discovery::{IncrementalDiscovery, Program};
    use au_compiler_cli::{compile_project, BatchOptions, TemplateOutput};

    fn compile(program: &Program, options: &BatchOptions) -> Vec<TemplateOutput> {
        let config = ProjectConfig::default();
        let project = IncrementalDiscovery::new().refresh(program, &config.discovery).project;
        compile_project(program, &project, &config, None, options)
    }

    fn output<'a>(outputs: &'a [TemplateOutput], path: &str) -> &'a TemplateOutput {
        outputs.iter().find(|o| o.path == path).unwrap()
    }

    #[test]
    fn gap_element_degrades_to_partial() {
        let program = Program::from_files([
            (
                "src/data-grid.ts",
                "import { COLUMNS } from './columns';\n@customElement({ name: 'data-grid', bindables: COLUMNS }) export class DataGrid {}",
            ),
            ("src/app.html", "<data-grid rows.bind=\"items\" page-size.bind=\"10\"></data-grid>"),
        ]);
        let outputs = compile(&program, &BatchOptions::default());
        let app = output(&outputs, "src/app.html");

        assert!(!app.has_errors());
        assert!(app.degradation.has_gaps);
        assert_eq!(app.degradation.gap_qualified_count, 1);
        assert_eq!(
            app.degradation.affected_resources,
            vec![AffectedResource {
                kind: ResourceKind::CustomElement,
                name: "data-grid".to_string(),
            }]
        );
        let partial: Vec<_> = app.diagnostics.iter().filter(|d| d.is_partial()).collect();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].code, DiagnosticCode::UnknownBindable);
    }

    #[test]
    fn unknown_element_without_gap_is_an_error() {
        let program = Program::from_files([("src/app.html", "<data-grid rows.bind=\"items\"></data-grid>")]);
        let outputs = compile(&program, &BatchOptions::default());
        let app = output(&outputs, "src/app.html");
        assert!(app.has_errors());
        assert!(!app.degradation.has_gaps);
        assert!(app.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownElement && !d.is_partial()));
    }

    #[test]
    fn element_templates_compile_in_their_own_scope() {
        let program = Program::from_files([
            ("src/date-format.ts", "export class DateFormatValueConverter { toView(v) { return v; } }"),
            (
                "src/user-list.ts",
                "export class UserListCustomElement { static dependencies = [DateFormatValueConverter]; }",
            ),
            ("src/main.ts", "Aurelia.register(UserListCustomElement).app(App).start();"),
            ("src/user-list.html", "<span>${created | dateFormat}</span>"),
            ("src/app.html", "<user-list></user-list><span>${created | dateFormat}</span>"),
        ]);
        let outputs = compile(&program, &BatchOptions::default());

        let list = output(&outputs, "src/user-list.html");
        assert!(!list.has_errors(), "{:?}", list.diagnostics);
        assert!(list.overlay.contains("UserListCustomElement"));

        let app = output(&outputs, "src/app.html");
        assert!(app.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownConverter));
        assert!(!app.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownElement));
    }

    #[test]
    fn aot_output_is_deterministic() {
        let program = Program::from_files([
            ("a.html", "<div if.bind=\"show\">${message}</div>"),
            ("b.html", "<ul><li repeat.for=\"item of items\">${item}</li></ul>"),
        ]);
        let options = BatchOptions {
            aot: Some(AotOptions::default()),
            ssr: None,
        };
        let first = compile(&program, &options);
        let second = compile(&program, &options);
        assert_eq!(first.len(), 2);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.aot, b.aot);
            assert_eq!(a.overlay, b.overlay);
        }
        assert!(first.iter().all(|o| o.aot.is_some() && !o.has_errors()));
    }
}
