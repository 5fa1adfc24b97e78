/**
 * Type Analysis Tests
 *
 * Frame environments and expression types as seen through the compile
 * facade, including `<let>` values and the qualified view-model type.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::ProjectSemantics;
    use au_compiler::template::ir::FrameId;
    use au_compiler::template::typecheck::UNKNOWN;
    use au_compiler::{compile_template, CompileOptions, StaticVm, TemplateCompilation};

    fn compile_with(html: &str, vm: &StaticVm) -> TemplateCompilation {
        let project = ProjectSemantics::builtins();
        let options = CompileOptions::new(html, "src/app.html", vm).with_project(&project, None);
        compile_template(&options).unwrap()
    }

    fn compile(html: &str) -> TemplateCompilation {
        compile_with(html, &StaticVm::new("App"))
    }

    /// Type of the first expression whose source text is `text`.
    fn type_of(out: &TemplateCompilation, html: &str, text: &str) -> String {
        let entry = out
            .expr_table
            .iter()
            .find(|e| e.span.slice(html) == text)
            .unwrap_or_else(|| panic!("no expression '{text}'"));
        out.typecheck.expr_type(&out.scope, &out.expr_table, entry.id)
    }

    mod view_model {
        use super::*;

        #[test]
        fn should_prefer_qualified_type() {
            let vm = StaticVm {
                qualified: Some("import('./app').App".to_string()),
                ..StaticVm::new("App")
            };
            let html = "<input value.bind=\"user.name\">";
            let out = compile_with(html, &vm);
            assert_eq!(out.typecheck.root_vm_type, "import('./app').App");
            assert_eq!(type_of(&out, html, "user.name"), "((import('./app').App)['user'])['name']");
        }

        #[test]
        fn should_ignore_blank_qualified_type() {
            let vm = StaticVm {
                qualified: Some("  ".to_string()),
                ..StaticVm::new("App")
            };
            assert_eq!(compile_with("<p></p>", &vm).typecheck.root_vm_type, "App");
        }

        #[test]
        fn should_type_calls_and_optional_members() {
            let html = "<p title.bind=\"format(total)\" class.bind=\"user?.role\" hidden.bind=\"!visible\"></p>";
            let out = compile(html);
            assert_eq!(type_of(&out, html, "format(total)"), "ReturnType<(App)['format']>");
            assert_eq!(type_of(&out, html, "user?.role"), "NonNullable<(App)['user']>['role'] | undefined");
            assert_eq!(type_of(&out, html, "!visible"), "boolean");
        }
    }

    mod frames {
        use super::*;

        #[test]
        fn should_project_destructured_iterator_locals() {
            let out = compile("<li repeat.for=\"[key, value] of entries\">${key}</li>");
            let frame = FrameId::new(1);
            assert_eq!(
                out.typecheck.local_type(frame, "key"),
                "TupleElement<CollectionElement<(App)['entries']>, 0>"
            );
            assert_eq!(
                out.typecheck.local_type(frame, "value"),
                "TupleElement<CollectionElement<(App)['entries']>, 1>"
            );
            let hints = &out.typecheck.hints[&frame];
            assert_eq!(hints.iterable.as_deref(), Some("(App)['entries']"));
            assert_eq!(hints.element.as_deref(), Some("CollectionElement<(App)['entries']>"));
        }

        #[test]
        fn should_read_overlay_members_inside_with() {
            let html = "<div with.bind=\"profile\"><input value.bind=\"email\"><b title.bind=\"$this\"></b></div>";
            let out = compile(html);
            assert_eq!(type_of(&out, html, "email"), "((App)['profile'])['email']");
            assert_eq!(type_of(&out, html, "$this"), "(App)['profile']");
        }

        #[test]
        fn should_reach_parent_scope() {
            let html = "<li repeat.for=\"item of items\"><b title.bind=\"$parent.caption\"></b></li>";
            let out = compile(html);
            assert_eq!(type_of(&out, html, "$parent.caption"), "(App)['caption']");
        }

        #[test]
        fn should_type_promise_branches() {
            let out = compile(
                "<div promise.bind=\"session.load()\"><i then=\"data\">${data}</i><i catch=\"err\">${err}</i></div>",
            );
            assert_eq!(
                out.typecheck.local_type(FrameId::new(2), "data"),
                "Awaited<ReturnType<((App)['session'])['load']>>"
            );
            assert_eq!(out.typecheck.local_type(FrameId::new(3), "err"), "any");
            assert_eq!(
                out.typecheck.hints[&FrameId::new(1)].promise.as_deref(),
                Some("ReturnType<((App)['session'])['load']>")
            );
        }

        #[test]
        fn should_degrade_untypeable_iterables() {
            let out = compile("<li repeat.for=\"x of items | sortBy:'name'\">${x}</li>");
            assert_eq!(out.typecheck.local_type(FrameId::new(1), "x"), UNKNOWN);
            assert_eq!(out.typecheck.local_type(FrameId::new(1), "$index"), "number");
        }
    }

    mod lets {
        use super::*;

        #[test]
        fn should_type_let_values() {
            let out = compile(
                "<let label.bind=\"'Total: ' + count\"></let><let big.bind=\"count > 10\"></let><let raw=\"plain\"></let>",
            );
            let root = FrameId::ROOT;
            assert_eq!(out.typecheck.local_type(root, "label"), "string");
            assert_eq!(out.typecheck.local_type(root, "big"), "boolean");
            assert_eq!(out.typecheck.local_type(root, "raw"), "string");
        }

        #[test]
        fn should_type_let_against_iterator_locals() {
            let out = compile("<div repeat.for=\"row of rows\"><let cost.bind=\"row.price * row.qty\"></let><let name.bind=\"row.name\"></let></div>");
            let frame = FrameId::new(1);
            assert_eq!(out.typecheck.local_type(frame, "cost"), "number");
            assert_eq!(
                out.typecheck.local_type(frame, "name"),
                "(CollectionElement<(App)['rows']>)['name']"
            );
            assert_eq!(out.typecheck.local_type(FrameId::ROOT, "name"), UNKNOWN);
        }
    }

    #[test]
    fn analysis_serializes_by_frame() {
        let out = compile("<li repeat.for=\"item of items\">${item}</li>");
        let json = serde_json::to_value(&out.typecheck).unwrap();
        assert_eq!(json["rootVmType"], "App");
        assert_eq!(json["envs"]["1"]["locals"]["item"], "CollectionElement<(App)['items']>");
        assert_eq!(json["hints"]["1"]["iterable"], "(App)['items']");
    }
}
