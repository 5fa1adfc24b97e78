/**
 * AOT Plan and Emit Tests
 *
 * Instruction graphs for custom elements, controllers and `<let>`, target
 * numbering across views and the emitted definition module.
 */

#[cfg(test)]
mod tests {
    use au_compiler::diagnostics::DiagnosticCode;
    use au_compiler::schema::{Bindable, BindingMode, ElementRes, ProjectSemantics, ResourceCollections};
    use au_compiler::template::aot::{AotInstruction, AotOptions, AotTailProp};
    use au_compiler::{compile_aot, AotCompilation, CompileOptions, StaticVm};

    fn semantics() -> ProjectSemantics {
        let mut res = ResourceCollections::new();
        res.add_element(ElementRes::new("user-card").with_bindables([Bindable::new("firstName"), Bindable::new("title")]));
        ProjectSemantics::builtins().with_resources(&res)
    }

    fn compile_with(html: &str, options: &AotOptions) -> AotCompilation {
        let vm = StaticVm::new("App");
        let project = semantics();
        let compile = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
        compile_aot(&compile, options).unwrap()
    }

    fn compile(html: &str) -> AotCompilation {
        compile_with(html, &AotOptions::default())
    }

    mod plan {
        use super::*;

        #[test]
        fn should_hydrate_custom_element_props() {
            let out = compile("<user-card first-name.bind=\"name\" title=\"Hi\" class=\"card\"></user-card>");
            assert!(out.diagnostics.is_empty());
            let target = &out.plan.root.targets[0];
            match &target.instructions[0] {
                AotInstruction::HydrateElement { res, props, containerless } => {
                    assert_eq!(res, "user-card");
                    assert!(!containerless);
                    assert!(matches!(
                        &props[0],
                        AotInstruction::PropertyBinding { to, mode: BindingMode::ToView, .. } if to == "firstName"
                    ));
                    assert_eq!(
                        props[1],
                        AotInstruction::SetProperty {
                            to: "title".to_string(),
                            value: "Hi".to_string()
                        }
                    );
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(
                target.instructions[1],
                AotInstruction::SetClassAttribute {
                    value: "card".to_string()
                }
            );
        }

        #[test]
        fn should_place_each_controller_behind_a_marker() {
            let out = compile("<p if.bind=\"ok\">yes</p><p else>no</p>");
            let root = &out.plan.root;
            assert_eq!(root.target_count(), 2);
            assert_eq!(
                root.template,
                "<!--au*--><!--au-start--><!--au-end--><!--au*--><!--au-start--><!--au-end-->"
            );
            for (target, name) in root.targets.iter().zip(["if", "else"]) {
                match &target.instructions[0] {
                    AotInstruction::HydrateTemplateController { res, def, .. } => {
                        assert_eq!(res, name);
                        assert!(def.template.contains("<p>"));
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
        }

        #[test]
        fn should_carry_branch_alias() {
            let out = compile("<div promise.bind=\"load()\"><span then=\"data\">${data}</span></div>");
            let AotInstruction::HydrateTemplateController { res, def, .. } = &out.plan.root.targets[0].instructions[0]
            else {
                panic!("expected a controller");
            };
            assert_eq!(res, "promise");
            match &def.targets[0].instructions[0] {
                AotInstruction::HydrateTemplateController { res, alias, .. } => {
                    assert_eq!(res, "then");
                    assert_eq!(alias.as_deref(), Some("data"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_plan_iterator_tail_and_locals() {
            let out = compile("<li repeat.for=\"{ id, name } of people; key.bind: id; contextual: false\">${name}</li>");
            let AotInstruction::HydrateTemplateController { props, .. } = &out.plan.root.targets[0].instructions[0]
            else {
                panic!("expected a controller");
            };
            let AotInstruction::IteratorBinding { to, locals, props: tail, .. } = &props[0] else {
                panic!("expected an iterator binding");
            };
            assert_eq!(to, "items");
            assert_eq!(locals, &vec!["id".to_string(), "name".to_string()]);
            assert_eq!(tail.len(), 2);
            assert!(tail[0].from.is_some());
            assert_eq!(
                tail[1],
                AotTailProp {
                    to: "contextual".to_string(),
                    from: None,
                    value: Some("false".to_string()),
                }
            );
        }

        #[test]
        fn should_plan_let_elements() {
            let out = compile("<let total.bind=\"a + b\" to-binding-context></let><p>${total}</p>");
            match &out.plan.root.targets[0].instructions[0] {
                AotInstruction::HydrateLetElement {
                    bindings,
                    to_binding_context,
                } => {
                    assert!(to_binding_context);
                    assert_eq!(bindings.len(), 1);
                    assert_eq!(bindings[0].to, "total");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_pass_diagnostics_through() {
            let out = compile("<mystery-box value.bind=\"x\"></mystery-box>");
            assert!(out.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownElement));
        }
    }

    mod emit {
        use super::*;

        #[test]
        fn should_emit_nested_definitions() {
            let out = compile("<ul><li repeat.for=\"item of items\">${item}</li></ul>");
            let definition = &out.emit.definition;
            assert_eq!(definition["name"], "app");
            assert_eq!(definition["needsCompile"], false);
            let controller = &definition["instructions"][0][0];
            assert_eq!(controller["type"], "hydrateTemplateController");
            assert_eq!(controller["res"], "repeat");
            assert_eq!(controller["props"][0]["type"], "iteratorBinding");
            assert_eq!(controller["def"]["needsCompile"], false);

            let header = controller["props"][0]["from"].as_u64().unwrap().to_string();
            assert_eq!(definition["expressions"][header.as_str()]["$kind"], "ForOfStatement");
        }

        #[test]
        fn should_honor_emit_options() {
            let options = AotOptions {
                pretty: true,
                include_expressions: false,
                export_name: "appDefinition".to_string(),
            };
            let out = compile_with("<p title.bind=\"title\"></p>", &options);
            assert!(out.emit.code.starts_with("export const appDefinition = {\n"));
            assert!(out.emit.definition.get("expressions").is_none());
            assert_eq!(out.emit.definition["instructions"][0][0]["mode"], "to-view");
        }

        #[test]
        fn should_be_deterministic() {
            let html = "<div if.bind=\"a\"><span repeat.for=\"x of xs\">${x}</span></div><input value.bind=\"v\">";
            assert_eq!(compile(html).emit.code, compile(html).emit.code);
        }
    }
}
