/**
 * Lowering Tests
 *
 * Markup to IR: instruction rows per target, controller nesting, `<let>`,
 * meta-elements and the expression table.
 */

#[cfg(test)]
mod tests {
    use au_compiler::diagnostics::DiagnosticCode;
    use au_compiler::expression_parser::{Expr, ExpressionType};
    use au_compiler::schema::{
        AttrRes, Bindable, BindingMode, ElementRes, ProjectSemantics, ResourceCollections, SemanticsLookup,
    };
    use au_compiler::template::ir::{DomNode, Instruction, IrModule, IrTemplate, Row, ShadowMode, TailValue};
    use au_compiler::template::lowering::{lower_document, LowerOptions};

    fn lookup() -> SemanticsLookup {
        let mut res = ResourceCollections::new();
        res.add_element(
            ElementRes::new("user-card").with_bindables([Bindable::new("firstName"), Bindable::new("title")]),
        );
        res.add_attribute(AttrRes::new("tooltip").with_bindables([Bindable::new("text"), Bindable::new("position")]));
        let semantics = ProjectSemantics::builtins().with_resources(&res);
        SemanticsLookup::new(&semantics, None).unwrap()
    }

    fn lower(html: &str) -> IrModule {
        lower_document(html, &LowerOptions::default(), &lookup())
    }

    fn only_row(template: &IrTemplate) -> &Row {
        assert_eq!(template.rows.len(), 1, "{:#?}", template.rows);
        &template.rows[0]
    }

    fn codes(module: &IrModule) -> Vec<DiagnosticCode> {
        module.diagnostics.iter().map(|d| d.code).collect()
    }

    mod text_and_bindings {
        use super::*;

        #[test]
        fn should_bind_text_interpolation() {
            let html = "<p>Hello ${name}!</p>";
            let module = lower(html);
            assert!(module.diagnostics.is_empty());
            let row = only_row(&module.root);
            match &row.instructions[0] {
                Instruction::TextBinding(text) => {
                    let entry = module.expr_table.get(text.from).unwrap();
                    assert_eq!(entry.expression_type, ExpressionType::Interpolation);
                    assert_eq!(entry.span.slice(html), "Hello ${name}!");
                    assert_eq!(text.span.slice(html), "Hello ${name}!");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_lower_property_binding_with_absolute_spans() {
            let html = "<input value.two-way=\"user.name\">";
            let module = lower(html);
            match &only_row(&module.root).instructions[0] {
                Instruction::PropertyBinding(b) => {
                    assert_eq!(b.to, "value");
                    assert_eq!(b.mode, BindingMode::TwoWay);
                    assert_eq!(b.command, "two-way");
                    assert_eq!(b.loc.target_span.slice(html), "value");
                    assert_eq!(module.expr_table.get(b.from).unwrap().span.slice(html), "user.name");
                    assert!(matches!(module.expr_table.ast(b.from), Some(Expr::AccessMember(_))));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_bind_same_named_property_for_empty_value() {
            let html = "<input value.bind>";
            let module = lower(html);
            match &only_row(&module.root).instructions[0] {
                Instruction::PropertyBinding(b) => {
                    assert!(matches!(module.expr_table.ast(b.from), Some(Expr::AccessScope(s)) if s.name.name == "value"));
                    assert_eq!(module.expr_table.get(b.from).unwrap().span.slice(html), "value");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_lower_listeners_and_refs() {
            let html = "<form @submit:prevent=\"save()\" click.capture=\"track($event)\" ref=\"formEl\"></form>";
            let module = lower(html);
            let row = only_row(&module.root);
            assert_eq!(row.instructions.len(), 3);
            match &row.instructions[0] {
                Instruction::ListenerBinding(l) => {
                    assert_eq!(l.to, "submit");
                    assert_eq!(l.modifier.as_deref(), Some("prevent"));
                    assert!(!l.capture);
                    assert_eq!(module.expr_table.get(l.from).unwrap().expression_type, ExpressionType::IsFunction);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(matches!(&row.instructions[1], Instruction::ListenerBinding(l) if l.capture));
            assert!(matches!(&row.instructions[2], Instruction::RefBinding(r) if r.to == "element"));
        }

        #[test]
        fn should_map_native_attribute_names() {
            let module = lower("<label for.bind=\"id\" class.bind=\"cls\" aria-label.attr=\"label\"></label>");
            let row = only_row(&module.root);
            let tos: Vec<&str> = row
                .instructions
                .iter()
                .map(|i| match i {
                    Instruction::PropertyBinding(b) => b.to.as_str(),
                    Instruction::AttributeBinding(b) => b.to.as_str(),
                    other => panic!("unexpected {other:?}"),
                })
                .collect();
            assert_eq!(tos, vec!["htmlFor", "className", "aria-label"]);
        }

        #[test]
        fn should_keep_static_attributes_in_dom() {
            let module = lower("<div id=\"main\" title=\"${t}\"></div>");
            match &module.root.dom.children[0] {
                DomNode::Element(el) => {
                    assert_eq!(el.attrs.len(), 1);
                    assert_eq!(el.attr("id").unwrap().value.as_deref(), Some("main"));
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(matches!(&only_row(&module.root).instructions[0], Instruction::Interpolation(i) if i.to == "title"));
        }

        #[test]
        fn should_report_unknown_command() {
            let module = lower("<div title.shout=\"x\"></div>");
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownCommand]);
            assert!(module.root.rows.is_empty());
        }

        #[test]
        fn should_keep_bad_expressions_in_table() {
            let module = lower("<div>${a +}</div>");
            assert_eq!(codes(&module), vec![DiagnosticCode::ExpressionParseError]);
            assert_eq!(module.expr_table.len(), 1);
            match module.expr_table.iter().next().map(|e| &e.ast) {
                Some(Expr::Interpolation(i)) => assert!(i.expressions[0].is_bad()),
                other => panic!("unexpected {other:?}"),
            };
        }
    }

    mod custom_elements {
        use super::*;

        #[test]
        fn should_hydrate_element_with_bindable_props() {
            let html = "<user-card first-name.bind=\"name\" title=\"Hi\" class=\"card\" data-x=\"1\"></user-card>";
            let module = lower(html);
            let row = only_row(&module.root);
            match &row.instructions[0] {
                Instruction::HydrateElement(h) => {
                    assert_eq!(h.res, "user-card");
                    assert_eq!(h.name_span.slice(html), "user-card");
                    assert_eq!(h.end_name_span.unwrap().slice(html), "user-card");
                    assert_eq!(h.props.len(), 2);
                    assert!(matches!(&h.props[0], Instruction::PropertyBinding(b) if b.to == "firstName" && b.attr == "first-name"));
                    assert!(matches!(&h.props[1], Instruction::SetProperty(s) if s.to == "title" && s.value == "Hi"));
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(matches!(&row.instructions[1], Instruction::SetClassAttribute(s) if s.value == "card"));
            match &module.root.dom.children[0] {
                DomNode::Element(el) => assert_eq!(el.attrs.len(), 1),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_hydrate_unknown_dashed_tags() {
            let module = lower("<x-widget></x-widget><font-face></font-face>");
            assert_eq!(module.root.rows.len(), 1);
            assert!(matches!(&module.root.rows[0].instructions[0], Instruction::HydrateElement(h) if h.res == "x-widget"));
        }

        #[test]
        fn should_split_multi_binding_custom_attribute() {
            let html = "<span tooltip=\"text.bind: message; position: top\"></span>";
            let module = lower(html);
            match &only_row(&module.root).instructions[0] {
                Instruction::HydrateAttribute(h) => {
                    assert_eq!(h.res, "tooltip");
                    assert_eq!(h.props.len(), 2);
                    match &h.props[0] {
                        Instruction::PropertyBinding(b) => {
                            assert_eq!(b.to, "text");
                            assert_eq!(b.loc.target_span.slice(html), "text");
                            assert_eq!(module.expr_table.get(b.from).unwrap().span.slice(html), "message");
                        }
                        other => panic!("unexpected {other:?}"),
                    }
                    assert!(matches!(&h.props[1], Instruction::SetProperty(s) if s.to == "position" && s.value == "top"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_bind_single_value_to_primary_bindable() {
            let module = lower("<div show.bind=\"visible\"></div>");
            match &only_row(&module.root).instructions[0] {
                Instruction::HydrateAttribute(h) => {
                    assert_eq!(h.res, "show");
                    assert!(matches!(&h.props[0], Instruction::PropertyBinding(b) if b.to == "value"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod controllers {
        use super::*;

        #[test]
        fn should_wrap_element_in_controller_view() {
            let html = "<div if.bind=\"show\" class=\"box\">${message}</div>";
            let module = lower(html);
            let row = only_row(&module.root);
            match &row.instructions[0] {
                Instruction::HydrateTemplateController(c) => {
                    assert_eq!(c.res, "if");
                    assert_eq!(c.loc.target_span.slice(html), "if");
                    assert!(matches!(&c.props[0], Instruction::PropertyBinding(b) if b.to == "value"));
                    match &c.def.dom.children[0] {
                        DomNode::Element(el) => {
                            assert_eq!(el.tag, "div");
                            assert!(el.attr("class").is_some());
                        }
                        other => panic!("unexpected {other:?}"),
                    }
                    assert!(matches!(&only_row(&c.def).instructions[0], Instruction::TextBinding(_)));
                }
                other => panic!("unexpected {other:?}"),
            }
            // Controller value is registered before the content.
            let first = module.expr_table.iter().next().unwrap();
            assert_eq!(first.span.slice(html), "show");
        }

        #[test]
        fn should_nest_multiple_controllers_outermost_first() {
            let html = "<li if.bind=\"ready\" repeat.for=\"item of items\">${item}</li>";
            let module = lower(html);
            match &only_row(&module.root).instructions[0] {
                Instruction::HydrateTemplateController(outer) => {
                    assert_eq!(outer.res, "if");
                    match &only_row(&outer.def).instructions[0] {
                        Instruction::HydrateTemplateController(inner) => {
                            assert_eq!(inner.res, "repeat");
                            assert_eq!(inner.command.as_deref(), Some("for"));
                            assert!(matches!(&inner.props[0], Instruction::IteratorBinding(i) if i.to == "items"));
                        }
                        other => panic!("unexpected {other:?}"),
                    }
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_lower_iterator_tail() {
            let html = "<li repeat.for=\"row of rows; key.bind: row.id; contextual: false\"></li>";
            let module = lower(html);
            let Instruction::HydrateTemplateController(c) = &only_row(&module.root).instructions[0] else {
                panic!("expected a controller");
            };
            let Instruction::IteratorBinding(iter) = &c.props[0] else {
                panic!("expected an iterator binding");
            };
            assert_eq!(iter.tail.len(), 2);
            assert_eq!(iter.tail[0].to, "key");
            assert_eq!(iter.tail[0].name_span.slice(html), "key");
            match iter.tail[0].value {
                TailValue::Expr(id) => assert_eq!(module.expr_table.get(id).unwrap().span.slice(html), "row.id"),
                ref other => panic!("unexpected {other:?}"),
            }
            assert_eq!(iter.tail[1].value, TailValue::Literal("false".to_string()));
        }

        #[test]
        fn should_capture_branch_alias() {
            let html = "<div promise.bind=\"load()\"><span then=\"data\">${data.length}</span></div>";
            let module = lower(html);
            let Instruction::HydrateTemplateController(promise) = &only_row(&module.root).instructions[0] else {
                panic!("expected a controller");
            };
            let Instruction::HydrateTemplateController(then) = &only_row(&promise.def).instructions[0] else {
                panic!("expected a nested controller");
            };
            assert_eq!(then.res, "then");
            let alias = then.alias.as_ref().unwrap();
            assert_eq!(alias.name, "data");
            assert_eq!(alias.span.slice(html), "data");
            assert!(then.props.is_empty());
        }

        #[test]
        fn should_unwrap_authored_template() {
            let module = lower("<template if.bind=\"a\"><b>x</b><i>y</i></template>");
            let Instruction::HydrateTemplateController(c) = &only_row(&module.root).instructions[0] else {
                panic!("expected a controller");
            };
            assert_eq!(c.def.dom.children.len(), 2);
        }
    }

    mod let_elements {
        use super::*;

        #[test]
        fn should_declare_locals() {
            let html = "<let full-name.bind=\"first + ' ' + last\" greeting=\"Hi ${first}\" mode=\"edit\" to-binding-context></let>";
            let module = lower(html);
            match &only_row(&module.root).instructions[0] {
                Instruction::HydrateLetElement(l) => {
                    assert!(l.to_binding_context);
                    let names: Vec<&str> = l.bindings.iter().map(|b| b.to.as_str()).collect();
                    assert_eq!(names, vec!["fullName", "greeting", "mode"]);
                    let types: Vec<ExpressionType> = l
                        .bindings
                        .iter()
                        .map(|b| module.expr_table.get(b.from).unwrap().expression_type)
                        .collect();
                    assert_eq!(
                        types,
                        vec![ExpressionType::IsProperty, ExpressionType::Interpolation, ExpressionType::IsProperty]
                    );
                    assert_eq!(module.expr_table.get(l.bindings[2].from).unwrap().span.slice(html), "edit");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_reject_non_property_commands() {
            let module = lower("<let total.trigger=\"x\"></let>");
            assert_eq!(codes(&module), vec![DiagnosticCode::InvalidLetCommand]);
            let data = module.diagnostics[0].data.as_ref().unwrap();
            assert_eq!(data.name.as_deref(), Some("trigger"));
            assert!(data.valid_commands.as_ref().unwrap().contains(&"bind".to_string()));
        }
    }

    mod meta {
        use super::*;

        #[test]
        fn should_fold_meta_elements() {
            let html = "<import from=\"./user-card\"></import>\
                <bindable name=\"value\" mode=\"two-way\"></bindable>\
                <containerless></containerless>\
                <use-shadow-dom mode=\"closed\"></use-shadow-dom>\
                <alias name=\"a, b\"></alias><div></div>";
            let module = lower(html);
            assert!(module.diagnostics.is_empty());
            assert_eq!(module.root.dom.children.len(), 1);
            let meta = &module.meta;
            assert_eq!(meta.imports[0].from, "./user-card");
            assert_eq!(meta.imports[0].from_span.unwrap().slice(html), "./user-card");
            assert_eq!(meta.bindables[0].name, "value");
            assert_eq!(meta.bindables[0].mode, Some(BindingMode::TwoWay));
            assert!(meta.containerless);
            assert_eq!(meta.shadow_dom, Some(ShadowMode::Closed));
            let aliases: Vec<&str> = meta.aliases.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(aliases, vec!["a", "b"]);
        }

        #[test]
        fn should_fold_root_template_attributes() {
            let module = lower("<template bindable=\"first, last\" containerless><p>${first}</p></template>");
            let names: Vec<&str> = module.meta.bindables.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(names, vec!["first", "last"]);
            assert!(module.meta.containerless);
            assert!(matches!(&module.root.dom.children[0], DomNode::Element(el) if el.tag == "p"));
        }

        #[test]
        fn should_report_invalid_meta() {
            let module = lower("<import></import><bindable mode=\"sideways\" name=\"x\"></bindable>");
            assert_eq!(
                codes(&module),
                vec![DiagnosticCode::InvalidMetaElement, DiagnosticCode::InvalidMetaElement]
            );
            assert!(module.meta.imports.is_empty());
            assert_eq!(module.meta.bindables[0].mode, None);
        }
    }

    #[test]
    fn node_ids_are_unique_across_nested_views() {
        let module = lower("<div if.bind=\"a\"><span repeat.for=\"x of xs\">${x}</span></div><p>${b}</p>");
        let mut ids = Vec::new();
        fn collect(template: &IrTemplate, ids: &mut Vec<u32>) {
            ids.push(template.dom.id.0);
            template.dom.walk(&mut |node| ids.push(node.id().0));
            for row in &template.rows {
                for instruction in &row.instructions {
                    if let Instruction::HydrateTemplateController(c) = instruction {
                        collect(&c.def, ids);
                    }
                }
            }
        }
        collect(&module.root, &mut ids);
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
