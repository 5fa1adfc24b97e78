/**
 * Linking Tests
 *
 * Resource resolution, binding targets and effective modes, gap-qualified
 * misses, controller decisions and expression resource checks.
 */

#[cfg(test)]
mod tests {
    use au_compiler::diagnostics::{reason, BindableOwnerKind, Confidence, DiagnosticCode, Severity};
    use au_compiler::schema::{
        AttrRes, Bindable, BindingMode, CatalogGap, ElementRes, ProjectSemantics, ResourceCollections, ResourceKind,
        SemanticsLookup,
    };
    use au_compiler::template::ir::DomNode;
    use au_compiler::template::linking::{
        link_module, BindingTarget, LinkOptions, LinkedInstruction, LinkedModule, LinkedTemplate,
    };
    use au_compiler::template::lowering::{lower_document, LowerOptions};

    fn semantics() -> ProjectSemantics {
        let mut res = ResourceCollections::new();
        res.add_element(ElementRes::new("user-card").with_bindables([
            Bindable::new("firstName"),
            Bindable::new("value").with_mode(BindingMode::TwoWay),
        ]));
        res.add_element(ElementRes::new("data-grid"));
        res.add_attribute(AttrRes::new("tooltip").with_bindables([Bindable::new("text"), Bindable::new("position")]));
        ProjectSemantics::builtins().with_resources(&res).with_gap(
            CatalogGap::new(ResourceKind::CustomElement, "data-grid", "bindables are computed").with_field("bindables"),
        )
    }

    fn link_with(html: &str, semantics: &ProjectSemantics) -> LinkedModule {
        let lookup = SemanticsLookup::new(semantics, None).unwrap();
        let ir = lower_document(html, &LowerOptions::default(), &lookup);
        link_module(&ir, &lookup, &LinkOptions::default())
    }

    fn link(html: &str) -> LinkedModule {
        link_with(html, &semantics())
    }

    fn codes(module: &LinkedModule) -> Vec<DiagnosticCode> {
        module.diagnostics.iter().map(|d| d.code).collect()
    }

    fn first(template: &LinkedTemplate) -> &LinkedInstruction {
        &template.rows[0].instructions[0]
    }

    mod targets {
        use super::*;

        #[test]
        fn should_target_element_bindables() {
            let module = link("<user-card first-name.bind=\"name\" value.bind=\"amount\"></user-card>");
            assert!(module.diagnostics.is_empty());
            let element = module.root.rows[0].element().unwrap();
            assert!(element.res.is_some());
            match &element.props[0] {
                LinkedInstruction::PropertyBinding(b) => {
                    assert!(matches!(&b.target, BindingTarget::ElementBindable { owner, bindable }
                        if owner == "user-card" && bindable.name == "firstName"));
                    assert_eq!(b.effective_mode, BindingMode::ToView);
                }
                other => panic!("unexpected {other:?}"),
            }
            match &element.props[1] {
                LinkedInstruction::PropertyBinding(b) => assert_eq!(b.effective_mode, BindingMode::TwoWay),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_resolve_native_default_modes() {
            let module = link("<input value.bind=\"v\" disabled.bind=\"off\"><div scroll-top.bind=\"y\"></div>");
            let modes: Vec<BindingMode> = module
                .root
                .rows
                .iter()
                .flat_map(|r| &r.instructions)
                .map(|i| match i {
                    LinkedInstruction::PropertyBinding(b) => b.effective_mode,
                    other => panic!("unexpected {other:?}"),
                })
                .collect();
            assert_eq!(modes, vec![BindingMode::TwoWay, BindingMode::ToView, BindingMode::TwoWay]);
        }

        #[test]
        fn should_keep_explicit_mode() {
            let module = link("<input value.one-time=\"v\">");
            match first(&module.root) {
                LinkedInstruction::PropertyBinding(b) => {
                    assert_eq!(b.effective_mode, BindingMode::OneTime);
                    assert!(matches!(&b.target, BindingTarget::Native { property } if property == "value"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_target_controller_value_prop() {
            let module = link("<div if.bind=\"ok\"></div>");
            let controller = module.root.rows[0].controller().unwrap();
            assert!(controller.resolved);
            match &controller.props[0] {
                LinkedInstruction::PropertyBinding(b) => {
                    assert!(matches!(&b.target, BindingTarget::ControllerProp { owner, bindable }
                        if owner == "if" && bindable.name == "value"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod misses {
        use super::*;

        #[test]
        fn should_report_unknown_element_as_error() {
            let html = "<nav-menu items.bind=\"links\"></nav-menu>";
            let module = link(html);
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownElement]);
            let diagnostic = &module.diagnostics[0];
            assert_eq!(diagnostic.severity, Severity::Error);
            assert!(!diagnostic.is_partial());
            assert_eq!(diagnostic.span.unwrap().slice(html), "nav-menu");
            let data = diagnostic.data.as_ref().unwrap();
            assert_eq!(data.affected_resource(), Some((ResourceKind::CustomElement, "nav-menu")));

            let element = module.root.rows[0].element().unwrap();
            assert!(element.res.is_none());
            assert!(matches!(&element.props[0], LinkedInstruction::PropertyBinding(b) if b.target == BindingTarget::Unknown));
        }

        #[test]
        fn should_report_one_partial_per_gapped_element() {
            let html = "<data-grid rows.bind=\"items\" page-size.bind=\"10\" sortable=\"true\"></data-grid>";
            let module = link(html);
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownBindable]);
            let diagnostic = &module.diagnostics[0];
            assert!(diagnostic.is_partial());
            assert_eq!(diagnostic.severity, Severity::Warning);
            let data = diagnostic.data.as_ref().unwrap();
            assert_eq!(data.confidence, Some(Confidence::Partial));
            let bindable = data.bindable.as_ref().unwrap();
            assert_eq!(bindable.owner_kind, BindableOwnerKind::Element);
            assert_eq!(bindable.owner_name, "data-grid");
            assert_eq!(bindable.name, "rows");
            assert_eq!(diagnostic.span.unwrap().slice(html), "rows");
        }

        #[test]
        fn should_downgrade_unknown_gapped_element() {
            let semantics = ProjectSemantics::builtins()
                .with_gap(CatalogGap::new(ResourceKind::CustomElement, "lazy-panel", "registered dynamically"));
            let module = link_with("<lazy-panel open.bind=\"x\"></lazy-panel>", &semantics);
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownElement]);
            assert!(module.diagnostics[0].is_partial());
        }

        #[test]
        fn should_report_unknown_attribute_bindable() {
            let html = "<span tooltip=\"text.bind: msg; color: red\"></span>";
            let module = link(html);
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownBindable]);
            let diagnostic = &module.diagnostics[0];
            assert!(!diagnostic.is_partial());
            assert_eq!(diagnostic.span.unwrap().slice(html), "color");
            let bindable = diagnostic.data.as_ref().unwrap().bindable.as_ref().unwrap();
            assert_eq!(bindable.owner_kind, BindableOwnerKind::Attribute);
        }

        #[test]
        fn should_downgrade_gapped_attribute() {
            let semantics = ProjectSemantics::builtins()
                .with_gap(CatalogGap::new(ResourceKind::CustomAttribute, "draggable-item", "opaque registration"));
            let module = link_with("<li draggable-item.bind=\"row\"></li>", &semantics);
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownAttribute]);
            assert!(module.diagnostics[0].is_partial());
        }

        #[test]
        fn should_stub_unknown_iterator_controller() {
            let module = link("<li virtual-repeat.for=\"row of rows\">${row}</li>");
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownController]);
            let controller = module.root.rows[0].controller().unwrap();
            assert!(!controller.resolved);
            assert!(controller.res.is_iterator());
            assert_eq!(controller.def.rows.len(), 1);
        }

        #[test]
        fn should_check_expression_resources() {
            let html = "<p>${when | relative & debounce:200 & sparkle}</p>";
            let module = link(html);
            // Outermost first: the behavior chain wraps the converter.
            assert_eq!(codes(&module), vec![DiagnosticCode::UnknownBehavior, DiagnosticCode::UnknownConverter]);
            assert_eq!(module.diagnostics[0].span.unwrap().slice(html), "sparkle");
            assert_eq!(module.diagnostics[1].span.unwrap().slice(html), "relative");

            let lookup = SemanticsLookup::new(&semantics(), None).unwrap();
            let ir = lower_document(html, &LowerOptions::default(), &lookup);
            let unchecked = link_module(
                &ir,
                &lookup,
                &LinkOptions {
                    check_expression_resources: false,
                },
            );
            assert!(unchecked.diagnostics.is_empty());
        }
    }

    mod controllers {
        use super::*;

        #[test]
        fn should_require_for_on_iterator() {
            let module = link("<li repeat.bind=\"items\"></li>");
            assert_eq!(codes(&module), vec![DiagnosticCode::IteratorCommandMismatch]);
            let data = module.diagnostics[0].data.as_ref().unwrap();
            assert_eq!(data.reason.as_deref(), Some(reason::ITERATOR_COMMAND_REQUIRED));
            assert!(module.root.rows[0].controller().unwrap().props.is_empty());
        }

        #[test]
        fn should_reject_for_on_value_controller() {
            let module = link("<div with.for=\"x of y\"></div>");
            assert_eq!(codes(&module), vec![DiagnosticCode::IteratorCommandMismatch]);
            let data = module.diagnostics[0].data.as_ref().unwrap();
            assert_eq!(data.reason.as_deref(), Some(reason::ITERATOR_COMMAND_UNEXPECTED));
        }

        #[test]
        fn should_drop_invalid_tail_props() {
            let module = link("<li repeat.for=\"x of xs; key: id; key.two-way: id; size: 3\"></li>");
            assert_eq!(codes(&module), vec![DiagnosticCode::InvalidTailProp, DiagnosticCode::InvalidTailProp]);
            let reasons: Vec<Option<&str>> = module
                .diagnostics
                .iter()
                .map(|d| d.data.as_ref().and_then(|data| data.reason.as_deref()))
                .collect();
            assert_eq!(reasons, vec![Some(reason::TAIL_PROP_MODE), Some(reason::TAIL_PROP_UNKNOWN)]);
            match &module.root.rows[0].controller().unwrap().props[0] {
                LinkedInstruction::IteratorBinding(iter) => {
                    assert_eq!(iter.tail.len(), 1);
                    assert_eq!(iter.tail[0].to, "key");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_accept_else_after_if() {
            let module = link("<div if.bind=\"a\">A</div>\n<div else>B</div>");
            assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        }

        #[test]
        fn should_report_orphan_else() {
            let module = link("<div if.bind=\"a\">A</div><p>between</p><div else>B</div>");
            assert_eq!(codes(&module), vec![DiagnosticCode::OrphanBranch]);
            assert_eq!(
                module.diagnostics[0].data.as_ref().unwrap().reason.as_deref(),
                Some(reason::BRANCH_PARENT)
            );
        }

        #[test]
        fn should_link_child_branches_inside_owner() {
            let module = link(
                "<div switch.bind=\"status\"><span case=\"ok\">fine</span><span default-case>other</span></div>\
                 <div promise.bind=\"load()\"><p pending>...</p><p then=\"v\">${v}</p><p catch=\"e\">${e}</p></div>",
            );
            assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
            let promise = module.root.rows[1].controller().unwrap();
            let names: Vec<&str> = promise.def.nested().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["pending", "then", "catch"]);
            assert!(promise.def.nested().all(|c| c.resolved));
        }

        #[test]
        fn should_report_orphan_child_branch() {
            let module = link("<span case=\"ok\">fine</span>");
            assert_eq!(codes(&module), vec![DiagnosticCode::OrphanBranch]);
        }
    }

    #[test]
    fn node_index_finds_owning_template() {
        let module = link("<ul><li repeat.for=\"item of items\"><b>${item}</b></li></ul>");
        let controller = module.root.rows[0].controller().unwrap();
        let text = match &controller.def.dom.children[0] {
            DomNode::Element(li) => match &li.children[0] {
                DomNode::Element(b) => b.children[0].id(),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        };
        let owner = module.template_of(text).unwrap();
        assert_eq!(owner.name, "repeat");
        assert!(matches!(
            module.row_for(text).unwrap().instructions[0],
            LinkedInstruction::TextBinding(_)
        ));
        assert_eq!(module.templates().len(), 2);
    }
}
