/**
 * Resource Graph Tests
 *
 * Scope chains, materialization order and the lookup built on top of a
 * materialized scope.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::{
        Bindable, CatalogGap, ElementRes, ProjectSemantics, ResourceCollections, ResourceGraph, ResourceKind,
        SemanticsLookup, ValueConverterSig,
    };
    use au_compiler::CompilerError;

    fn elements(names: &[&str]) -> ResourceCollections {
        let mut res = ResourceCollections::new();
        for name in names {
            res.add_element(ElementRes::new(*name));
        }
        res
    }

    fn graph() -> ResourceGraph {
        let mut graph = ResourceGraph::new("app");
        graph.root_scope_mut().resources = elements(&["nav-bar"]);
        graph.add_scope("local:user-list", None, elements(&["user-row"]));
        graph.add_scope("local:order-list", None, elements(&["order-row"]));
        graph
    }

    mod graph {
        use super::*;

        #[test]
        fn should_label_root_scope() {
            let graph = ResourceGraph::new("app");
            let root = graph.scope("app").unwrap();
            assert_eq!(root.label.as_deref(), Some("root"));
            assert!(root.parent.is_none());
        }

        #[test]
        fn should_default_missing_parent_to_root() {
            let graph = graph();
            assert_eq!(graph.scope("local:user-list").unwrap().parent.as_deref(), Some("app"));
            let chain: Vec<&str> = graph.chain("local:user-list").unwrap().iter().map(|s| s.id.as_str()).collect();
            assert_eq!(chain, vec!["local:user-list", "app"]);
        }

        #[test]
        fn should_not_parent_scope_to_itself() {
            let mut graph = ResourceGraph::new("app");
            graph.add_scope("loop", Some("loop"), ResourceCollections::new());
            assert!(graph.scope("loop").unwrap().parent.is_none());
            assert_eq!(graph.chain("loop").unwrap().len(), 1);
        }

        #[test]
        fn should_cut_cycles() {
            let mut graph = ResourceGraph::new("app");
            graph.add_scope("a", Some("b"), ResourceCollections::new());
            graph.add_scope("b", Some("a"), ResourceCollections::new());
            let chain: Vec<&str> = graph.chain("b").unwrap().iter().map(|s| s.id.as_str()).collect();
            assert_eq!(chain, vec!["b", "a"]);
        }

        #[test]
        fn should_fail_on_unknown_scope() {
            let graph = graph();
            match graph.chain("local:missing") {
                Err(CompilerError::UnknownScope(id)) => assert_eq!(id, "local:missing"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod materialize {
        use super::*;

        #[test]
        fn should_inherit_from_root() {
            let graph = graph();
            let visible = graph.materialize(&ResourceCollections::new(), "local:user-list").unwrap();
            assert!(visible.elements.contains_key("nav-bar"));
            assert!(visible.elements.contains_key("user-row"));
        }

        #[test]
        fn should_not_leak_between_siblings() {
            let graph = graph();
            let visible = graph.materialize(&ResourceCollections::new(), "local:user-list").unwrap();
            assert!(!visible.elements.contains_key("order-row"));
            let root = graph.materialize(&ResourceCollections::new(), "app").unwrap();
            assert!(!root.elements.contains_key("user-row"));
        }

        #[test]
        fn should_let_child_registration_win() {
            let mut graph = graph();
            let mut local = ResourceCollections::new();
            local.add_element(ElementRes::new("nav-bar").with_bindables([Bindable::new("compact")]));
            graph.add_scope("local:shell", Some("app"), local);

            let shell = graph.materialize(&ResourceCollections::new(), "local:shell").unwrap();
            assert!(shell.elements["nav-bar"].bindable("compact").is_some());
            let root = graph.materialize(&ResourceCollections::new(), "app").unwrap();
            assert!(root.elements["nav-bar"].bindable("compact").is_none());
        }

        #[test]
        fn should_keep_base_underneath() {
            let graph = graph();
            let mut base = ResourceCollections::new();
            base.add_value_converter(ValueConverterSig::new("upper"));
            let visible = graph.materialize(&base, "local:order-list").unwrap();
            assert!(visible.value_converters.contains_key("upper"));
            assert!(visible.elements.contains_key("order-row"));
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn should_use_graph_root_without_scope() {
            let semantics = ProjectSemantics::builtins().with_graph(graph());
            let lookup = SemanticsLookup::new(&semantics, None).unwrap();
            assert!(lookup.element("nav-bar").is_some());
            assert!(lookup.element("user-row").is_none());
            assert!(lookup.controller("if").is_some());
        }

        #[test]
        fn should_scope_lookup() {
            let semantics = ProjectSemantics::builtins().with_graph(graph());
            let lookup = SemanticsLookup::new(&semantics, Some("local:user-list")).unwrap();
            assert!(lookup.element("user-row").is_some());
            assert!(lookup.element("order-row").is_none());
            assert!(SemanticsLookup::new(&semantics, Some("local:nope")).is_err());
        }

        #[test]
        fn should_ignore_scope_without_graph() {
            let semantics = ProjectSemantics::builtins().with_resources(&elements(&["nav-bar"]));
            let lookup = SemanticsLookup::new(&semantics, Some("anything")).unwrap();
            assert!(lookup.element("NAV-BAR").is_some());
        }

        #[test]
        fn should_resolve_aliases_and_gaps() {
            let mut res = ResourceCollections::new();
            let mut el = ElementRes::new("user-card");
            el.aliases.push("person-card".to_string());
            res.add_element(el);
            let semantics = ProjectSemantics::builtins()
                .with_resources(&res)
                .with_gap(CatalogGap::new(ResourceKind::CustomElement, "data-grid", "bindables are computed"));
            let lookup = SemanticsLookup::new(&semantics, None).unwrap();

            assert_eq!(lookup.element("person-card").unwrap().name, "user-card");
            let gap = lookup.gap(ResourceKind::CustomElement, "Data-Grid").unwrap();
            assert_eq!(gap.reason, "bindables are computed");
            assert!(!lookup.has_gap(ResourceKind::CustomElement, "user-card"));
        }
    }

    #[test]
    fn semantics_serialize_in_camel_case() {
        let mut res = ResourceCollections::new();
        res.add_value_converter(ValueConverterSig::new("dateFormat"));
        let semantics = ProjectSemantics::default().with_resources(&res).with_graph(ResourceGraph::new("app"));
        let json = serde_json::to_value(&semantics).unwrap();
        assert!(json["resources"]["valueConverters"]["dateFormat"].is_object());
        assert_eq!(json["graph"]["root"], "app");

        let back: ProjectSemantics = serde_json::from_value(json).unwrap();
        assert_eq!(back, semantics);
    }
}
