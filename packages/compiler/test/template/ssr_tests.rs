/**
 * SSR Emission Tests
 *
 * Rendered HTML with hydration markers, manifest contents per hydration id and
 * the node map tying authored spans to both outputs.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::{Bindable, ElementRes, ProjectSemantics, ResourceCollections};
    use au_compiler::template::ssr::{SsrOptions, SsrResult, SSR_MANIFEST_VERSION};
    use au_compiler::{compile_ssr, CompileOptions, StaticVm};

    fn render_with(html: &str, options: &SsrOptions) -> SsrResult {
        let mut res = ResourceCollections::new();
        res.add_element(ElementRes::new("user-card").with_bindables([Bindable::new("firstName")]));
        let project = ProjectSemantics::builtins().with_resources(&res);
        let vm = StaticVm::new("App");
        let compile = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
        compile_ssr(&compile, options).unwrap()
    }

    fn render(html: &str) -> SsrResult {
        render_with(html, &SsrOptions::default())
    }

    mod html {
        use super::*;

        #[test]
        fn should_render_repeat_view_once() {
            let out = render("<ul><li repeat.for=\"item of items\">${item}</li></ul>");
            assert_eq!(
                out.html,
                "<ul><!--au:ctrl 1 repeat start--><li><!--au:tb 2@0 expr=item--></li><!--au:ctrl 1 end--></ul>"
            );
        }

        #[test]
        fn should_reescape_decoded_markup() {
            let out = render("<p title=\"a &amp; &quot;b&quot;\">x &lt; y &amp; z</p><script>if (a < b) {}</script>");
            assert_eq!(
                out.html,
                "<p title=\"a &amp; &quot;b&quot;\">x &lt; y &amp; z</p><script>if (a < b) {}</script>"
            );
        }

        #[test]
        fn should_mark_each_interpolation_part() {
            let out = render("<p>${first} and ${second}</p>");
            assert_eq!(
                out.html,
                "<p><!--au:tb 1@0 expr=first--> and <!--au:tb 1@1 expr=second--></p>"
            );
        }

        #[test]
        fn should_tag_custom_elements() {
            let out = render("<user-card first-name.bind=\"name\" data-x=\"1\"></user-card>");
            assert_eq!(out.html, "<user-card data-x=\"1\" data-au-hid=\"1\"></user-card>");
        }

        #[test]
        fn should_honor_render_options() {
            let options = SsrOptions {
                preserve_comments: false,
                include_expressions: false,
            };
            let out = render_with("<!-- note --><p title.bind=\"t\">${name}</p>", &options);
            assert!(!out.html.contains("note"));
            assert!(out.html.contains("<!--au:tb 2@0-->"));
            assert!(out.manifest.node(1).unwrap().bindings.iter().all(|b| b.expr.is_none()));
        }

        #[test]
        fn should_be_deterministic() {
            let html = "<div if.bind=\"a\"><b repeat.for=\"x of xs\">${x}</b></div><p else>none</p>";
            assert_eq!(render(html), render(html));
        }
    }

    mod manifest {
        use super::*;

        #[test]
        fn should_describe_controllers() {
            let out = render("<ul><li repeat.for=\"item of items\">${item}</li></ul>");
            assert_eq!(out.manifest.version, SSR_MANIFEST_VERSION);
            assert_eq!(out.manifest.templates.len(), 2);

            let host = out.manifest.node(1).unwrap();
            assert_eq!(host.controllers[0].res, "repeat");
            assert_eq!(host.controllers[0].template, out.manifest.templates[1].name);
            assert_eq!(host.bindings[0].kind, "iteratorBinding");
            assert_eq!(host.bindings[0].to.as_deref(), Some("items"));
            assert_eq!(host.bindings[0].expr.as_deref(), Some("item of items"));

            let text = out.manifest.node(2).unwrap();
            assert_eq!(text.text.as_deref(), Some("${item}"));
            assert_eq!(text.bindings[0].kind, "textBinding");
        }

        #[test]
        fn should_flatten_element_props() {
            let out = render("<user-card first-name.bind=\"name\"></user-card>");
            let kinds: Vec<(&str, Option<&str>)> = out
                .manifest
                .node(1)
                .unwrap()
                .bindings
                .iter()
                .map(|b| (b.kind.as_str(), b.to.as_deref()))
                .collect();
            assert_eq!(
                kinds,
                vec![("hydrateElement", Some("user-card")), ("propertyBinding", Some("firstName"))]
            );
        }

        #[test]
        fn should_record_let_values() {
            let out = render("<let total.bind=\"a + b\"></let>");
            let node = out.manifest.node(1).unwrap();
            assert!(node.bindings.is_empty());
            assert_eq!(node.lets.len(), 1);
            assert_eq!(node.lets[0].to, "total");
            assert_eq!(node.lets[0].expr.as_deref(), Some("a + b"));
        }

        #[test]
        fn should_serialize_with_camel_case_keys() {
            let out = render("<p title.bind=\"t\"></p>");
            let json: serde_json::Value = serde_json::from_str(&out.manifest_json).unwrap();
            assert_eq!(json["templates"][0]["nodes"][0]["nodeId"], 1);
            assert_eq!(json["templates"][0]["nodes"][0]["bindings"][0]["type"], "propertyBinding");
        }
    }

    mod mappings {
        use super::*;

        #[test]
        fn should_tie_source_to_both_outputs() {
            let html = "<div><a href.bind=\"url\">go</a><i if.bind=\"x\"></i></div>";
            let out = render(html);
            assert_eq!(out.mappings.len(), 2);

            let link = &out.mappings[0];
            assert_eq!(link.source_span.unwrap().slice(html), "<a href.bind=\"url\">go</a>");
            assert_eq!(link.html_span.slice(&out.html), "<a data-au-hid=\"1\">go</a>");
            assert!(link.manifest_span.slice(&out.manifest_json).contains("\"hid\":1"));

            let controller = &out.mappings[1];
            assert_eq!(controller.html_span.slice(&out.html), "<!--au:ctrl 2 if start-->");
            assert_eq!(controller.template, link.template);
        }

        #[test]
        fn should_span_whole_element_with_children() {
            let html = "<ul class.bind=\"cls\"><li>${a}</li><li>b</li></ul><p>tail</p>";
            let out = render(html);
            let list = out.mappings.iter().find(|m| m.hid == 1).unwrap();
            let rendered = list.html_span.slice(&out.html);
            assert!(rendered.starts_with("<ul data-au-hid=\"1\">"), "{rendered}");
            assert!(rendered.ends_with("<li>b</li></ul>"), "{rendered}");
            assert!(!rendered.contains("tail"));

            let text = out.mappings.iter().find(|m| m.hid == 2).unwrap();
            assert!(list.html_span.covers(&text.html_span));
        }
    }
}
