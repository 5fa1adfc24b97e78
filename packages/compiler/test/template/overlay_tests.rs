/**
 * Overlay Synthesis Tests
 *
 * Generated overlay text for whole templates, bidirectional offset mapping and
 * cursor queries built on top of the mapping.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::ProjectSemantics;
    use au_compiler::template::ir::FrameId;
    use au_compiler::{compile_template, CompileOptions, StaticVm, TemplateCompilation};

    fn compile_with(html: &str, vm: &StaticVm, is_js: bool) -> TemplateCompilation {
        let project = ProjectSemantics::builtins();
        let options = CompileOptions::new(html, "src/app.html", vm)
            .with_project(&project, None)
            .with_js(is_js);
        compile_template(&options).unwrap()
    }

    fn compile(html: &str) -> TemplateCompilation {
        compile_with(html, &StaticVm::new("App"), false)
    }

    mod text {
        use super::*;

        #[test]
        fn should_declare_one_type_per_frame() {
            let out = compile("<li repeat.for=\"item of items\">${item.name}</li>");
            let text = &out.overlay.text;
            assert!(text.contains("type __AU_TTC_F0 = App & { $vm: App };"));
            assert!(text.contains("type __AU_TTC_F1 = Omit<__AU_TTC_F0, 'item'"));
            assert!(text.contains("__AU_TTC_access<__AU_TTC_F1>(o => `${o.item.name}`);"));
            assert_eq!(out.overlay_plan.frames.len(), 2);
        }

        #[test]
        fn should_keep_interpolation_literals() {
            let out = compile("<p>Hello ${name}!</p>");
            assert!(out.overlay.text.contains("(o => `Hello ${o.name}!`);"));
        }

        #[test]
        fn should_route_scope_keywords() {
            let out = compile(
                "<li repeat.for=\"item of items\"><b title.bind=\"$parent.caption\"></b></li>\
                 <div with.bind=\"user\"><i title.bind=\"$this\"></i></div>",
            );
            let text = &out.overlay.text;
            assert!(text.contains("(o => o.$parent.caption);"));
            assert!(text.contains("(o => o.$this);"));
        }

        #[test]
        fn should_keep_arrow_parameters_local() {
            let out = compile("<p title.bind=\"items.filter(x => x.done).length\"></p>");
            assert!(out.overlay.text.contains("o.items.filter((x) => x.done).length"));
        }

        #[test]
        fn should_use_qualified_type_and_prefix() {
            let vm = StaticVm {
                qualified: Some("import('./app').App".to_string()),
                ..StaticVm::new("App").with_prefix("__X_")
            };
            let out = compile_with("<p>${a}</p>", &vm, false);
            let text = &out.overlay.text;
            assert!(text.contains("type __X_F0 = import('./app').App & { $vm: import('./app').App };"));
            assert!(text.contains("declare function __X_access<T>"));
            assert!(!text.contains("__AU_TTC_"));
        }

        #[test]
        fn should_emit_jsdoc_for_js_projects() {
            let out = compile_with("<p>${a}</p>", &StaticVm::new("App"), true);
            assert_eq!(out.overlay.filename, "src/app.__au.ttc.overlay.js");
            assert!(!out.overlay.text.contains("declare function"));
            assert!(out.overlay.text.contains("@typedef"));
        }

        #[test]
        fn should_be_deterministic() {
            let html = "<div promise.bind=\"load()\"><p then=\"v\">${v.x}</p></div><input value.bind=\"q & debounce:200\">";
            assert_eq!(compile(html).overlay, compile(html).overlay);
        }
    }

    mod mapping {
        use super::*;

        #[test]
        fn should_map_member_segments_both_ways() {
            let html = "<input value.bind=\"user.address.city\">";
            let out = compile(html);
            let city = html.find("city").unwrap();
            let overlay_at = out.mapping.html_to_overlay(city).unwrap();
            assert_eq!(&out.overlay.text[overlay_at..overlay_at + 4], "city");
            assert_eq!(out.mapping.overlay_to_html(overlay_at + 2), Some(city + 2));

            let segment = out.mapping.segment_at_html(city + 1).unwrap();
            assert_eq!(segment.path, "user.address.city");
            assert_eq!(segment.html_span.slice(html), "city");
        }

        #[test]
        fn should_map_every_authored_expression_once() {
            let html = "<p title.bind=\"a\" class.bind=\"b\">${c} ${d}</p>";
            let out = compile(html);
            assert_eq!(out.mapping.entries.len(), 3);
            for entry in &out.mapping.entries {
                assert!(out.mapping.entry_for_expr(entry.expr_id).is_some());
                for segment in &entry.segments {
                    assert_eq!(segment.html_span.slice(html), segment.overlay_span.slice(&out.overlay.text));
                }
            }
        }

        #[test]
        fn should_ignore_converter_arguments_in_segments() {
            let html = "<p>${when | date:'short'}</p>";
            let out = compile(html);
            let paths: Vec<&str> = out
                .mapping
                .entries
                .iter()
                .flat_map(|e| e.segments.iter().map(|s| s.path.as_str()))
                .collect();
            assert_eq!(paths, vec!["when"]);
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn should_compile_entity_encoded_operators() {
            let html = r#"<div if.bind="a &amp;&amp; b"><p title.bind="x &gt; 1"></p></div>"#;
            let out = compile(html);
            assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
            assert!(out.overlay.text.contains("(o => o.a && o.b);"));
            assert!(out.overlay.text.contains("(o => o.x > 1);"));

            let b = out.mapping.segment_at_html(html.find("b\"").unwrap()).unwrap();
            assert_eq!(b.path, "b");
            assert_eq!(b.html_span.slice(html), "b");
            let condition = out.mapping.entries.iter().find(|e| e.segments.iter().any(|s| s.path == "a")).unwrap();
            assert_eq!(condition.html_span.slice(html), "a &amp;&amp; b");
        }

        #[test]
        fn should_keep_nested_unary_operators_apart() {
            let out = compile("<p>${- -x} ${+ +y}</p>");
            assert!(out.overlay.text.contains("${- -o.x} ${+ +o.y}"));
        }

        #[test]
        fn should_map_escaped_keys_as_one_segment() {
            let html = r#"<p title.bind="a['x\'y']"></p>"#;
            let out = compile(html);
            let key = out.mapping.segment_at_html(html.find("x\\").unwrap()).unwrap();
            assert_eq!(key.html_span.slice(html), r"'x\'y'");
            assert_eq!(key.overlay_span.slice(&out.overlay.text), r#""x'y""#);
        }

        #[test]
        fn should_path_globals_by_name() {
            let html = "<p>${Math.max(a, b)}</p>";
            let out = compile(html);
            let max = out.mapping.segment_at_html(html.find("max").unwrap()).unwrap();
            assert_eq!(max.path, "Math.max");
        }
    }

    mod query {
        use super::*;

        #[test]
        fn should_report_expression_frame_and_member() {
            let html = "<ul><li repeat.for=\"item of items\"><a href.bind=\"item.url\">go</a></li></ul>";
            let out = compile(html);
            let offset = html.find("url").unwrap() + 1;
            let hit = out.query.at(offset);

            assert_eq!(hit.frame, FrameId::new(1));
            assert_eq!(hit.expr.as_ref().unwrap().span.slice(html), "item.url");
            assert_eq!(hit.node.as_ref().unwrap().tag.as_deref(), Some("a"));
            assert_eq!(hit.member.as_ref().unwrap().path, "item.url");
            assert!(hit.overlay_offset.is_some());
        }

        #[test]
        fn should_fall_back_to_node_frame_outside_expressions() {
            let html = "<div repeat.for=\"row of rows\"><span>static</span></div><p>tail</p>";
            let out = compile(html);
            let offset = html.find("static").unwrap();
            assert!(out.query.expr_at(offset).is_none());
            assert_eq!(out.query.frame_at(offset), FrameId::new(1));
            assert_eq!(out.query.frame_at(html.find("tail").unwrap()), FrameId::ROOT);
        }
    }
}
