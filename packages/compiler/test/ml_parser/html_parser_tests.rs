/**
 * HTML Parser Tests
 *
 * Tree construction, implied end tags, raw text elements, error recovery
 * and span preservation for the template markup parser.
 */
mod util;

#[cfg(test)]
mod tests {
    use super::util::{humanize, parse, row};
    use au_compiler::ml_parser::Node;

    mod tree {
        use super::*;

        #[test]
        fn should_parse_nested_elements_and_text() {
            let result = parse("<div><span>hi</span>!</div>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize(&result),
                vec![
                    row("element", "div", 0),
                    row("element", "span", 1),
                    row("text", "hi", 2),
                    row("text", "!", 1),
                ]
            );
        }

        #[test]
        fn should_keep_attribute_case_and_lowercase_tags() {
            let result = parse("<DIV myAttr.bind=\"x\"></DIV>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize(&result),
                vec![row("element", "div", 0), row("attr", "myAttr.bind=x", 1)]
            );
        }

        #[test]
        fn should_handle_void_and_self_closing_elements() {
            let result = parse("<p>a<br>b<img src=\"x\"/><my-el /></p>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize(&result),
                vec![
                    row("element", "p", 0),
                    row("text", "a", 1),
                    row("element", "br", 1),
                    row("text", "b", 1),
                    row("element", "img", 1),
                    row("attr", "src=x", 2),
                    row("element", "my-el", 1),
                ]
            );
        }

        #[test]
        fn should_close_implied_end_tags() {
            let result = parse("<ul><li>one<li>two</ul>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize(&result),
                vec![
                    row("element", "ul", 0),
                    row("element", "li", 1),
                    row("text", "one", 2),
                    row("element", "li", 1),
                    row("text", "two", 2),
                ]
            );
        }

        #[test]
        fn should_keep_comments() {
            let result = parse("<!-- note --><div></div>");
            assert_eq!(humanize(&result)[0], row("comment", " note ", 0));
        }

        #[test]
        fn should_treat_script_content_as_raw_text() {
            let result = parse("<script>if (a < b) { x(); }</script>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize(&result),
                vec![row("element", "script", 0), row("text", "if (a < b) { x(); }", 1)]
            );
        }

        #[test]
        fn should_keep_interpolation_text_verbatim() {
            let result = parse("<p>${a < b ? 'x' : 'y'}</p>");
            match &result.root_nodes[0] {
                Node::Element(p) => match &p.children[0] {
                    Node::Text(text) => assert_eq!(text.value, "${a < b ? 'x' : 'y'}"),
                    other => panic!("unexpected {other:?}"),
                },
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod entities {
        use super::*;

        #[test]
        fn should_decode_references_in_attribute_values() {
            let html = r#"<div if.bind="a &amp;&amp; b" title="&lt;&#65;&#x42;&gt;"></div>"#;
            let result = parse(html);
            assert!(result.errors.is_empty());
            match &result.root_nodes[0] {
                Node::Element(el) => {
                    let cond = el.attr("if.bind").unwrap();
                    assert_eq!(cond.value, "a && b");
                    assert_eq!(cond.value_span.unwrap().slice(html), "a &amp;&amp; b");
                    let b_at = cond.value.find('b').unwrap();
                    assert_eq!(cond.value_map.span(b_at, b_at + 1).slice(html), "b");
                    assert_eq!(el.attr("title").unwrap().value, "<AB>");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_decode_references_in_text_but_not_script() {
            let result = parse("<p>x &lt; y &copy;</p><script>a &amp;&amp; b</script><title>&amp;</title>");
            assert_eq!(
                humanize(&result),
                vec![
                    row("element", "p", 0),
                    row("text", "x < y \u{00A9}", 1),
                    row("element", "script", 0),
                    row("text", "a &amp;&amp; b", 1),
                    row("element", "title", 0),
                    row("text", "&", 1),
                ]
            );
        }

        #[test]
        fn should_leave_bare_ampersands_alone() {
            let html = "<p>Tom & Jerry &unknown;</p>";
            let result = parse(html);
            match &result.root_nodes[0] {
                Node::Element(p) => match &p.children[0] {
                    Node::Text(text) => {
                        assert_eq!(text.value, "Tom & Jerry &unknown;");
                        assert!(text.value_map.is_verbatim());
                    }
                    other => panic!("unexpected {other:?}"),
                },
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod recovery {
        use super::*;

        #[test]
        fn should_report_stray_end_tag() {
            let result = parse("<div></span></div>");
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].msg.contains("</span>"));
            assert_eq!(humanize(&result), vec![row("element", "div", 0)]);
        }

        #[test]
        fn should_report_unclosed_element() {
            let result = parse("<div><span>text</div>");
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].msg.contains("<span>"));
            assert_eq!(humanize(&result).len(), 3);
        }

        #[test]
        fn should_report_unterminated_attribute() {
            let result = parse("<div title=\"oops></div>");
            assert!(!result.errors.is_empty());
        }
    }

    mod spans {
        use super::*;

        #[test]
        fn should_record_element_spans() {
            let html = "<my-card title.bind=\"t\">x</my-card>";
            let result = parse(html);
            match &result.root_nodes[0] {
                Node::Element(el) => {
                    assert_eq!(el.name_span.slice(html), "my-card");
                    assert_eq!(el.start_span.slice(html), "<my-card title.bind=\"t\">");
                    assert_eq!(el.end_span.unwrap().slice(html), "</my-card>");
                    assert_eq!(el.end_name_span().unwrap().slice(html), "my-card");
                    assert_eq!(el.span.slice(html), html);
                    let attr = el.attr("title.bind").unwrap();
                    assert_eq!(attr.name_span.slice(html), "title.bind");
                    assert_eq!(attr.value_span.unwrap().slice(html), "t");
                    assert_eq!(attr.span.slice(html), "title.bind=\"t\"");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_record_valueless_attribute() {
            let html = "<input disabled>";
            let result = parse(html);
            match &result.root_nodes[0] {
                Node::Element(el) => {
                    let attr = el.attr("disabled").unwrap();
                    assert!(attr.value_span.is_none());
                    assert_eq!(attr.value_offset(), attr.name_span.end);
                    assert!(el.end_span.is_none());
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_span_text_exactly() {
            let html = "<p>  hello  </p>";
            let result = parse(html);
            match &result.root_nodes[0] {
                Node::Element(p) => assert_eq!(p.children[0].span().slice(html), "  hello  "),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
