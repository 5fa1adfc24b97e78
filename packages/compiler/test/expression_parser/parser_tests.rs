/**
 * Parser Tests
 *
 * Binding expressions, iterator headers and interpolations: node shapes,
 * absolute spans, precedence and the error-as-node contract.
 */

#[cfg(test)]
mod tests {
    use au_compiler::expression_parser::{serialize, split_interpolation, Expr, ExpressionType, LiteralValue, Parser};
    use au_compiler::parse_util::SourceSpan;

    fn parse(input: &str) -> Expr {
        Parser::new().parse(input, ExpressionType::IsProperty, 0)
    }

    fn parse_iterator(input: &str) -> Expr {
        Parser::new().parse(input, ExpressionType::IsIterator, 0)
    }

    fn round_trip(input: &str) -> String {
        serialize(&parse(input))
    }

    mod iterators {
        use super::*;

        #[test]
        fn should_parse_simple_for_of_without_tail() {
            match parse_iterator("item of items") {
                Expr::ForOfStatement(f) => {
                    assert_eq!(f.semi_idx, -1);
                    assert_eq!(f.span, SourceSpan::new(0, 13));
                    match *f.declaration {
                        Expr::BindingIdentifier(b) => assert_eq!(b.name.name, "item"),
                        other => panic!("unexpected declaration {other:?}"),
                    }
                    match *f.iterable {
                        Expr::AccessScope(s) => {
                            assert_eq!(s.name.name, "items");
                            assert_eq!(s.span, SourceSpan::new(8, 13));
                        }
                        other => panic!("unexpected iterable {other:?}"),
                    }
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_record_semicolon_offset_of_tail() {
            match parse_iterator("row of rows; key.bind: row.id") {
                Expr::ForOfStatement(f) => assert_eq!(f.semi_idx, 11),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_parse_array_destructuring() {
            match parse_iterator("[key, value] of entries") {
                Expr::ForOfStatement(f) => match *f.declaration {
                    Expr::ArrayBindingPattern(p) => {
                        assert_eq!(p.elements.len(), 2);
                        assert!(p.rest.is_none());
                    }
                    other => panic!("unexpected {other:?}"),
                },
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_parse_object_destructuring_with_defaults() {
            match parse_iterator("{ id, name: label = 'n/a' } of rows") {
                Expr::ForOfStatement(f) => match *f.declaration {
                    Expr::ObjectBindingPattern(p) => {
                        assert_eq!(p.properties.len(), 2);
                        assert_eq!(p.properties[0].key, "id");
                        assert!(matches!(p.properties[0].value, Expr::BindingIdentifier(_)));
                        assert!(matches!(p.properties[1].value, Expr::BindingPatternDefault(_)));
                    }
                    other => panic!("unexpected {other:?}"),
                },
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_report_missing_of() {
            match parse_iterator("item in items") {
                Expr::BadExpression(bad) => assert!(bad.message.contains("'of'")),
                other => panic!("unexpected {other:?}"),
            }
            assert!(parse_iterator("").is_bad());
        }

        #[test]
        fn should_serialize_iterator() {
            assert_eq!(serialize(&parse_iterator("[k, v] of map")), "[k, v] of map");
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn should_rebase_spans() {
            match Parser::new().parse("a.b", ExpressionType::IsProperty, 20) {
                Expr::AccessMember(m) => {
                    assert_eq!(m.span, SourceSpan::new(20, 23));
                    assert_eq!(m.name.span, SourceSpan::new(22, 23));
                    assert_eq!(m.object.span(), SourceSpan::new(20, 21));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_respect_precedence() {
            match parse("a + b * c") {
                Expr::Binary(b) => {
                    assert_eq!(b.operation, "+");
                    assert!(matches!(&*b.right, Expr::Binary(r) if r.operation == "*"));
                }
                other => panic!("unexpected {other:?}"),
            }
            match parse("a ?? b || c") {
                Expr::Binary(b) => {
                    assert_eq!(b.operation, "??");
                    assert!(matches!(&*b.right, Expr::Binary(r) if r.operation == "||"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_treat_exponent_as_right_associative() {
            match parse("2 ** 3 ** 2") {
                Expr::Binary(b) => {
                    assert!(matches!(*b.left, Expr::PrimitiveLiteral(_)));
                    assert!(matches!(&*b.right, Expr::Binary(r) if r.operation == "**"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_parse_conditional_and_assignment() {
            assert!(matches!(parse("ok ? 'yes' : 'no'"), Expr::Conditional(_)));
            match parse("count += 1") {
                Expr::Assign(a) => {
                    assert_eq!(a.op, "+=");
                    assert!(matches!(*a.target, Expr::AccessScope(_)));
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(parse("1 = 2").is_bad());
        }

        #[test]
        fn should_resolve_scope_keywords() {
            assert!(matches!(parse("$this"), Expr::AccessThis(t) if t.ancestor == 0));
            assert!(matches!(parse("$parent.$parent"), Expr::AccessThis(t) if t.ancestor == 2));
            assert!(matches!(parse("$this.name"), Expr::AccessScope(s) if s.ancestor == 0));
            assert!(matches!(parse("$parent.name"), Expr::AccessScope(s) if s.ancestor == 1));
            assert!(matches!(parse("$host"), Expr::AccessBoundary(_)));
        }

        #[test]
        fn should_distinguish_globals() {
            match parse("Math.max(a, b)") {
                Expr::CallMember(c) => {
                    assert!(matches!(*c.object, Expr::AccessGlobal(_)));
                    assert_eq!(c.args.len(), 2);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(matches!(parse("isNaN(x)"), Expr::CallGlobal(_)));
            assert!(matches!(parse("max(x)"), Expr::CallScope(_)));
        }

        #[test]
        fn should_parse_optional_chains() {
            match parse("a?.b?.[0]") {
                Expr::AccessKeyed(k) => {
                    assert!(k.optional);
                    assert!(matches!(&*k.object, Expr::AccessMember(m) if m.optional));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_parse_literals() {
            assert!(matches!(parse("1.5"), Expr::PrimitiveLiteral(p) if p.value == LiteralValue::Number(1.5)));
            assert!(matches!(parse("'x'"), Expr::PrimitiveLiteral(p) if p.value == LiteralValue::String("x".into())));
            assert!(matches!(parse("null"), Expr::PrimitiveLiteral(p) if p.value == LiteralValue::Null));
            match parse("{ a, 'b-c': 2 }") {
                Expr::ObjectLiteral(o) => {
                    assert_eq!(o.keys.len(), 2);
                    assert!(o.keys[1].quoted);
                    assert!(matches!(o.values[0], Expr::AccessScope(_)));
                }
                other => panic!("unexpected {other:?}"),
            }
            match parse("`a${b}c`") {
                Expr::Template(t) => {
                    assert_eq!(t.cooked, vec!["a".to_string(), "c".to_string()]);
                    assert!(matches!(&t.expressions[0], Expr::AccessScope(s) if s.name.name == "b"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_span_converter_chain() {
            match parse("value | upper") {
                Expr::ValueConverter(v) => {
                    assert_eq!(v.span, SourceSpan::new(0, 13));
                    assert_eq!(v.name.span, SourceSpan::new(8, 13));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_return_bad_expression_for_trailing_tokens() {
            let result = Parser::new().parse_with_errors("a b", ExpressionType::IsProperty, 0);
            assert!(result.ast.is_bad());
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].msg.contains("Unexpected token"));
            assert!(parse("'unterminated").is_bad());
        }

        #[test]
        fn should_parse_empty_input_as_empty_string() {
            assert!(matches!(parse(""), Expr::PrimitiveLiteral(p) if p.value == LiteralValue::String(String::new())));
        }
    }

    mod interpolation {
        use super::*;

        #[test]
        fn should_parse_parts_with_absolute_spans() {
            match Parser::new().parse("Hi ${name}!", ExpressionType::Interpolation, 5) {
                Expr::Interpolation(i) => {
                    assert_eq!(i.parts, vec!["Hi ".to_string(), "!".to_string()]);
                    assert_eq!(i.expressions.len(), 1);
                    assert_eq!(i.expressions[0].span(), SourceSpan::new(10, 14));
                    assert_eq!(i.span, SourceSpan::new(5, 16));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_keep_plain_text_as_single_part() {
            match Parser::new().parse("plain", ExpressionType::Interpolation, 0) {
                Expr::Interpolation(i) => {
                    assert_eq!(i.parts, vec!["plain".to_string()]);
                    assert!(i.expressions.is_empty());
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_collect_nested_errors() {
            let result = Parser::new().parse_with_errors("${a +} and ${b}", ExpressionType::Interpolation, 0);
            assert_eq!(result.errors.len(), 1);
            match result.ast {
                Expr::Interpolation(i) => {
                    assert!(i.expressions[0].is_bad());
                    assert!(!i.expressions[1].is_bad());
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn should_skip_braces_inside_expressions() {
            let split = split_interpolation("${ {a: '}'}.a } tail").unwrap();
            assert_eq!(split.expressions.len(), 1);
            assert_eq!(split.strings[1].text, " tail");
        }
    }

    mod serializer {
        use super::*;

        #[test]
        fn should_print_canonical_syntax() {
            assert_eq!(round_trip("a|f:1&b"), "a | f:1 & b");
            assert_eq!(round_trip("x => x.done"), "(x) => x.done");
            assert_eq!(round_trip("{a: 1, 'b-c': d}"), "{a: 1, 'b-c': d}");
            assert_eq!(round_trip("!ok"), "!ok");
            assert_eq!(round_trip("typeof x"), "typeof x");
            assert_eq!(round_trip("$parent.items[0]"), "$parent.items[0]");
            assert_eq!(round_trip("a?.b()"), "a?.b()");
        }
    }
}
