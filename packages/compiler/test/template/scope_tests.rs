/**
 * Scope Tests
 *
 * Frame construction through the compile facade: which controllers open
 * frames, what they declare, and where expressions land.
 */

#[cfg(test)]
mod tests {
    use au_compiler::schema::{AliasSource, ProjectSemantics};
    use au_compiler::template::ir::FrameId;
    use au_compiler::template::scope::{FrameOrigin, Resolution, ScopeModule, SymbolKind};
    use au_compiler::{compile_template, CompileOptions, StaticVm, TemplateCompilation};

    fn compile(html: &str) -> TemplateCompilation {
        let vm = StaticVm::new("App");
        let project = ProjectSemantics::builtins();
        let options = CompileOptions::new(html, "src/app.html", &vm).with_project(&project, None);
        compile_template(&options).unwrap()
    }

    fn frame_of(out: &TemplateCompilation, html: &str, text: &str) -> FrameId {
        let entry = out
            .expr_table
            .iter()
            .find(|e| e.span.slice(html) == text)
            .unwrap_or_else(|| panic!("no expression '{text}'"));
        out.scope.frame_of(entry.id)
    }

    fn assert_well_formed(scope: &ScopeModule) {
        for (index, frame) in scope.frames.iter().enumerate() {
            assert_eq!(frame.id.as_usize(), index);
            if let Some(parent) = frame.parent {
                assert!(parent.as_usize() < index);
            }
        }
    }

    #[test]
    fn if_reuses_enclosing_frame() {
        let html = "<div if.bind=\"ready\"><span>${label}</span></div>";
        let out = compile(html);
        assert_eq!(out.scope.frames.len(), 1);
        assert_eq!(frame_of(&out, html, "${label}"), FrameId::ROOT);
        assert!(out.scope.node_to_frame.values().all(|f| *f == FrameId::ROOT));
    }

    #[test]
    fn repeat_declares_locals_and_contextuals() {
        let html = "<li repeat.for=\"user of users\">${$index}: ${user.name}</li>";
        let out = compile(html);
        assert_well_formed(&out.scope);
        let frame = &out.scope.frames[1];
        assert!(matches!(&frame.origin, Some(FrameOrigin::Iterator { controller, .. }) if controller == "repeat"));
        assert_eq!(frame.symbol("user").unwrap().kind, SymbolKind::IteratorLocal);
        assert_eq!(frame.symbol("user").unwrap().span.unwrap().slice(html), "user");
        let index = frame.symbol("$index").unwrap();
        assert_eq!(index.kind, SymbolKind::Contextual);
        assert_eq!(index.type_expr.as_deref(), Some("number"));
        assert_eq!(frame.symbol("$first").unwrap().type_expr.as_deref(), Some("boolean"));
    }

    #[test]
    fn let_inside_repeat_stays_in_iterator_frame() {
        let html = "<div repeat.for=\"row of rows\"><let total.bind=\"row.a + row.b\"></let>${total}</div>${total}";
        let out = compile(html);
        let inner = out.scope.frames[1].id;
        assert_eq!(out.scope.frames[1].symbol("total").unwrap().kind, SymbolKind::Let);
        assert!(out.scope.frames[0].symbol("total").is_none());

        let reads: Vec<FrameId> = out
            .expr_table
            .iter()
            .filter(|e| e.span.slice(html) == "${total}")
            .map(|e| out.scope.frame_of(e.id))
            .collect();
        assert_eq!(reads, vec![inner, FrameId::ROOT]);
        assert_eq!(
            out.scope.resolve(inner, "total"),
            Resolution::Local {
                frame: inner,
                kind: SymbolKind::Let
            }
        );
        assert_eq!(out.scope.resolve(FrameId::ROOT, "total"), Resolution::Vm);
    }

    #[test]
    fn later_let_declaration_wins() {
        let html = "<let x.bind=\"first\"></let><let x.bind=\"second\"></let>";
        let out = compile(html);
        let root = &out.scope.frames[0];
        assert_eq!(root.symbols.len(), 1);
        let expr = root.symbol("x").unwrap().expr.unwrap();
        assert_eq!(out.expr_table.get(expr).unwrap().span.slice(html), "second");
    }

    #[test]
    fn promise_frames_chain_value_and_branches() {
        let html = "<div promise.bind=\"fetchUser()\">\
            <p pending>loading</p>\
            <p then=\"user\">${user.name}</p>\
            <p catch=\"error\">${error.message}</p></div>";
        let out = compile(html);
        assert_well_formed(&out.scope);

        let promise = out
            .scope
            .frames
            .iter()
            .find(|f| matches!(f.origin, Some(FrameOrigin::PromiseValue { .. })))
            .unwrap();
        let value = match &promise.origin {
            Some(FrameOrigin::PromiseValue { value, .. }) => value.unwrap(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(out.expr_table.get(value).unwrap().span.slice(html), "fetchUser()");
        assert_eq!(frame_of(&out, html, "fetchUser()"), FrameId::ROOT);

        let then = frame_of(&out, html, "${user.name}");
        let then_frame = out.scope.frame(then).unwrap();
        assert_eq!(then_frame.parent, Some(promise.id));
        assert_eq!(then_frame.symbol("user").unwrap().alias_kind, Some(AliasSource::Fulfilled));
        match &then_frame.origin {
            Some(FrameOrigin::PromiseBranch { promise: source, .. }) => assert_eq!(*source, Some(value)),
            other => panic!("unexpected {other:?}"),
        }

        let catch = out.scope.frame(frame_of(&out, html, "${error.message}")).unwrap();
        assert_eq!(catch.symbol("error").unwrap().alias_kind, Some(AliasSource::Rejected));
        assert_eq!(out.scope.frames.len(), 4);
    }

    #[test]
    fn with_overlay_stops_at_value() {
        let html = "<div with.bind=\"account\"><p repeat.for=\"tx of history\">${tx.amount} ${currency} ${$parent.owner}</p></div>";
        let out = compile(html);
        let overlay = out.scope.frames.iter().find(|f| f.is_value_overlay()).unwrap();
        let overlay_value = overlay.overlay.unwrap();
        assert_eq!(out.expr_table.get(overlay_value).unwrap().span.slice(html), "account");

        let text = frame_of(&out, html, "${tx.amount} ${currency} ${$parent.owner}");
        assert_eq!(out.scope.resolve(text, "currency"), Resolution::Overlay { frame: overlay.id });
        assert_eq!(out.scope.ancestor(text, 1), Some(overlay.id));
        assert_eq!(out.scope.ancestor(text, 2), Some(FrameId::ROOT));
        assert_eq!(out.scope.chain(text).len(), 3);
    }

    #[test]
    fn every_expression_has_a_frame() {
        let html = "<template>\
            <let greeting=\"Hi ${name}\"></let>\
            <ul><li repeat.for=\"[k, v] of entries; key: k\" click.trigger=\"pick(k)\">${k}=${v}</li></ul>\
            <div switch.bind=\"mode\"><span case=\"a\">${a}</span></div></template>";
        let out = compile(html);
        for entry in out.expr_table.iter() {
            assert!(out.scope.expr_to_frame.contains_key(&entry.id), "unmapped {}", entry.span.slice(html));
        }
        assert_eq!(frame_of(&out, html, "pick(k)"), FrameId::new(1));
    }

    #[test]
    fn scope_module_serializes_with_tagged_origins() {
        let out = compile("<li repeat.for=\"item of items\">${item}</li>");
        let json = serde_json::to_value(&out.scope).unwrap();
        assert_eq!(json["frames"][1]["origin"]["kind"], "iterator");
        assert_eq!(json["frames"][1]["origin"]["controller"], "repeat");
        assert!(json["frames"][1]["origin"]["forOf"].is_number());
        assert_eq!(json["frames"][0]["kind"], "root");
    }
}
