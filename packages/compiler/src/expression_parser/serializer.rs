/**
 * Binding Expression Serializer
 *
 * Prints an AST back to canonical binding syntax.
 */
use super::ast::*;

pub fn serialize(ast: &Expr) -> String {
    let mut visitor = SerializeExpressionVisitor;
    visit_ast(&mut visitor, ast)
}

struct SerializeExpressionVisitor;

fn visit_ast(visitor: &mut SerializeExpressionVisitor, ast: &Expr) -> String {
    match ast {
        Expr::AccessThis(a) => visitor.visit_access_this(a),
        Expr::AccessBoundary(_) => "this".to_string(),
        Expr::AccessScope(a) => format!("{}{}", parent_prefix(a.ancestor), a.name.name),
        Expr::AccessGlobal(a) => a.name.name.clone(),
        Expr::AccessMember(a) => format!(
            "{}{}{}",
            visit_ast(visitor, &a.object),
            if a.optional { "?." } else { "." },
            a.name.name
        ),
        Expr::AccessKeyed(a) => format!(
            "{}{}[{}]",
            visit_ast(visitor, &a.object),
            if a.optional { "?." } else { "" },
            visit_ast(visitor, &a.key)
        ),
        Expr::CallScope(c) => format!(
            "{}{}{}({})",
            parent_prefix(c.ancestor),
            c.name.name,
            if c.optional { "?." } else { "" },
            visitor.visit_list(&c.args)
        ),
        Expr::CallMember(c) => format!(
            "{}{}{}{}({})",
            visit_ast(visitor, &c.object),
            if c.optional_member { "?." } else { "." },
            c.name.name,
            if c.optional_call { "?." } else { "" },
            visitor.visit_list(&c.args)
        ),
        Expr::CallFunction(c) => format!(
            "{}{}({})",
            visit_ast(visitor, &c.func),
            if c.optional { "?." } else { "" },
            visitor.visit_list(&c.args)
        ),
        Expr::CallGlobal(c) => format!("{}({})", c.name.name, visitor.visit_list(&c.args)),
        Expr::Unary(u) => visitor.visit_unary(u),
        Expr::Binary(b) => format!(
            "{} {} {}",
            visit_ast(visitor, &b.left),
            b.operation,
            visit_ast(visitor, &b.right)
        ),
        Expr::Conditional(c) => format!(
            "{} ? {} : {}",
            visit_ast(visitor, &c.condition),
            visit_ast(visitor, &c.yes),
            visit_ast(visitor, &c.no)
        ),
        Expr::Assign(a) => format!(
            "{} {} {}",
            visit_ast(visitor, &a.target),
            a.op,
            visit_ast(visitor, &a.value)
        ),
        Expr::ArrowFunction(f) => visitor.visit_arrow(f),
        Expr::ValueConverter(v) => format!(
            "{} | {}{}",
            visit_ast(visitor, &v.expression),
            v.name.name,
            visitor.visit_tail_args(&v.args)
        ),
        Expr::BindingBehavior(b) => format!(
            "{} & {}{}",
            visit_ast(visitor, &b.expression),
            b.name.name,
            visitor.visit_tail_args(&b.args)
        ),
        Expr::PrimitiveLiteral(p) => visitor.visit_literal(&p.value),
        Expr::ArrayLiteral(a) => format!("[{}]", visitor.visit_list(&a.elements)),
        Expr::ObjectLiteral(o) => visitor.visit_object(o),
        Expr::Template(t) => format!("`{}`", visitor.visit_template(&t.cooked, &t.expressions)),
        Expr::TaggedTemplate(t) => format!(
            "{}`{}`",
            visit_ast(visitor, &t.func),
            visitor.visit_template(&t.cooked, &t.expressions)
        ),
        Expr::Paren(p) => format!("({})", visit_ast(visitor, &p.expression)),
        Expr::Interpolation(i) => visitor.visit_template(&i.parts, &i.expressions),
        Expr::ForOfStatement(f) => format!(
            "{} of {}",
            visit_ast(visitor, &f.declaration),
            visit_ast(visitor, &f.iterable)
        ),
        Expr::BindingIdentifier(b) => b.name.name.clone(),
        Expr::ArrayBindingPattern(p) => visitor.visit_array_pattern(p),
        Expr::ObjectBindingPattern(p) => visitor.visit_object_pattern(p),
        Expr::BindingPatternDefault(d) => format!(
            "{} = {}",
            visit_ast(visitor, &d.target),
            visit_ast(visitor, &d.default)
        ),
        Expr::BindingPatternHole(_) => String::new(),
        Expr::BadExpression(b) => b.text.clone(),
    }
}

fn parent_prefix(ancestor: u32) -> String {
    "$parent.".repeat(ancestor as usize)
}

impl SerializeExpressionVisitor {
    fn visit_access_this(&mut self, ast: &AccessThis) -> String {
        match ast.ancestor {
            0 => "$this".to_string(),
            n => vec!["$parent"; n as usize].join("."),
        }
    }

    fn visit_unary(&mut self, ast: &Unary) -> String {
        let operand = visit_ast(self, &ast.expression);
        match ast.operation.as_str() {
            "typeof" | "void" => format!("{} {}", ast.operation, operand),
            _ => format!("{}{}", ast.operation, operand),
        }
    }

    fn visit_list(&mut self, items: &[Expr]) -> String {
        items
            .iter()
            .map(|e| visit_ast(self, e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn visit_tail_args(&mut self, args: &[Expr]) -> String {
        args.iter().map(|a| format!(":{}", visit_ast(self, a))).collect()
    }

    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
        }
    }

    fn visit_object(&mut self, ast: &ObjectLiteral) -> String {
        let entries = ast
            .keys
            .iter()
            .zip(&ast.values)
            .map(|(key, value)| {
                let key = if key.quoted {
                    format!("'{}'", key.name)
                } else {
                    key.name.clone()
                };
                format!("{}: {}", key, visit_ast(self, value))
            })
            .collect::<Vec<_>>();
        format!("{{{}}}", entries.join(", "))
    }

    fn visit_template(&mut self, cooked: &[String], expressions: &[Expr]) -> String {
        let mut out = String::new();
        for (i, part) in cooked.iter().enumerate() {
            out.push_str(part);
            if let Some(expr) = expressions.get(i) {
                out.push_str("${");
                out.push_str(&visit_ast(self, expr));
                out.push('}');
            }
        }
        out
    }

    fn visit_arrow(&mut self, ast: &ArrowFunction) -> String {
        let last = ast.args.len().saturating_sub(1);
        let params = ast
            .args
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if ast.rest && i == last {
                    format!("...{}", a.name.name)
                } else {
                    a.name.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("({}) => {}", params, visit_ast(self, &ast.body))
    }

    fn visit_array_pattern(&mut self, ast: &ArrayBindingPattern) -> String {
        let mut parts: Vec<String> = ast.elements.iter().map(|e| visit_ast(self, e)).collect();
        if let Some(rest) = &ast.rest {
            parts.push(format!("...{}", visit_ast(self, rest)));
        }
        format!("[{}]", parts.join(", "))
    }

    fn visit_object_pattern(&mut self, ast: &ObjectBindingPattern) -> String {
        let mut parts: Vec<String> = ast
            .properties
            .iter()
            .map(|p| match &p.value {
                Expr::BindingIdentifier(b) if b.name.name == p.key => p.key.clone(),
                value => format!("{}: {}", p.key, visit_ast(self, value)),
            })
            .collect();
        if let Some(rest) = &ast.rest {
            parts.push(format!("...{}", visit_ast(self, rest)));
        }
        format!("{{{}}}", parts.join(", "))
    }
}
