/**
 * Binding Expression Parser
 *
 * Recursive descent parser for template binding expressions, iterator headers
 * and `${}` interpolations. Parsing never fails outward: syntax errors are
 * returned as a `BadExpression` node spanning the whole input.
 */
use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::ast::*;
use super::lexer::{find_expression_end, Lexer, Token, TokenType};
use crate::parse_util::{ParseError, SourceSpan};

/// Globals resolved as `AccessGlobal`/`CallGlobal` instead of scope lookups.
static GLOBAL_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Infinity", "NaN", "isFinite", "isNaN", "parseFloat", "parseInt", "decodeURI",
        "decodeURIComponent", "encodeURI", "encodeURIComponent", "Array", "BigInt", "Boolean",
        "Date", "Map", "Number", "Object", "RegExp", "Set", "String", "JSON", "Math", "Intl",
    ]
    .into_iter()
    .collect()
});

const ASSIGN_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/="];

/// One piece of a split interpolation, offsets relative to the split input.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationPiece {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitInterpolation {
    pub strings: Vec<InterpolationPiece>,
    pub expressions: Vec<InterpolationPiece>,
}

#[derive(Debug, Clone)]
pub struct ParseResult {
    pub ast: Expr,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser { lexer: Lexer::new() }
    }

    /// Parse `input` as `expression_type`; spans are rebased by `base_offset`.
    /// Interpolation inputs without any `${` produce an `Interpolation` with a
    /// single literal part.
    pub fn parse(&self, input: &str, expression_type: ExpressionType, base_offset: usize) -> Expr {
        self.parse_with_errors(input, expression_type, base_offset).ast
    }

    pub fn parse_with_errors(
        &self,
        input: &str,
        expression_type: ExpressionType,
        base_offset: usize,
    ) -> ParseResult {
        if expression_type == ExpressionType::Interpolation {
            let ast = self
                .parse_interpolation(input, base_offset)
                .unwrap_or_else(|| {
                    Expr::Interpolation(Interpolation {
                        parts: vec![input.to_string()],
                        expressions: Vec::new(),
                        span: SourceSpan::new(base_offset, base_offset + input.len()),
                    })
                });
            let errors = collect_bad_expressions(&ast);
            return ParseResult { ast, errors };
        }

        match self.parse_root(input, expression_type, base_offset) {
            Ok(ast) => ParseResult {
                ast,
                errors: Vec::new(),
            },
            Err(error) => ParseResult {
                ast: Expr::BadExpression(BadExpression {
                    text: input.to_string(),
                    message: error.msg.clone(),
                    span: SourceSpan::new(base_offset, base_offset + input.len()),
                }),
                errors: vec![error],
            },
        }
    }

    /// Returns `None` when `input` contains no interpolation.
    pub fn parse_interpolation(&self, input: &str, base_offset: usize) -> Option<Expr> {
        let split = split_interpolation(input)?;
        let expressions = split
            .expressions
            .iter()
            .map(|piece| self.parse(&piece.text, ExpressionType::IsProperty, base_offset + piece.start))
            .collect();
        Some(Expr::Interpolation(Interpolation {
            parts: split.strings.into_iter().map(|s| s.text).collect(),
            expressions,
            span: SourceSpan::new(base_offset, base_offset + input.len()),
        }))
    }

    fn parse_root(
        &self,
        input: &str,
        expression_type: ExpressionType,
        base_offset: usize,
    ) -> Result<Expr, ParseError> {
        let tokens = self.lexer.tokenize(input);
        let mut ast = ParseAst::new(input, base_offset, tokens);
        ast.check_lex_errors()?;
        if ast.tokens.is_empty() {
            return match expression_type {
                ExpressionType::IsIterator => ast.error("Expected iterator declaration"),
                _ => Ok(Expr::PrimitiveLiteral(PrimitiveLiteral {
                    value: LiteralValue::String(String::new()),
                    span: SourceSpan::new(base_offset, base_offset),
                })),
            };
        }
        let result = match expression_type {
            ExpressionType::IsIterator => ast.parse_for_of()?,
            _ => ast.parse_binding_behavior()?,
        };
        if let Some(token) = ast.peek() {
            let tail_allowed = expression_type == ExpressionType::IsIterator && token.is_character(';');
            if !tail_allowed {
                return ast.error(format!("Unexpected token '{}'", token.str_value));
            }
        }
        Ok(result)
    }
}

/// Split `text` around `${ ... }` segments. Returns `None` when there is nothing
/// to interpolate or a segment is unterminated.
pub fn split_interpolation(text: &str) -> Option<SplitInterpolation> {
    let mut strings = Vec::new();
    let mut expressions = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;
    let bytes = text.as_bytes();
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'{' {
            let expr_start = i + 2;
            let expr_end = find_expression_end(text, expr_start)?;
            strings.push(InterpolationPiece {
                text: text[literal_start..i].to_string(),
                start: literal_start,
                end: i,
            });
            expressions.push(InterpolationPiece {
                text: text[expr_start..expr_end].to_string(),
                start: expr_start,
                end: expr_end,
            });
            i = expr_end + 1;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    if expressions.is_empty() {
        return None;
    }
    strings.push(InterpolationPiece {
        text: text[literal_start..].to_string(),
        start: literal_start,
        end: text.len(),
    });
    Some(SplitInterpolation { strings, expressions })
}

fn collect_bad_expressions(ast: &Expr) -> Vec<ParseError> {
    struct Collector(Vec<ParseError>);
    impl Visitor for Collector {
        fn visit_expr(&mut self, expr: &Expr) {
            if let Expr::BadExpression(bad) = expr {
                self.0.push(ParseError::new(bad.span, bad.message.clone()));
            }
            walk_expr(self, expr);
        }
    }
    let mut collector = Collector(Vec::new());
    collector.visit_expr(ast);
    collector.0
}

type PResult<T> = Result<T, ParseError>;

struct ParseAst<'a> {
    input: &'a str,
    base: usize,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> ParseAst<'a> {
    fn new(input: &'a str, base: usize, tokens: Vec<Token>) -> Self {
        ParseAst {
            input,
            base,
            tokens,
            index: 0,
        }
    }

    fn check_lex_errors(&self) -> PResult<()> {
        match self.tokens.iter().find(|t| t.is_error()) {
            Some(token) => Err(ParseError::new(
                SourceSpan::new(self.base + token.index, self.base + token.end),
                token.str_value.clone(),
            )),
            None => Ok(()),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_at(&self, skip: usize) -> Option<&Token> {
        self.tokens.get(self.index + skip)
    }

    /// Start of the current token (relative), or end of input.
    fn input_index(&self) -> usize {
        self.peek().map(|t| t.index).unwrap_or(self.input.len())
    }

    /// End of the last consumed token (relative).
    fn last_end(&self) -> usize {
        if self.index == 0 {
            0
        } else {
            self.tokens[self.index - 1].end
        }
    }

    fn span(&self, start: usize) -> SourceSpan {
        SourceSpan::new(self.base + start, self.base + self.last_end().max(start))
    }

    fn token_span(&self, token: &Token) -> SourceSpan {
        SourceSpan::new(self.base + token.index, self.base + token.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        let at = self.base + self.input_index();
        let end = self.peek().map(|t| self.base + t.end).unwrap_or(at);
        Err(ParseError::new(SourceSpan::new(at, end), message))
    }

    fn is_char(&self, ch: char) -> bool {
        self.peek().map(|t| t.is_character(ch)).unwrap_or(false)
    }

    fn is_op(&self, op: &str) -> bool {
        self.peek().map(|t| t.is_operator(op)).unwrap_or(false)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.peek().map(|t| t.is_keyword(keyword)).unwrap_or(false)
    }

    fn optional_char(&mut self, ch: char) -> bool {
        if self.is_char(ch) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn optional_op(&mut self, op: &str) -> bool {
        if self.is_op(op) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, ch: char) -> PResult<()> {
        if self.optional_char(ch) {
            Ok(())
        } else {
            self.error(format!("Missing expected {ch}"))
        }
    }

    fn expect_identifier(&mut self) -> PResult<Identifier> {
        match self.peek() {
            Some(token) if token.is_identifier_like() => {
                let token = token.clone();
                self.index += 1;
                Ok(Identifier::new(token.str_value.clone(), self.token_span(&token)))
            }
            _ => self.error("Expected identifier"),
        }
    }

    fn parse_binding_behavior(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let mut expr = self.parse_value_converter()?;
        while self.optional_op("&") {
            let name = self.expect_identifier()?;
            let args = self.parse_tail_args()?;
            expr = Expr::BindingBehavior(BindingBehavior {
                expression: Box::new(expr),
                name,
                args,
                span: self.span(start),
            });
        }
        Ok(expr)
    }

    fn parse_value_converter(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let mut expr = self.parse_assign()?;
        while self.optional_op("|") {
            let name = self.expect_identifier()?;
            let args = self.parse_tail_args()?;
            expr = Expr::ValueConverter(ValueConverter {
                expression: Box::new(expr),
                name,
                args,
                span: self.span(start),
            });
        }
        Ok(expr)
    }

    fn parse_tail_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        while self.optional_char(':') {
            args.push(self.parse_assign()?);
        }
        Ok(args)
    }

    fn parse_assign(&mut self) -> PResult<Expr> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        let start = self.input_index();
        let target = self.parse_conditional()?;
        let op = ASSIGN_OPERATORS.iter().copied().find(|op| self.is_op(op));
        if let Some(op) = op {
            if !target.is_assignable() {
                return self.error("Left hand side of expression is not assignable");
            }
            self.index += 1;
            let value = self.parse_assign()?;
            return Ok(Expr::Assign(Assign {
                target: Box::new(target),
                value: Box::new(value),
                op: op.to_string(),
                span: self.span(start),
            }));
        }
        Ok(target)
    }

    fn try_parse_arrow(&mut self) -> PResult<Option<Expr>> {
        let start = self.input_index();
        let is_single = self.peek().map(|t| t.is_identifier()).unwrap_or(false)
            && self.peek_at(1).map(|t| t.is_operator("=>")).unwrap_or(false);
        if is_single {
            let name = self.expect_identifier()?;
            self.index += 1;
            let body = self.parse_assign()?;
            let span = name.span;
            return Ok(Some(Expr::ArrowFunction(ArrowFunction {
                args: vec![BindingIdentifier { name, span }],
                body: Box::new(body),
                rest: false,
                span: self.span(start),
            })));
        }
        if !self.is_char('(') || !self.parenthesized_arrow_ahead() {
            return Ok(None);
        }
        self.index += 1;
        let mut args = Vec::new();
        let mut rest = false;
        while !self.is_char(')') {
            if rest {
                return self.error("A rest parameter must be last in a parameter list");
            }
            rest = self.optional_op("...");
            let name = self.expect_identifier()?;
            let span = name.span;
            args.push(BindingIdentifier { name, span });
            if !self.optional_char(',') {
                break;
            }
        }
        self.expect_char(')')?;
        if !self.optional_op("=>") {
            return self.error("Expected =>");
        }
        let body = self.parse_assign()?;
        Ok(Some(Expr::ArrowFunction(ArrowFunction {
            args,
            body: Box::new(body),
            rest,
            span: self.span(start),
        })))
    }

    /// Looks past the balanced parenthesis at the cursor for `=>`.
    fn parenthesized_arrow_ahead(&self) -> bool {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[self.index..].iter().enumerate() {
            if token.is_character('(') {
                depth += 1;
            } else if token.is_character(')') {
                depth -= 1;
                if depth == 0 {
                    return self
                        .peek_at(offset + 1)
                        .map(|t| t.is_operator("=>"))
                        .unwrap_or(false);
                }
            }
        }
        false
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let condition = self.parse_binary(0)?;
        if !self.optional_op("?") {
            return Ok(condition);
        }
        let yes = self.parse_assign()?;
        self.expect_char(':')?;
        let no = self.parse_assign()?;
        Ok(Expr::Conditional(Conditional {
            condition: Box::new(condition),
            yes: Box::new(yes),
            no: Box::new(no),
            span: self.span(start),
        }))
    }

    fn binary_precedence(&self) -> Option<(u8, String)> {
        let token = self.peek()?;
        let precedence = match token.token_type {
            TokenType::Operator => match token.str_value.as_str() {
                "??" => 1,
                "||" => 2,
                "&&" => 3,
                "==" | "!=" | "===" | "!==" => 4,
                "<" | ">" | "<=" | ">=" => 5,
                "+" | "-" => 6,
                "*" | "/" | "%" => 7,
                "**" => 8,
                _ => return None,
            },
            TokenType::Keyword => match token.str_value.as_str() {
                "instanceof" | "in" => 5,
                _ => return None,
            },
            _ => return None,
        };
        Some((precedence, token.str_value.clone()))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let start = self.input_index();
        let mut left = self.parse_unary()?;
        while let Some((precedence, operation)) = self.binary_precedence() {
            if precedence <= min_precedence {
                break;
            }
            self.index += 1;
            // `**` is right-associative.
            let next_min = if operation == "**" { precedence - 1 } else { precedence };
            let right = self.parse_binary(next_min)?;
            left = Expr::Binary(Binary {
                operation,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span(start),
            });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let operation = match self.peek() {
            Some(t) if t.is_operator("!") || t.is_operator("-") || t.is_operator("+") => {
                Some(t.str_value.clone())
            }
            Some(t) if t.is_keyword("typeof") || t.is_keyword("void") => Some(t.str_value.clone()),
            _ => None,
        };
        match operation {
            Some(operation) => {
                self.index += 1;
                let expression = self.parse_unary()?;
                Ok(Expr::Unary(Unary {
                    operation,
                    expression: Box::new(expression),
                    span: self.span(start),
                }))
            }
            None => self.parse_left_hand_side(),
        }
    }

    fn parse_left_hand_side(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let mut expr = self.parse_primary()?;
        loop {
            if self.optional_char('.') {
                let name = self.expect_identifier()?;
                expr = self.member(expr, name, false, start);
            } else if self.optional_op("?.") {
                if self.optional_char('[') {
                    let key = self.parse_assign()?;
                    self.expect_char(']')?;
                    expr = self.keyed(expr, key, true, start);
                } else if self.is_char('(') {
                    let args = self.parse_call_args()?;
                    expr = self.call(expr, args, true, start);
                } else {
                    let name = self.expect_identifier()?;
                    expr = self.member(expr, name, true, start);
                }
            } else if self.optional_char('[') {
                let key = self.parse_assign()?;
                self.expect_char(']')?;
                expr = self.keyed(expr, key, false, start);
            } else if self.is_char('(') {
                let args = self.parse_call_args()?;
                expr = self.call(expr, args, false, start);
            } else if let Some(token) = self.peek().filter(|t| t.is_template()).cloned() {
                self.index += 1;
                let (cooked, expressions) = self.parse_template_parts(&token)?;
                expr = Expr::TaggedTemplate(TaggedTemplate {
                    func: Box::new(expr),
                    cooked,
                    expressions,
                    span: self.span(start),
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn member(&self, object: Expr, name: Identifier, optional: bool, start: usize) -> Expr {
        let span = self.span(start);
        match object {
            Expr::AccessThis(this) if !optional && name.name == "$parent" => {
                Expr::AccessThis(AccessThis {
                    ancestor: this.ancestor + 1,
                    span,
                })
            }
            Expr::AccessThis(this) if !optional => Expr::AccessScope(AccessScope {
                name,
                ancestor: this.ancestor,
                span,
            }),
            object => Expr::AccessMember(AccessMember {
                object: Box::new(object),
                name,
                optional,
                span,
            }),
        }
    }

    fn keyed(&self, object: Expr, key: Expr, optional: bool, start: usize) -> Expr {
        Expr::AccessKeyed(AccessKeyed {
            object: Box::new(object),
            key: Box::new(key),
            optional,
            span: self.span(start),
        })
    }

    fn call(&self, callee: Expr, args: Vec<Expr>, optional: bool, start: usize) -> Expr {
        let span = self.span(start);
        match callee {
            Expr::AccessScope(scope) => Expr::CallScope(CallScope {
                name: scope.name,
                args,
                ancestor: scope.ancestor,
                optional,
                span,
            }),
            Expr::AccessMember(member) => Expr::CallMember(CallMember {
                object: member.object,
                name: member.name,
                args,
                optional_member: member.optional,
                optional_call: optional,
                span,
            }),
            Expr::AccessGlobal(global) if !optional => Expr::CallGlobal(CallGlobal {
                name: global.name,
                args,
                span,
            }),
            func => Expr::CallFunction(CallFunction {
                func: Box::new(func),
                args,
                optional,
                span,
            }),
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect_char('(')?;
        let mut args = Vec::new();
        while !self.is_char(')') {
            args.push(self.parse_assign()?);
            if !self.optional_char(',') {
                break;
            }
        }
        self.expect_char(')')?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return self.error("Unexpected end of expression"),
        };
        let span = self.token_span(&token);
        match token.token_type {
            TokenType::Identifier => {
                self.index += 1;
                let name = Identifier::new(token.str_value.clone(), span);
                Ok(match token.str_value.as_str() {
                    "$this" => Expr::AccessThis(AccessThis { ancestor: 0, span }),
                    "$parent" => Expr::AccessThis(AccessThis { ancestor: 1, span }),
                    "$host" => Expr::AccessBoundary(AccessBoundary { span }),
                    n if GLOBAL_NAMES.contains(n) => Expr::AccessGlobal(AccessGlobal { name, span }),
                    _ => Expr::AccessScope(AccessScope {
                        name,
                        ancestor: 0,
                        span,
                    }),
                })
            }
            TokenType::Keyword => {
                let value = match token.str_value.as_str() {
                    "true" => LiteralValue::Boolean(true),
                    "false" => LiteralValue::Boolean(false),
                    "null" => LiteralValue::Null,
                    "undefined" => LiteralValue::Undefined,
                    "this" => {
                        self.index += 1;
                        return Ok(Expr::AccessBoundary(AccessBoundary { span }));
                    }
                    other => return self.error(format!("Unexpected keyword '{other}'")),
                };
                self.index += 1;
                Ok(Expr::PrimitiveLiteral(PrimitiveLiteral { value, span }))
            }
            TokenType::Number => {
                self.index += 1;
                Ok(Expr::PrimitiveLiteral(PrimitiveLiteral {
                    value: LiteralValue::Number(token.num_value),
                    span,
                }))
            }
            TokenType::String => {
                self.index += 1;
                Ok(Expr::PrimitiveLiteral(PrimitiveLiteral {
                    value: LiteralValue::String(token.str_value.clone()),
                    span,
                }))
            }
            TokenType::Template => {
                self.index += 1;
                let (cooked, expressions) = self.parse_template_parts(&token)?;
                Ok(Expr::Template(TemplateExpression {
                    cooked,
                    expressions,
                    span,
                }))
            }
            TokenType::Character if token.is_character('(') => {
                self.index += 1;
                let expression = self.parse_assign()?;
                self.expect_char(')')?;
                Ok(Expr::Paren(Paren {
                    expression: Box::new(expression),
                    span: self.span(start),
                }))
            }
            TokenType::Character if token.is_character('[') => {
                self.index += 1;
                let mut elements = Vec::new();
                while !self.is_char(']') {
                    elements.push(self.parse_assign()?);
                    if !self.optional_char(',') {
                        break;
                    }
                }
                self.expect_char(']')?;
                Ok(Expr::ArrayLiteral(ArrayLiteral {
                    elements,
                    span: self.span(start),
                }))
            }
            TokenType::Character if token.is_character('{') => self.parse_object_literal(start),
            _ => self.error(format!("Unexpected token '{}'", token.str_value)),
        }
    }

    fn parse_object_literal(&mut self, start: usize) -> PResult<Expr> {
        self.expect_char('{')?;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        while !self.is_char('}') {
            let token = match self.advance() {
                Some(token) => token,
                None => return self.error("Unterminated object literal"),
            };
            let key_span = self.token_span(&token);
            let (name, quoted) = match token.token_type {
                TokenType::Identifier | TokenType::Keyword => (token.str_value.clone(), false),
                TokenType::String => (token.str_value.clone(), true),
                TokenType::Number => (token.str_value.clone(), false),
                _ => return self.error("Invalid object literal key"),
            };
            if self.optional_char(':') {
                values.push(self.parse_assign()?);
            } else if token.token_type == TokenType::Identifier {
                values.push(Expr::AccessScope(AccessScope {
                    name: Identifier::new(name.clone(), key_span),
                    ancestor: 0,
                    span: key_span,
                }));
            } else {
                return self.error("Expected ':' after object literal key");
            }
            keys.push(ObjectKey {
                name,
                quoted,
                span: key_span,
            });
            if !self.optional_char(',') {
                break;
            }
        }
        self.expect_char('}')?;
        Ok(Expr::ObjectLiteral(ObjectLiteral {
            keys,
            values,
            span: self.span(start),
        }))
    }

    fn parse_template_parts(&self, token: &Token) -> PResult<(Vec<String>, Vec<Expr>)> {
        let raw = token.str_value.as_str();
        // Absolute offset of the first character after the opening backtick.
        let body_base = self.base + token.index + 1;
        let mut cooked = Vec::new();
        let mut expressions = Vec::new();
        let mut current = String::new();
        let mut i = 0;
        let bytes = raw.as_bytes();
        while i < bytes.len() {
            if bytes[i] == b'\\' && i + 1 < bytes.len() {
                let escaped = raw[i + 1..].chars().next().unwrap_or('\\');
                current.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                i += 1 + escaped.len_utf8();
            } else if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
                let expr_start = i + 2;
                let expr_end = match find_expression_end(raw, expr_start) {
                    Some(end) => end,
                    None => return self.error("Unterminated template expression"),
                };
                let tokens = Lexer::new().tokenize(&raw[expr_start..expr_end]);
                let mut nested = ParseAst::new(&raw[expr_start..expr_end], body_base + expr_start, tokens);
                nested.check_lex_errors()?;
                let expression = nested.parse_assign()?;
                if let Some(extra) = nested.peek() {
                    return Err(ParseError::new(
                        nested.token_span(extra),
                        format!("Unexpected token '{}'", extra.str_value),
                    ));
                }
                expressions.push(expression);
                cooked.push(std::mem::take(&mut current));
                i = expr_end + 1;
            } else {
                let ch = raw[i..].chars().next().unwrap_or_default();
                current.push(ch);
                i += ch.len_utf8().max(1);
            }
        }
        cooked.push(current);
        Ok((cooked, expressions))
    }

    fn parse_for_of(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let declaration = self.parse_binding_target()?;
        if !self.is_keyword("of") {
            return self.error("Expected 'of' in iterator declaration");
        }
        self.index += 1;
        let iterable = self.parse_binding_behavior()?;
        let semi_idx = match self.peek() {
            Some(token) if token.is_character(';') => token.index as isize,
            _ => -1,
        };
        Ok(Expr::ForOfStatement(ForOfStatement {
            declaration: Box::new(declaration),
            iterable: Box::new(iterable),
            semi_idx,
            span: self.span(start),
        }))
    }

    fn parse_binding_target(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        if self.optional_char('[') {
            let mut elements = Vec::new();
            let mut rest = None;
            loop {
                if self.is_char(']') {
                    break;
                }
                if self.is_char(',') {
                    let at = self.base + self.input_index();
                    self.index += 1;
                    elements.push(Expr::BindingPatternHole(BindingPatternHole {
                        span: SourceSpan::empty(at),
                    }));
                    continue;
                }
                if self.optional_op("...") {
                    rest = Some(Box::new(self.parse_binding_target()?));
                    break;
                }
                elements.push(self.parse_binding_element()?);
                if !self.optional_char(',') {
                    break;
                }
            }
            self.expect_char(']')?;
            return Ok(Expr::ArrayBindingPattern(ArrayBindingPattern {
                elements,
                rest,
                span: self.span(start),
            }));
        }
        if self.optional_char('{') {
            let mut properties = Vec::new();
            let mut rest = None;
            while !self.is_char('}') {
                if self.optional_op("...") {
                    rest = Some(Box::new(self.parse_binding_target()?));
                    break;
                }
                let key_token = match self.peek() {
                    Some(t) if t.is_identifier_like() || t.is_string() => t.clone(),
                    _ => return self.error("Expected property name in object pattern"),
                };
                self.index += 1;
                let key_span = self.token_span(&key_token);
                let value = if self.optional_char(':') {
                    self.parse_binding_element()?
                } else {
                    let name = Identifier::new(key_token.str_value.clone(), key_span);
                    let target = Expr::BindingIdentifier(BindingIdentifier { name, span: key_span });
                    self.with_default(target, key_token.index)?
                };
                properties.push(BindingPatternProperty {
                    key: key_token.str_value.clone(),
                    key_span,
                    value,
                });
                if !self.optional_char(',') {
                    break;
                }
            }
            self.expect_char('}')?;
            return Ok(Expr::ObjectBindingPattern(ObjectBindingPattern {
                properties,
                rest,
                span: self.span(start),
            }));
        }
        match self.peek() {
            Some(token) if token.is_identifier() => {
                let name = self.expect_identifier()?;
                let span = name.span;
                Ok(Expr::BindingIdentifier(BindingIdentifier { name, span }))
            }
            _ => self.error("Expected binding identifier or pattern"),
        }
    }

    fn parse_binding_element(&mut self) -> PResult<Expr> {
        let start = self.input_index();
        let target = self.parse_binding_target()?;
        self.with_default(target, start)
    }

    fn with_default(&mut self, target: Expr, start: usize) -> PResult<Expr> {
        if !self.optional_op("=") {
            return Ok(target);
        }
        let default = self.parse_assign()?;
        Ok(Expr::BindingPatternDefault(BindingPatternDefault {
            target: Box::new(target),
            default: Box::new(default),
            span: self.span(start),
        }))
    }
}
