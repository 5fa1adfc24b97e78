/**
 * Binding Expression Lexer
 *
 * Tokenizes attribute values and interpolation bodies. Offsets are byte offsets
 * relative to the start of the lexed input.
 */
use crate::chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    /// A whole `` `...` `` literal; `str_value` holds the raw text between the backticks.
    Template = 6,
    Error = 7,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, str_value: impl Into<String>) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value: 0.0,
            str_value: str_value.into(),
        }
    }

    pub fn number(index: usize, end: usize, value: f64, raw: &str) -> Self {
        Token {
            num_value: value,
            ..Token::new(index, end, TokenType::Number, raw)
        }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_template(&self) -> bool {
        self.token_type == TokenType::Template
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }

    /// Identifiers and keywords can both name a member (`a.in`, `{ of: 1 }`).
    pub fn is_identifier_like(&self) -> bool {
        matches!(self.token_type, TokenType::Identifier | TokenType::Keyword)
    }
}

pub const KEYWORDS: &[&str] = &[
    "true",
    "false",
    "null",
    "undefined",
    "this",
    "typeof",
    "void",
    "in",
    "instanceof",
    "of",
    "new",
];

const OPERATORS: &[&str] = &[
    "...", "===", "!==", "**=", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "**", "=>", "+=",
    "-=", "*=", "/=", "+", "-", "*", "/", "%", "<", ">", "=", "!", "&", "|", "?", "^",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut scanner = Scanner { input, pos: 0 };
        let mut tokens = Vec::new();
        while let Some(token) = scanner.scan_token() {
            let is_error = token.is_error();
            tokens.push(token);
            if is_error {
                break;
            }
        }
        tokens
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, skip: usize) -> char {
        self.input[self.pos..].chars().nth(skip).unwrap_or(chars::EOF)
    }

    fn bump(&mut self) -> char {
        let ch = self.peek();
        if ch != chars::EOF {
            self.pos += ch.len_utf8();
        }
        ch
    }

    fn scan_token(&mut self) -> Option<Token> {
        while chars::is_whitespace(self.peek()) {
            self.bump();
        }
        if self.pos >= self.input.len() {
            return None;
        }
        let start = self.pos;
        let ch = self.peek();

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier(start));
        }
        if chars::is_digit(ch) || (ch == chars::PERIOD && chars::is_digit(self.peek_at(1))) {
            return Some(self.scan_number(start));
        }
        match ch {
            chars::SQ | chars::DQ => return Some(self.scan_string(start, ch)),
            chars::BT => return Some(self.scan_template(start)),
            chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::LBRACE
            | chars::RBRACE
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => {
                self.bump();
                return Some(Token::new(start, self.pos, TokenType::Character, ch.to_string()));
            }
            chars::PERIOD if !self.input[self.pos..].starts_with("...") => {
                self.bump();
                return Some(Token::new(start, self.pos, TokenType::Character, "."));
            }
            _ => {}
        }

        let rest = &self.input[self.pos..];
        for op in OPERATORS {
            if rest.starts_with(op) {
                // `a?.5:1` is a conditional, not optional chaining.
                if *op == "?." && chars::is_digit(self.peek_at(2)) {
                    continue;
                }
                self.pos += op.len();
                return Some(Token::new(start, self.pos, TokenType::Operator, *op));
            }
        }

        self.bump();
        Some(Token::new(
            start,
            self.pos,
            TokenType::Error,
            format!("Unexpected character [{}]", ch),
        ))
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while chars::is_identifier_part(self.peek()) {
            self.bump();
        }
        let text = &self.input[start..self.pos];
        let token_type = if KEYWORDS.contains(&text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.pos, token_type, text)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        if self.peek() == '0' && matches!(self.peek_at(1), 'x' | 'X') {
            self.bump();
            self.bump();
            while chars::is_ascii_hex_digit(self.peek()) {
                self.bump();
            }
            let raw = &self.input[start..self.pos];
            return match i64::from_str_radix(&raw[2..], 16) {
                Ok(value) => Token::number(start, self.pos, value as f64, raw),
                Err(_) => Token::new(start, self.pos, TokenType::Error, "Invalid hex number"),
            };
        }
        while chars::is_digit(self.peek()) {
            self.bump();
        }
        if self.peek() == chars::PERIOD && chars::is_digit(self.peek_at(1)) {
            self.bump();
            while chars::is_digit(self.peek()) {
                self.bump();
            }
        }
        if matches!(self.peek(), 'e' | 'E') {
            let sign = self.peek_at(1);
            let skip = if sign == '+' || sign == '-' { 2 } else { 1 };
            if chars::is_digit(self.peek_at(skip)) {
                for _ in 0..skip {
                    self.bump();
                }
                while chars::is_digit(self.peek()) {
                    self.bump();
                }
            }
        }
        let raw = &self.input[start..self.pos];
        match raw.parse::<f64>() {
            Ok(value) => Token::number(start, self.pos, value, raw),
            Err(_) => Token::new(start, self.pos, TokenType::Error, format!("Invalid number {raw}")),
        }
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Token {
        self.bump();
        let mut value = String::new();
        loop {
            let ch = self.bump();
            match ch {
                chars::EOF => {
                    return Token::new(start, self.pos, TokenType::Error, "Unterminated quote");
                }
                c if c == quote => break,
                chars::BACKSLASH => match unescape(self) {
                    Some(c) => value.push(c),
                    None => {
                        return Token::new(start, self.pos, TokenType::Error, "Invalid escape sequence");
                    }
                },
                c => value.push(c),
            }
        }
        Token::new(start, self.pos, TokenType::String, value)
    }

    fn scan_template(&mut self, start: usize) -> Token {
        self.bump();
        let body_start = self.pos;
        match find_template_end(self.input, body_start) {
            Some(end) => {
                self.pos = end + 1;
                Token::new(start, self.pos, TokenType::Template, &self.input[body_start..end])
            }
            None => {
                self.pos = self.input.len();
                Token::new(start, self.pos, TokenType::Error, "Unterminated template literal")
            }
        }
    }
}

fn unescape(scanner: &mut Scanner<'_>) -> Option<char> {
    let ch = scanner.bump();
    Some(match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\x08',
        'f' => '\x0C',
        'v' => '\x0B',
        '0' => '\0',
        'u' => {
            let start = scanner.pos;
            for _ in 0..4 {
                if !chars::is_ascii_hex_digit(scanner.bump()) {
                    return None;
                }
            }
            let code = u32::from_str_radix(&scanner.input[start..scanner.pos], 16).ok()?;
            char::from_u32(code)?
        }
        chars::EOF => return None,
        other => other,
    })
}

/// Given an offset just past an opening backtick, returns the offset of the
/// closing backtick, skipping over `${ ... }` segments.
pub fn find_template_end(input: &str, from: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                i = find_expression_end(input, i + 2)? + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Given an offset just past `${`, returns the offset of the matching `}`.
/// Quotes and nested template literals are skipped.
pub fn find_expression_end(input: &str, from: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'`' => {
                i = find_template_end(input, i + 1)? + 1;
            }
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}
