/*
 * Character Codes
 *
 * Character constants and classification helpers shared by the markup and
 * expression lexers.
 */

pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const VTAB: char = '\x0B';
pub const FF: char = '\x0C';
pub const CR: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

pub const BANG: char = '!';
pub const DQ: char = '"';
pub const DOLLAR: char = '$';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const COMMA: char = ',';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const UNDERSCORE: char = '_';
pub const BT: char = '`';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, TAB | LF | VTAB | FF | CR | SPACE | NBSP)
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_ascii_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Expression identifiers: `$`, `_`, ASCII letters and any non-ASCII letter.
pub fn is_identifier_start(ch: char) -> bool {
    ch == DOLLAR || ch == UNDERSCORE || ch.is_ascii_alphabetic() || (!ch.is_ascii() && ch.is_alphabetic())
}

pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

/// Characters that terminate an HTML tag or attribute name.
pub fn is_name_end(ch: char) -> bool {
    is_whitespace(ch) || matches!(ch, GT | LT | SLASH | SQ | DQ | EQ | EOF)
}
