//! Expression Parser Module
//!
//! Lexer, parser and AST for template binding expressions.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{split_interpolation, ParseResult, Parser};
pub use serializer::serialize;
