//! Markup Parser Module
//!
//! Span-preserving HTML tokenizer and tree builder.

pub mod ast;
pub mod entities;
pub mod lexer;
pub mod parser;
pub mod tags;

pub use ast::{Attribute, Comment, Element, Node, Text};
pub use entities::decode_entities;
pub use parser::{HtmlParser, ParseTreeResult};
