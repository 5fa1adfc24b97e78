#![allow(dead_code)]

/**
 * ML Parser Test Utilities
 *
 * Flattens a parse tree into `(kind, text, depth)` rows so tree shapes can be
 * asserted as plain vectors.
 */
use au_compiler::ml_parser::{HtmlParser, Node, ParseTreeResult};

pub fn parse(source: &str) -> ParseTreeResult {
    HtmlParser::new().parse(source)
}

pub fn humanize(result: &ParseTreeResult) -> Vec<(&'static str, String, usize)> {
    let mut rows = Vec::new();
    for node in &result.root_nodes {
        humanize_node(node, 0, &mut rows);
    }
    rows
}

fn humanize_node(node: &Node, depth: usize, rows: &mut Vec<(&'static str, String, usize)>) {
    match node {
        Node::Element(element) => {
            rows.push(("element", element.name.clone(), depth));
            for attr in &element.attrs {
                rows.push(("attr", format!("{}={}", attr.name, attr.value), depth + 1));
            }
            for child in &element.children {
                humanize_node(child, depth + 1, rows);
            }
        }
        Node::Text(text) => rows.push(("text", text.value.clone(), depth)),
        Node::Comment(comment) => rows.push(("comment", comment.value.clone(), depth)),
    }
}

pub fn row(kind: &'static str, text: &str, depth: usize) -> (&'static str, String, usize) {
    (kind, text.to_string(), depth)
}
