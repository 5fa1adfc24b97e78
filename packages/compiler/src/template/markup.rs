//! Small HTML writer shared by the AOT skeleton and SSR renderers.
//!
//! Text and attribute values hold decoded character references, so they are
//! re-escaped on the way out.

use crate::ml_parser::tags::{get_html_tag_definition, is_void_element, TagContentType};
use crate::template::ir::{DomAttr, DomNode};
use crate::util::escape_html_comment;

pub(crate) fn write_attr(out: &mut String, name: &str, value: Option<&str>) {
    out.push(' ');
    out.push_str(name);
    if let Some(value) = value {
        out.push_str("=\"");
        out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
        out.push('"');
    }
}

pub(crate) fn text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// `<script>` and `<style>` bodies go out verbatim. Returns false for other tags.
pub(crate) fn raw_text_children(out: &mut String, tag: &str, children: &[DomNode]) -> bool {
    if get_html_tag_definition(tag).content_type != TagContentType::RawText {
        return false;
    }
    for child in children {
        if let DomNode::Text(text) = child {
            out.push_str(&text.text);
        }
    }
    true
}

pub(crate) fn open_tag(out: &mut String, tag: &str, attrs: &[DomAttr], extra: &[(&str, String)]) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        write_attr(out, &attr.name, attr.value.as_deref());
    }
    for (name, value) in extra {
        write_attr(out, name, Some(value));
    }
    out.push('>');
}

pub(crate) fn close_tag(out: &mut String, tag: &str) {
    if is_void_element(tag) {
        return;
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

pub(crate) fn comment(out: &mut String, text: &str) {
    out.push_str("<!--");
    out.push_str(&escape_html_comment(text));
    out.push_str("-->");
}
