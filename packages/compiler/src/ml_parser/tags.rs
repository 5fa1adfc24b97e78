//! HTML Tag Definitions
//!
//! Parsing rules for the handful of HTML elements whose tree construction is not
//! purely driven by explicit end tags.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    /// `<script>`, `<style>`: no markup, no entities.
    RawText,
    /// `<textarea>`, `<title>`: no markup.
    EscapableRawText,
    ParsableData,
}

#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub is_void: bool,
    /// Opening one of these tags implicitly closes an open element of this kind.
    pub closed_by_children: Vec<&'static str>,
    pub content_type: TagContentType,
}

impl HtmlTagDefinition {
    fn new() -> Self {
        HtmlTagDefinition {
            is_void: false,
            closed_by_children: Vec::new(),
            content_type: TagContentType::ParsableData,
        }
    }

    fn void() -> Self {
        HtmlTagDefinition {
            is_void: true,
            ..Self::new()
        }
    }

    fn closed_by(children: &[&'static str]) -> Self {
        HtmlTagDefinition {
            closed_by_children: children.to_vec(),
            ..Self::new()
        }
    }

    fn content(content_type: TagContentType) -> Self {
        HtmlTagDefinition {
            content_type,
            ..Self::new()
        }
    }

    pub fn is_closed_by_child(&self, child: &str) -> bool {
        self.closed_by_children.iter().any(|c| *c == child)
    }
}

static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();
    for tag in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(tag, HtmlTagDefinition::void());
    }
    defs.insert(
        "p",
        HtmlTagDefinition::closed_by(&[
            "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer",
            "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main", "nav",
            "ol", "p", "pre", "section", "table", "ul",
        ]),
    );
    defs.insert("li", HtmlTagDefinition::closed_by(&["li"]));
    defs.insert("dt", HtmlTagDefinition::closed_by(&["dt", "dd"]));
    defs.insert("dd", HtmlTagDefinition::closed_by(&["dt", "dd"]));
    defs.insert("option", HtmlTagDefinition::closed_by(&["option", "optgroup"]));
    defs.insert("optgroup", HtmlTagDefinition::closed_by(&["optgroup"]));
    defs.insert("thead", HtmlTagDefinition::closed_by(&["tbody", "tfoot"]));
    defs.insert("tbody", HtmlTagDefinition::closed_by(&["tbody", "tfoot"]));
    defs.insert("tfoot", HtmlTagDefinition::closed_by(&["tbody"]));
    defs.insert("tr", HtmlTagDefinition::closed_by(&["tr"]));
    defs.insert("td", HtmlTagDefinition::closed_by(&["td", "th"]));
    defs.insert("th", HtmlTagDefinition::closed_by(&["td", "th"]));
    defs.insert("script", HtmlTagDefinition::content(TagContentType::RawText));
    defs.insert("style", HtmlTagDefinition::content(TagContentType::RawText));
    defs.insert("textarea", HtmlTagDefinition::content(TagContentType::EscapableRawText));
    defs.insert("title", HtmlTagDefinition::content(TagContentType::EscapableRawText));
    defs
});

static DEFAULT_TAG_DEFINITION: Lazy<HtmlTagDefinition> = Lazy::new(HtmlTagDefinition::new);

pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name)
        .or_else(|| TAG_DEFINITIONS.get(tag_name.to_ascii_lowercase().as_str()))
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}

pub fn is_void_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).is_void
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
    }

    #[test]
    fn test_implied_end_tags() {
        assert!(get_html_tag_definition("p").is_closed_by_child("div"));
        assert!(get_html_tag_definition("li").is_closed_by_child("li"));
        assert!(!get_html_tag_definition("div").is_closed_by_child("div"));
    }
}
