//! Attribute Syntax
//!
//! Splits an attribute name into binding target and command:
//! `value.bind`, `click.trigger:prevent`, `@click`, `:value`, `ref`.

use crate::parse_util::SourceSpan;

pub const PROPERTY_COMMANDS: &[&str] = &["bind", "one-time", "to-view", "from-view", "two-way"];

pub const KNOWN_COMMANDS: &[&str] = &[
    "bind", "one-time", "to-view", "from-view", "two-way", "trigger", "capture", "for", "ref", "attr", "style",
    "class",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSyntax {
    pub raw_name: String,
    pub target: String,
    pub command: Option<String>,
    /// Event modifier after `:` (`click.trigger:prevent`, `@keydown:enter`).
    pub modifier: Option<String>,
    /// Span of `target` relative to the start of the attribute name.
    pub target_range: (usize, usize),
}

impl AttrSyntax {
    pub fn target_span(&self, name_span: SourceSpan) -> SourceSpan {
        SourceSpan::new(name_span.start + self.target_range.0, name_span.start + self.target_range.1)
    }

    pub fn is_property_command(&self) -> bool {
        self.command
            .as_deref()
            .map_or(false, |c| PROPERTY_COMMANDS.contains(&c))
    }

    /// No command, or a property-binding-kind command.
    pub fn is_value_usage(&self) -> bool {
        self.command.is_none() || self.is_property_command()
    }

    pub fn is_known_command(&self) -> bool {
        self.command.as_deref().map_or(true, |c| KNOWN_COMMANDS.contains(&c))
    }
}

pub fn parse_attribute_name(name: &str) -> AttrSyntax {
    let plain = |target: &str, start: usize, command: Option<&str>, modifier: Option<&str>| AttrSyntax {
        raw_name: name.to_string(),
        target: target.to_string(),
        command: command.map(str::to_string),
        modifier: modifier.map(str::to_string),
        target_range: (start, start + target.len()),
    };

    if name == "ref" {
        return AttrSyntax {
            target_range: (0, 3),
            ..plain("element", 0, Some("ref"), None)
        };
    }
    if let Some(rest) = name.strip_prefix('@') {
        let (event, modifier) = split_modifier(rest);
        return plain(event, 1, Some("trigger"), modifier);
    }
    if let Some(rest) = name.strip_prefix(':') {
        if !rest.is_empty() {
            return plain(rest, 1, Some("bind"), None);
        }
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => {
            let (command, modifier) = split_modifier(&name[dot + 1..]);
            plain(&name[..dot], 0, Some(command), modifier)
        }
        _ => plain(name, 0, None, None),
    }
}

fn split_modifier(text: &str) -> (&str, Option<&str>) {
    match text.split_once(':') {
        Some((head, modifier)) if !modifier.is_empty() => (head, Some(modifier)),
        _ => (text, None),
    }
}

/// DOM property written by a binding to `attr` on a native element.
pub fn attr_to_property(tag: &str, attr: &str) -> String {
    let mapped = match attr {
        "class" => "className",
        "for" if tag == "label" => "htmlFor",
        "tabindex" => "tabIndex",
        "readonly" => "readOnly",
        "maxlength" => "maxLength",
        "minlength" => "minLength",
        "contenteditable" => "contentEditable",
        "colspan" => "colSpan",
        "rowspan" => "rowSpan",
        "innerhtml" | "inner-html" => "innerHTML",
        "textcontent" | "text-content" => "textContent",
        _ => return crate::util::dash_case_to_camel_case(attr),
    };
    mapped.to_string()
}

/// Multi-binding custom attribute values: `prop.bind: expr; other: literal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiBindingPart {
    pub target: String,
    pub command: Option<String>,
    pub value: String,
    /// Offsets relative to the start of the attribute value.
    pub target_range: (usize, usize),
    pub value_range: (usize, usize),
}

pub fn looks_like_multi_binding(value: &str) -> bool {
    if value.contains("${") {
        return false;
    }
    let Some(colon) = value.find(':') else {
        return false;
    };
    let head = value[..colon].trim();
    !value[colon..].starts_with("://")
        && !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '$')
}

/// Split `a.bind: x; b: y`. Also used for iterator tails (`key: id`).
pub fn split_multi_bindings(value: &str) -> Vec<MultiBindingPart> {
    let mut parts = Vec::new();
    let mut offset = 0;
    for segment in value.split(';') {
        let seg_start = offset;
        offset += segment.len() + 1;
        let Some(colon) = segment.find(':') else {
            continue;
        };
        let head = &segment[..colon];
        let name = head.trim();
        if name.is_empty() {
            continue;
        }
        let name_start = seg_start + head.find(name).unwrap_or(0);
        let raw_value = &segment[colon + 1..];
        let trimmed = raw_value.trim();
        let value_start = seg_start + colon + 1 + raw_value.find(trimmed).unwrap_or(0);
        let (target, command) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], Some(name[dot + 1..].to_string())),
            _ => (name, None),
        };
        parts.push(MultiBindingPart {
            target: target.to_string(),
            command,
            value: trimmed.to_string(),
            target_range: (name_start, name_start + target.len()),
            value_range: (value_start, value_start + trimmed.len()),
        });
    }
    parts
}
