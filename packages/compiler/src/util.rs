//! Utility Functions
//!
//! Name-case conversion and escaping helpers used by the resource catalog and the
//! emitters.

use once_cell::sync::Lazy;
use regex::Regex;

static DASH_CASE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+([a-z0-9])").unwrap());
static CAMEL_BOUNDARY_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])|([A-Z])([A-Z][a-z])").unwrap());

/// `data-grid` -> `dataGrid`
pub fn dash_case_to_camel_case(input: &str) -> String {
    DASH_CASE_REGEXP
        .replace_all(input, |caps: &regex::Captures| caps[1].to_uppercase())
        .into_owned()
}

/// `DataGrid` / `dataGrid` -> `data-grid`
pub fn camel_case_to_dash_case(input: &str) -> String {
    let split = CAMEL_BOUNDARY_REGEXP.replace_all(input, |caps: &regex::Captures| {
        match (caps.get(1), caps.get(2)) {
            (Some(a), Some(b)) => format!("{}-{}", a.as_str(), b.as_str()),
            _ => format!("{}-{}", &caps[3], &caps[4]),
        }
    });
    split.to_lowercase()
}

/// Quote a string as a TypeScript/JSON string literal.
pub fn quote_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Comment bodies may not contain `--`; collapse it so markers stay well-formed.
pub fn escape_html_comment(value: &str) -> String {
    value.replace("--", "- -").replace('>', "&gt;")
}
