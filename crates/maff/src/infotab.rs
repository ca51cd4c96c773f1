//! Renders the `InfoTab` letter's key-value fields as a minimal static
//! `info.html` page.
//!
//! Grounded in `lemmiwinks.archive.archive.InfoTabLetter`/`pharty2.py`: a
//! handful of fields (original URL, archive time, recursion depth
//! reached, asset counts) shown on one page, with no templating engine
//! pulled in for a fixed handful of rows.

use std::collections::BTreeMap;
use std::fmt::Write as _;

#[must_use]
pub fn render(fields: &BTreeMap<String, String>) -> String {
    let mut body = String::new();
    for (key, value) in fields {
        let _ = writeln!(body, "    <tr><th>{}</th><td>{}</td></tr>", escape(key), escape(value));
    }
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Archive info</title></head><body>\n  <table>\n{body}  </table>\n</body></html>\n"
    )
}

fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
