//! Document-level facts migration drivers need before they can start
//! rewriting references: the page title (for the RDF `title` field), the
//! declared charset (for decoding byte bodies), and a `<base href>`
//! override that changes what relative references resolve against.

use crate::dom::Dom;

/// Title text, declared `<base href>`, and declared charset, each
/// `None` when the document doesn't say.
#[derive(Debug, Default, Clone)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub base_href: Option<String>,
    pub charset: Option<String>,
}

#[must_use]
pub fn extract(dom: &Dom) -> DocumentMetadata {
    DocumentMetadata {
        title: extract_title(dom),
        base_href: extract_base_href(dom),
        charset: extract_charset(dom),
    }
}

fn extract_title(dom: &Dom) -> Option<String> {
    let title_node = dom.find_element("title")?;
    let text = dom
        .children(title_node)
        .into_iter()
        .filter_map(|id| dom.node(id).and_then(|n| n.text().map(ToOwned::to_owned)))
        .collect::<Vec<_>>()
        .join("");
    (!text.is_empty()).then_some(text)
}

fn extract_base_href(dom: &Dom) -> Option<String> {
    let base_node = dom.find_element("base")?;
    dom.node(base_node)?.attr("href").map(ToOwned::to_owned)
}

fn extract_charset(dom: &Dom) -> Option<String> {
    for meta in dom.find_elements("meta") {
        let Some(node) = dom.node(meta) else { continue };
        if let Some(charset) = node.attr("charset") {
            return Some(charset.to_owned());
        }
        if node.attr("http-equiv").is_some_and(|v| v.eq_ignore_ascii_case("content-type")) {
            if let Some(content) = node.attr("content") {
                if let Some(pos) = content.to_ascii_lowercase().find("charset=") {
                    return Some(content[pos + "charset=".len()..].trim().to_owned());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn extracts_title_base_and_charset() {
        let dom = parse(
            b"<html><head><title>Hello</title><base href=\"https://example.test/x/\">\
              <meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\"></head><body></body></html>",
        );
        let meta = extract(&dom);
        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(meta.base_href.as_deref(), Some("https://example.test/x/"));
        assert_eq!(meta.charset.as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn missing_metadata_yields_none() {
        let dom = parse(b"<html><body></body></html>");
        let meta = extract(&dom);
        assert!(meta.title.is_none());
        assert!(meta.base_href.is_none());
        assert!(meta.charset.is_none());
    }
}
