//! The element/attribute table `HTMLMigration` walks, and the closed
//! list of event-handler attributes js-execution mode clears.
//!
//! Grounded directly in `lemmiwinks.archive.migration.migrate`'s
//! `HTMLFilter`, which enumerates exactly these tag/attribute pairs
//! rather than a generic "any attribute that looks like a URL" scan.

/// One tag's reference-bearing attributes.
pub struct ElementRule {
    pub tag: &'static str,
    pub attrs: &'static [&'static str],
}

/// Elements whose listed attributes are plain downloadable references
/// (images, media, embeds — never recursive).
pub const BLOB_ELEMENTS: &[ElementRule] = &[
    ElementRule {
        tag: "img",
        attrs: &["src", "data-src"],
    },
    ElementRule {
        tag: "video",
        attrs: &["src", "poster"],
    },
    ElementRule {
        tag: "embed",
        attrs: &["src"],
    },
    ElementRule {
        tag: "source",
        attrs: &["src"],
    },
    ElementRule {
        tag: "audio",
        attrs: &["src"],
    },
    ElementRule {
        tag: "input",
        attrs: &["src"],
    },
    ElementRule {
        tag: "track",
        attrs: &["src"],
    },
    ElementRule {
        tag: "object",
        attrs: &["data", "codebase"],
    },
];

/// `<link rel="stylesheet" href="...">`: recursive, via `CSSFileHandler`.
pub const STYLESHEET_LINK_TAG: &str = "link";
pub const STYLESHEET_LINK_REL: &str = "stylesheet";
pub const STYLESHEET_LINK_ATTR: &str = "href";

/// `<script src="...">`: download (no-js mode) or neutralize (js mode).
pub const SCRIPT_TAG: &str = "script";
pub const SCRIPT_SRC_ATTR: &str = "src";

/// `<style>...</style>`: inner text migrated via `CssStyleHandler`.
pub const STYLE_ELEMENT_TAG: &str = "style";

/// Any element's `style="..."` attribute: migrated via
/// `CssDeclarationHandler`.
pub const STYLE_ATTR: &str = "style";

/// `<frame>`/`<iframe>`: recursive, via `HTMLFileHandler`.
pub const FRAME_TAGS: &[&str] = &["frame", "iframe"];
pub const FRAME_SRC_ATTR: &str = "src";

/// Event-handler attributes js-execution mode clears, since their
/// behavior was already exercised by the headless browser before the
/// document was captured.
pub const EVENT_ATTRS: &[&str] = &[
    "onclick",
    "ondblclick",
    "onmousedown",
    "onmouseup",
    "onmouseover",
    "onmousemove",
    "onmouseout",
    "onkeypress",
    "onkeydown",
    "onkeyup",
    "onload",
    "onunload",
    "onabort",
    "onerror",
    "onresize",
    "onscroll",
    "onsubmit",
    "onreset",
    "onselect",
    "onchange",
    "onfocus",
    "onblur",
];

#[must_use]
pub fn is_event_attr(name: &str) -> bool {
    EVENT_ATTRS.iter().any(|attr| attr.eq_ignore_ascii_case(name))
}
