//! Reference resolution: turning a raw attribute/token string plus a base
//! URL into an absolute, validated `url::Url`.
//!
//! Grounded in the teacher's `page_handler::url` module for the
//! `url::Url`-based resolve-against-base idiom, and in
//! `lemmiwinks.httplib.resolver.URLResolver` for the exact percent-encode
//! safe set and the requirement that the base is mutable (it advances
//! across redirects and as migration descends into nested documents).

use url::Url;

use crate::error::{Error, Result};

/// Characters the original archiver never percent-encodes when normalizing
/// a reference, matching `httplib.resolver`'s safe set.
const SAFE: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'%')
    .remove(b'/')
    .remove(b':')
    .remove(b'=')
    .remove(b'&')
    .remove(b'?')
    .remove(b'~')
    .remove(b'#')
    .remove(b'+')
    .remove(b'!')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'\'')
    .remove(b'@')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'[')
    .remove(b']');

/// Resolves references against a base URL that can be advanced as
/// migration moves to a new document (e.g. after following a redirect, or
/// descending into an `@import`ed stylesheet).
#[derive(Clone, Debug)]
pub struct UrlResolver {
    base: Url,
}

impl UrlResolver {
    #[inline]
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn from_str(base: &str) -> Result<Self> {
        let base = Url::parse(base).map_err(|err| Error::UrlValidation(err.to_string()))?;
        Ok(Self::new(base))
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Point the resolver at a new base, e.g. the final URL of a redirect
    /// chain or the URL of an entity being recursed into.
    pub fn set_base(&mut self, base: Url) {
        self.base = base;
    }

    /// Resolve `reference` against the current base, percent-encoding any
    /// characters outside the original archiver's safe set first.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(Error::UrlValidation("empty reference".into()));
        }
        let normalized = percent_encoding::utf8_percent_encode(trimmed, SAFE).to_string();
        self.base.join(&normalized).map_err(|err| {
            log::debug!("unresolvable reference '{trimmed}' against {}: {err}", self.base);
            Error::UrlValidation(format!("{trimmed}: {err}"))
        })
    }

    /// Whether the scheme is one the archiver fetches over HTTP(S); `data:`,
    /// `mailto:`, `javascript:` and similar are left untouched by handlers.
    #[inline]
    #[must_use]
    pub fn is_fetchable(url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_path_against_base() {
        let resolver = UrlResolver::from_str("https://example.test/a/b.html").unwrap();
        let resolved = resolver.resolve("../style.css").unwrap();
        assert_eq!(resolved.as_str(), "https://example.test/style.css");
    }

    #[test]
    fn resolves_protocol_relative_reference() {
        let resolver = UrlResolver::from_str("https://example.test/a/b.html").unwrap();
        let resolved = resolver.resolve("//cdn.example.test/x.js").unwrap();
        assert_eq!(resolved.host_str(), Some("cdn.example.test"));
    }

    #[test]
    fn rejects_empty_reference() {
        let resolver = UrlResolver::from_str("https://example.test/").unwrap();
        assert!(resolver.resolve("   ").is_err());
    }

    #[test]
    fn set_base_advances_resolution() {
        let mut resolver = UrlResolver::from_str("https://example.test/a/").unwrap();
        resolver.set_base(Url::parse("https://example.test/b/c/").unwrap());
        let resolved = resolver.resolve("d.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.test/b/c/d.png");
    }

    #[test]
    fn data_and_https_fetchability() {
        let data = Url::parse("data:text/plain,hi").unwrap();
        let https = Url::parse("https://example.test/").unwrap();
        assert!(!UrlResolver::is_fetchable(&data));
        assert!(UrlResolver::is_fetchable(&https));
    }
}
