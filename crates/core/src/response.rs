//! A fetched resource: its bytes, the chain of `(url, status)` pairs a
//! redirect-following fetch passed through, and the headers the handlers
//! need (content-type, for MIME sniffing).
//!
//! Grounded in `lemmiwinks.httplib.client`'s response wrapper, which
//! keeps the full redirect history rather than just the final URL, since
//! the migration core aliases every intermediate URL to the final path.

use bytes::Bytes;
use url::Url;

/// One hop of a fetch, in the order it was followed.
#[derive(Clone, Debug)]
pub struct Hop {
    pub url: Url,
    pub status: u16,
}

/// The outcome of fetching a single resource.
#[derive(Clone, Debug)]
pub struct Response {
    body: Bytes,
    content_type: Option<String>,
    hops: Vec<Hop>,
}

impl Response {
    /// # Panics
    /// Panics if `hops` is empty; every response has at least the hop it
    /// was originally requested at.
    #[must_use]
    pub fn new(body: Bytes, content_type: Option<String>, hops: Vec<Hop>) -> Self {
        assert!(!hops.is_empty(), "a response must record at least one hop");
        Self {
            body,
            content_type,
            hops,
        }
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The URL the fetch was originally requested at.
    #[must_use]
    pub fn requested_url(&self) -> &Url {
        &self.hops[0].url
    }

    /// The URL the content was actually read from, after redirects.
    #[must_use]
    pub fn accessed_url(&self) -> &Url {
        &self.hops[self.hops.len() - 1].url
    }

    /// Every URL visited before the final one, in request order, with
    /// each one's status code.
    #[inline]
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.hops[self.hops.len() - 1].status
    }
}
