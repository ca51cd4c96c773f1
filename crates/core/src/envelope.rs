//! The per-tab envelope: what a migration driver hands back to the MAFF
//! writer for one browser tab.
//!
//! Grounded in `lemmiwinks.archive.archive.Letter`/`Envelope`: the
//! original wraps every artifact destined for a tab directory (the
//! migrated page, an info page, a screenshot) in a small closed enum
//! rather than a bag of optional fields, so the writer can match on what
//! it was actually handed.

use std::collections::BTreeMap;

use crate::config::Mode;
use crate::response::Response;

/// One artifact bound for a single tab directory inside the `.maff` file.
pub enum Letter {
    /// A migrated HTML/XHTML document: the top-level `index.<ext>`.
    HtmlResponse {
        response: Response,
        root_relative_path: String,
        mode: Mode,
    },
    /// A root document that isn't HTML at all (a PDF, an image fetched
    /// directly): written verbatim as the tab's `index.<ext>` instead of
    /// being run through the HTML migration driver.
    BlobResponse { response: Response, root_relative_path: String },
    /// A full-page screenshot taken while the root document was rendered
    /// under `Mode::JsExecution`.
    Screenshot { png_bytes: Vec<u8> },
    /// Free-form key/value metadata rendered as a companion info page.
    InfoTab { fields: BTreeMap<String, String> },
}

/// Everything collected for one tab, handed to the MAFF writer in one
/// shot once migration of that tab completes.
#[derive(Default)]
pub struct Envelope {
    letters: Vec<Letter>,
}

impl Envelope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, letter: Letter) {
        self.letters.push(letter);
    }

    #[inline]
    #[must_use]
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    #[must_use]
    pub fn into_letters(self) -> Vec<Letter> {
        self.letters
    }

    /// The envelope's root HTML document, if one was pushed.
    #[must_use]
    pub fn root(&self) -> Option<(&Response, &str, Mode)> {
        self.letters.iter().find_map(|letter| match letter {
            Letter::HtmlResponse {
                response,
                root_relative_path,
                mode,
            } => Some((response, root_relative_path.as_str(), *mode)),
            _ => None,
        })
    }

    /// The envelope's root document regardless of whether it's HTML or an
    /// opaque blob, paired with the relative path it should be written at.
    #[must_use]
    pub fn root_document(&self) -> Option<(&Response, &str)> {
        self.letters.iter().find_map(|letter| match letter {
            Letter::HtmlResponse { response, root_relative_path, .. } | Letter::BlobResponse { response, root_relative_path } => {
                Some((response, root_relative_path.as_str()))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Hop, Response};
    use bytes::Bytes;

    fn response() -> Response {
        Response::new(
            Bytes::from_static(b"<html></html>"),
            Some("text/html".into()),
            vec![Hop {
                url: url::Url::parse("https://example.test/").unwrap(),
                status: 200,
            }],
        )
    }

    #[test]
    fn root_finds_the_html_response_among_other_letters() {
        let mut envelope = Envelope::new();
        envelope.push(Letter::Screenshot { png_bytes: vec![1, 2, 3] });
        envelope.push(Letter::HtmlResponse {
            response: response(),
            root_relative_path: "index.html".into(),
            mode: Mode::NoJsExecution,
        });
        let (_, path, mode) = envelope.root().unwrap();
        assert_eq!(path, "index.html");
        assert_eq!(mode, Mode::NoJsExecution);
    }

    #[test]
    fn root_is_none_without_an_html_letter() {
        let mut envelope = Envelope::new();
        envelope.push(Letter::Screenshot { png_bytes: vec![] });
        assert!(envelope.root().is_none());
    }
}
