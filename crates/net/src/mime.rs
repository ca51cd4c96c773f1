//! Maps HTTP content-types and URL paths to file extensions, grounded in
//! `lemmiwinks.pathgen.MimeFileExtension`: every downloaded resource is
//! minted a filename whose extension matches what it actually is, not
//! what its source URL's path happened to end in — except for
//! `DownloadHandler`, which per `pathgen.FilePathGenerator` mints its
//! filename straight from the URL's own path before any response has
//! even arrived.

use url::Url;

/// The extension (with leading dot) to mint a resource's filename with,
/// given its `Content-Type` header value and the URL it was fetched
/// from. Content-type is authoritative when present and recognized;
/// otherwise falls back to the URL path's own extension.
#[must_use]
pub fn extension_for(content_type: Option<&str>, url: &Url) -> String {
    extension_from_content_type(content_type).unwrap_or_else(|| extension_from_url_path(url))
}

/// The extension `DownloadHandler` mints a blob's filename with: the
/// fetched URL's own path extension, known before the fetch even starts.
#[must_use]
pub fn extension_from_url_path(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .filter(|(_, ext)| !ext.is_empty())
        .map_or_else(String::new, |(_, ext)| format!(".{ext}"))
}

fn extension_from_content_type(content_type: Option<&str>) -> Option<String> {
    let content_type = content_type?;
    let essence = content_type.split(';').next().unwrap_or(content_type).trim();
    mime_guess::get_mime_extensions_str(essence).and_then(|exts| exts.first()).map(|ext| format!(".{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn content_type_wins_when_present_and_recognized() {
        assert_eq!(extension_for(Some("text/html; charset=utf-8"), &url("https://example.test/page")), ".html");
        assert_eq!(extension_for(Some("image/png"), &url("https://example.test/resource")), ".png");
        assert_eq!(extension_for(Some("text/css"), &url("https://example.test/styles")), ".css");
    }

    #[test]
    fn falls_back_to_url_path_extension_when_content_type_is_missing_or_unknown() {
        assert_eq!(extension_for(None, &url("https://example.test/a.png")), ".png");
        assert_eq!(extension_for(Some("application/x-totally-unknown"), &url("https://example.test/a.png")), ".png");
    }

    #[test]
    fn yields_empty_extension_when_neither_signal_is_available() {
        assert_eq!(extension_for(None, &url("https://example.test/resource")), "");
    }

    #[test]
    fn extension_from_url_path_reads_the_last_path_segment() {
        assert_eq!(extension_from_url_path(&url("https://example.test/a.png")), ".png");
        assert_eq!(extension_from_url_path(&url("https://example.test/dir/b.css?x=1")), ".css");
        assert_eq!(extension_from_url_path(&url("https://example.test/")), "");
        assert_eq!(extension_from_url_path(&url("https://example.test/no-extension")), "");
    }
}
