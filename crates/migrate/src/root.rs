//! Top-level orchestration for one tab: fetch the root document, run it
//! through [`html_driver::migrate`], and assemble the [`Envelope`] the
//! MAFF writer needs.
//!
//! Grounded in `lemmiwinks.archive.migration.migrate.Migration`'s
//! `run()` entry point, which is the only place the original fetches the
//! root URL itself rather than delegating to a handler — every other
//! fetch is reached by recursing from here.

use std::sync::Arc;

use archive_core::{EntityContext, Envelope, Error, Letter, Mode, PathAllocator, Response, Result, SourceRegistry, UrlResolver};
use archive_html::DocumentMetadata;
use archive_net::{BrowserPool, HttpClient};
use url::Url;

use crate::handlers::Handlers;
use crate::html_driver;

/// Everything one tab's migration needs that isn't already owned by a
/// [`Handlers`] or shared collaborator.
pub struct TabInput {
    pub url: Url,
    pub resource_dir: std::path::PathBuf,
    pub mode: Mode,
    pub recursion_limit: u32,
}

/// Migrate one tab end to end, returning the envelope the MAFF writer
/// will flatten into a tab directory.
///
/// A root document that doesn't look like HTML (a PDF, an image fetched
/// directly) is archived as-is under an `index.<ext>` chosen from its MIME
/// type rather than forced through the HTML migration driver, matching
/// `pathgen.MimeFileExtension`'s index-naming behavior.
///
/// # Errors
/// Returns an error only when the root document itself cannot be
/// fetched; every reference it contains fails soft per [`Handlers`].
pub async fn migrate_tab(input: TabInput, http: Arc<HttpClient>, browser: Option<Arc<BrowserPool>>) -> Result<(Envelope, DocumentMetadata)> {
    let js_execution = matches!(input.mode, Mode::JsExecution);
    let handlers = Handlers::new(http.clone(), browser.clone());

    let root = fetch_root(&input.url, &http, browser.as_deref(), js_execution).await?;

    if !js_execution && !looks_like_html(root.content_type.as_deref(), &root.bytes) {
        return Ok(archive_as_blob(root));
    }

    let mut dom = archive_html::parse(&root.bytes);
    let metadata = archive_html::extract_metadata(&dom);

    let paths = PathAllocator::new(&input.resource_dir, &input.resource_dir)?;
    let resolver = UrlResolver::new(root.final_url.clone());
    let ctx = EntityContext::new(resolver, paths, SourceRegistry::new(), input.recursion_limit);

    html_driver::migrate(&mut dom, ctx, &handlers, js_execution).await;
    let rewritten = archive_html::serialize(&dom);

    let response = Response::new(
        bytes::Bytes::from(rewritten.into_bytes()),
        Some("text/html".into()),
        vec![archive_core::Hop {
            url: root.final_url,
            status: 200,
        }],
    );

    let mut envelope = Envelope::new();
    envelope.push(Letter::HtmlResponse {
        response,
        root_relative_path: "index.html".into(),
        mode: input.mode,
    });
    if let Some(png_bytes) = root.screenshot {
        envelope.push(Letter::Screenshot { png_bytes });
    }

    Ok((envelope, metadata))
}

struct FetchedRoot {
    bytes: Vec<u8>,
    final_url: Url,
    content_type: Option<String>,
    screenshot: Option<Vec<u8>>,
}

async fn fetch_root(url: &Url, http: &HttpClient, browser: Option<&BrowserPool>, js_execution: bool) -> Result<FetchedRoot> {
    if js_execution {
        let pool = browser.ok_or_else(|| Error::Fatal("js execution requested without a browser pool".into()))?;
        let rendered = pool.render(url).await?;
        return Ok(FetchedRoot {
            bytes: rendered.html.into_bytes(),
            final_url: rendered.final_url,
            content_type: Some("text/html".into()),
            screenshot: Some(rendered.screenshot_png),
        });
    }
    let response = http.fetch(url).await?;
    Ok(FetchedRoot {
        final_url: response.accessed_url().clone(),
        content_type: response.content_type().map(ToOwned::to_owned),
        bytes: response.body().to_vec(),
        screenshot: None,
    })
}

fn looks_like_html(content_type: Option<&str>, bytes: &[u8]) -> bool {
    if let Some(content_type) = content_type {
        return content_type.to_ascii_lowercase().contains("html");
    }
    let head = &bytes[..bytes.len().min(512)];
    String::from_utf8_lossy(head).to_ascii_lowercase().contains("<html")
}

fn archive_as_blob(root: FetchedRoot) -> (Envelope, DocumentMetadata) {
    let extension = archive_net::extension_for(root.content_type.as_deref(), &root.final_url);
    let root_relative_path = format!("index{extension}");
    let response = Response::new(
        bytes::Bytes::from(root.bytes),
        root.content_type,
        vec![archive_core::Hop {
            url: root.final_url,
            status: 200,
        }],
    );
    let mut envelope = Envelope::new();
    envelope.push(Letter::BlobResponse { response, root_relative_path });
    (envelope, DocumentMetadata::default())
}
