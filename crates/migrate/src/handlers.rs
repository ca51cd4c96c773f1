//! One async method per handler kind from the spec's closed
//! `HandlerKind` sum type (§9 design notes: no runtime registration, no
//! abstract `DataHandler.process`). Every method fails soft: network,
//! validation, and I/O errors are logged and answered with the empty
//! string, matching `lemmiwinks.archive.migration.migrate`'s
//! catch-log-return-identity handlers — one broken asset must not abort
//! the archive.
//!
//! Every handler that fetches mints its path and claims the URL in the
//! registry *before* it touches the network (data-model invariant (a):
//! insertion precedes fetch). A cyclic reference — a stylesheet whose
//! `@import` chain loops back on itself, a self-embedding `<iframe>` —
//! re-enters the same handler for a URL that's already claimed and gets
//! the minted path straight back instead of waiting on a fetch that can
//! never complete.

use std::path::PathBuf;
use std::sync::Arc;

use archive_core::{EntityContext, Response, UrlResolver};
use archive_net::{BrowserPool, HttpClient};
use futures::future::BoxFuture;
use url::Url;

use crate::{css_driver, html_driver};

/// Shared network collaborators every recursive handler closes over.
#[derive(Clone)]
pub struct Handlers {
    http: Arc<HttpClient>,
    browser: Option<Arc<BrowserPool>>,
}

impl Handlers {
    #[must_use]
    pub const fn new(http: Arc<HttpClient>, browser: Option<Arc<BrowserPool>>) -> Self {
        Self { http, browser }
    }

    #[inline]
    #[must_use]
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// DownloadHandler: fetch an opaque blob and write it verbatim. A
    /// cyclic re-entrant claim always resolves to the minted path; a
    /// direct fetch failure degrades to the empty string, per the
    /// fails-soft handler contract.
    pub async fn download(&self, ctx: &EntityContext, url: Url) -> String {
        let ext = archive_net::extension_from_url_path(&url);
        let allocated = ctx.allocate(&ext).await;
        match ctx.registry.claim(url.clone(), allocated.absolute.clone()).await {
            Some(path) => resolve_to_relative(ctx, path).await,
            None => {
                let Some(response) = fetch(&self.http, &url).await else {
                    return String::new();
                };
                write_bytes(&allocated.absolute, response.body()).await;
                alias_hops(ctx, &response, &allocated.absolute).await;
                resolve_to_relative(ctx, allocated.absolute).await
            }
        }
    }

    /// JSFileHandler: mint a path and write a neutralization comment
    /// instead of fetching the script at all.
    pub async fn js_file(&self, ctx: &EntityContext, url: Url) -> String {
        let allocated = ctx.allocate(".js").await;
        match ctx.registry.claim(url, allocated.absolute.clone()).await {
            Some(path) => resolve_to_relative(ctx, path).await,
            None => {
                write_bytes(&allocated.absolute, b"// script content removed during archival\n").await;
                resolve_to_relative(ctx, allocated.absolute).await
            }
        }
    }

    /// InlineJSHandler / EventAttrHandler: unconditional neutralization.
    #[inline]
    #[must_use]
    pub const fn inline_js(&self) -> String {
        String::new()
    }

    /// CssStyleHandler / CssDeclarationHandler: migrate a CSS fragment
    /// (a `<style>` block's text or a `style="..."` attribute's value) in
    /// place, at the same recursion depth as the caller.
    pub async fn css_fragment(&self, ctx: &EntityContext, css: &str) -> String {
        css_driver::migrate(css, ctx, self).await
    }

    /// CSSFileHandler: fetch a stylesheet, recurse into its `@import`s
    /// while budget remains, and write the (possibly rewritten) text. A
    /// cyclic `@import` chain re-enters this call for a URL the outer
    /// call already claimed and gets the minted path straight back,
    /// instead of waiting on the fetch that is this very call.
    pub fn css_file<'a>(&'a self, ctx: &'a EntityContext, url: Url) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let allocated = ctx.allocate(".css").await;
            match ctx.registry.claim(url.clone(), allocated.absolute.clone()).await {
                Some(path) => resolve_to_relative(ctx, path).await,
                None => {
                    let Some(response) = fetch(&self.http, &url).await else {
                        return String::new();
                    };
                    alias_hops(ctx, &response, &allocated.absolute).await;
                    let text = String::from_utf8_lossy(response.body()).into_owned();
                    let rewritten = match ctx.descend(UrlResolver::new(response.accessed_url().clone())) {
                        Some(child) => css_driver::migrate(&text, &child, self).await,
                        None => text,
                    };
                    write_bytes(&allocated.absolute, rewritten.as_bytes()).await;
                    resolve_to_relative(ctx, allocated.absolute).await
                }
            }
        })
    }

    /// HTMLFileHandler / HTMLFileWithJsExecutionHandler: fetch a nested
    /// document (an `<iframe>`/`<frame>` target), recurse into it while
    /// budget remains, and write the rewritten markup. `js_execution`
    /// selects whether the fetch goes through the browser pool. A
    /// self-embedding frame re-enters this call for an already-claimed
    /// URL the same way `css_file` does.
    pub fn html_file<'a>(&'a self, ctx: &'a EntityContext, url: Url, js_execution: bool) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let allocated = ctx.allocate(".html").await;
            match ctx.registry.claim(url.clone(), allocated.absolute.clone()).await {
                Some(path) => resolve_to_relative(ctx, path).await,
                None => {
                    let Some((bytes, final_url)) = fetch_document(&self.http, self.browser.as_deref(), &url, js_execution).await else {
                        return String::new();
                    };
                    let mut dom = archive_html::parse(&bytes);
                    let rewritten = match ctx.descend(UrlResolver::new(final_url)) {
                        Some(child) => {
                            html_driver::migrate(&mut dom, child, self, js_execution).await;
                            archive_html::serialize(&dom)
                        }
                        None => String::from_utf8_lossy(&bytes).into_owned(),
                    };
                    write_bytes(&allocated.absolute, rewritten.as_bytes()).await;
                    resolve_to_relative(ctx, allocated.absolute).await
                }
            }
        })
    }
}

async fn fetch(http: &HttpClient, url: &Url) -> Option<Response> {
    match http.fetch(url).await {
        Ok(response) => Some(response),
        Err(source) => {
            log::warn!("fetch failed for {url}: {source}");
            None
        }
    }
}

async fn fetch_document(http: &HttpClient, browser: Option<&BrowserPool>, url: &Url, js_execution: bool) -> Option<(Vec<u8>, Url)> {
    if js_execution {
        if let Some(pool) = browser {
            return match pool.render(url).await {
                Ok(rendered) => Some((rendered.html.into_bytes(), rendered.final_url)),
                Err(source) => {
                    log::warn!("browser render failed for {url}: {source}");
                    None
                }
            };
        }
    }
    let response = fetch(http, url).await?;
    let final_url = response.accessed_url().clone();
    Some((response.body().to_vec(), final_url))
}

async fn write_bytes(path: &std::path::Path, bytes: &[u8]) {
    if let Err(source) = tokio::fs::write(path, bytes).await {
        log::warn!("failed writing {}: {source}", path.display());
    }
}

async fn alias_hops(ctx: &EntityContext, response: &Response, absolute: &std::path::Path) {
    for hop in response.hops() {
        ctx.registry.insert(hop.url.clone(), absolute.to_path_buf()).await;
    }
}

async fn resolve_to_relative(ctx: &EntityContext, path: PathBuf) -> String {
    if path.as_os_str().is_empty() {
        return String::new();
    }
    ctx.relative_of(&path).await
}
