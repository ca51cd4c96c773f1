//! Drives a single CSS fragment (a stylesheet file's full text, a
//! `<style>` element's text, or a `style="..."` attribute's value)
//! through `archive_css::scan`/`rewrite`, dispatching each found
//! reference to the matching handler and joining all of them
//! concurrently before rewriting.
//!
//! Grounded in `lemmiwinks.archive.migration.migrate.CSSFileHandler`'s
//! `re.sub`-over-every-`url()`-and-`@import`-match loop, replacing its
//! regex pass with `archive_css`'s token-level scan/rewrite.

use std::collections::HashMap;

use archive_core::EntityContext;
use archive_css::RefKind;

use crate::handlers::Handlers;

/// Resolve and migrate every reference in `css`, returning the rewritten
/// text. References that don't resolve to a fetchable URL (`data:`,
/// `mailto:`, malformed text) are left as-is.
pub async fn migrate(css: &str, ctx: &EntityContext, handlers: &Handlers) -> String {
    let refs = archive_css::scan(css);
    let mut jobs = Vec::with_capacity(refs.len());
    for reference in &refs {
        let Ok(url) = ctx.resolver.resolve(&reference.raw) else {
            continue;
        };
        if !archive_core::UrlResolver::is_fetchable(&url) {
            continue;
        }
        jobs.push(async move {
            let replacement = match reference.kind {
                RefKind::Url => handlers.download(ctx, url).await,
                RefKind::Import => handlers.css_file(ctx, url).await,
            };
            (reference.kind, reference.raw.clone(), replacement)
        });
    }

    let resolved = futures::future::join_all(jobs).await;
    let mut replacements: HashMap<(RefKind, String), String> = HashMap::new();
    for (kind, raw, replacement) in resolved {
        if !replacement.is_empty() {
            replacements.insert((kind, raw), replacement);
        }
    }

    archive_css::rewrite(css, |raw, kind| replacements.get(&(kind, raw.to_string())).cloned())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use archive_core::{PathAllocator, SourceRegistry, UrlResolver};
    use archive_net::HttpClient;
    use tempfile::tempdir;

    use super::*;

    fn handlers() -> Handlers {
        let http = HttpClient::new(std::time::Duration::from_secs(5), std::time::Duration::from_secs(5)).unwrap();
        Handlers::new(Arc::new(http), None)
    }

    fn context(budget: u32) -> EntityContext {
        let dir = tempdir().unwrap();
        let paths = PathAllocator::new(dir.path(), dir.path()).unwrap();
        let resolver = UrlResolver::from_str("https://example.test/style/").unwrap();
        EntityContext::new(resolver, paths, SourceRegistry::new(), budget)
    }

    #[tokio::test]
    async fn non_fetchable_and_unparsable_references_pass_through_untouched() {
        let ctx = context(1);
        let css = r#"div { background: url("data:image/png;base64,AAAA"); }"#;
        let out = migrate(css, &ctx, &handlers()).await;
        assert_eq!(out, css);
    }

    #[tokio::test]
    async fn empty_css_round_trips() {
        let ctx = context(1);
        let out = migrate("", &ctx, &handlers()).await;
        assert_eq!(out, "");
    }
}
