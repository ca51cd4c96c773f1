//! Drives a parsed document through migration: rebase on `<base href>`,
//! collect every reference-bearing node into a flat job list, resolve and
//! fetch them all concurrently, then patch the tree with whatever each
//! job produced.
//!
//! The collect/fetch/patch split exists because handlers need to hold
//! `&mut Dom` as briefly as possible — a job can't `.await` a network
//! fetch while the tree is borrowed mutably, so every reference is first
//! read out as plain owned data, then resolved, then written back.
//!
//! Grounded in `lemmiwinks.archive.migration.migrate.HTMLMigration`'s
//! single walk-every-filtered-element loop; the table itself is
//! [`crate::filter`].

use archive_core::EntityContext;
use archive_html::{Dom, NodeKind};
use indextree::NodeId;
use url::Url;

use crate::filter::{self, BLOB_ELEMENTS};
use crate::handlers::Handlers;

/// What a finished job should do to the tree once its replacement text is
/// ready.
enum Patch {
    SetAttr { node: NodeId, name: &'static str, value: String },
    RemoveAttr { node: NodeId, name: &'static str },
    SetText { node: NodeId, value: String },
}

/// One piece of work collected from the tree: where its replacement
/// value should go, and how to produce it.
enum Job {
    Blob { node: NodeId, attr: &'static str, url: Url },
    Stylesheet { node: NodeId, url: Url },
    Script { node: NodeId, url: Url, js_execution: bool },
    InlineStyle { node: NodeId, css: String },
    StyleAttr { node: NodeId, css: String },
    Frame { node: NodeId, url: Url, js_execution: bool },
    InlineScriptText { node: NodeId },
    EventAttr { node: NodeId, attr: &'static str },
}

/// Migrate `dom` in place: resolve `<base href>` first (if present, it
/// rebases `ctx.resolver` for every reference collected afterward and is
/// itself removed, matching an archived page having no external base to
/// resolve against), then every blob/stylesheet/script/frame reference,
/// and — only in js-execution mode — inline script text and event
/// attributes, since their behavior was already exercised by the browser
/// before capture.
pub async fn migrate(dom: &mut Dom, mut ctx: EntityContext, handlers: &Handlers, js_execution: bool) {
    apply_base_href(dom, &mut ctx);

    let jobs = collect_jobs(dom, &ctx, js_execution);
    let patches = run_jobs(jobs, &ctx, handlers).await;

    for patch in patches {
        match patch {
            Patch::SetAttr { node, name, value } => dom.set_attr(node, name.to_string(), value),
            Patch::RemoveAttr { node, name } => dom.remove_attr(node, name),
            Patch::SetText { node, value } => {
                if let Some(dom_node) = dom.node_mut(node) {
                    dom_node.kind = NodeKind::Text { text: value };
                }
            }
        }
    }
}

fn apply_base_href(dom: &mut Dom, ctx: &mut EntityContext) {
    let Some(base_node) = dom.find_element("base") else {
        return;
    };
    let href = dom.node(base_node).and_then(|n| n.attr("href")).map(ToOwned::to_owned);
    if let Some(href) = href {
        if let Ok(url) = ctx.resolver.resolve(&href) {
            ctx.resolver.set_base(url);
        }
    }
    dom.remove_from_parent(base_node);
}

fn collect_jobs(dom: &Dom, ctx: &EntityContext, js_execution: bool) -> Vec<Job> {
    let mut jobs = Vec::new();

    for rule in BLOB_ELEMENTS {
        for node in dom.find_elements(rule.tag) {
            for &attr in rule.attrs {
                let Some(raw) = dom.node(node).and_then(|n| n.attr(attr)) else {
                    continue;
                };
                if let Some(url) = resolve(ctx, raw) {
                    jobs.push(Job::Blob { node, attr, url });
                }
            }
        }
    }

    for node in dom.find_elements(filter::STYLESHEET_LINK_TAG) {
        let is_stylesheet = dom
            .node(node)
            .and_then(|n| n.attr("rel"))
            .is_some_and(|rel| rel.eq_ignore_ascii_case(filter::STYLESHEET_LINK_REL));
        if !is_stylesheet {
            continue;
        }
        let Some(raw) = dom.node(node).and_then(|n| n.attr(filter::STYLESHEET_LINK_ATTR)) else {
            continue;
        };
        if let Some(url) = resolve(ctx, raw) {
            jobs.push(Job::Stylesheet { node, url });
        }
    }

    for node in dom.find_elements(filter::SCRIPT_TAG) {
        if let Some(raw) = dom.node(node).and_then(|n| n.attr(filter::SCRIPT_SRC_ATTR)) {
            if let Some(url) = resolve(ctx, raw) {
                jobs.push(Job::Script { node, url, js_execution });
                continue;
            }
        }
        if js_execution {
            let has_inline_text = dom.children(node).iter().any(|&child| dom.node(child).and_then(|n| n.text()).is_some());
            if has_inline_text {
                jobs.push(Job::InlineScriptText { node });
            }
        }
    }

    for node in dom.find_elements(filter::STYLE_ELEMENT_TAG) {
        let css: String = dom
            .children(node)
            .iter()
            .filter_map(|&child| dom.node(child).and_then(|n| n.text()))
            .collect();
        if !css.is_empty() {
            jobs.push(Job::InlineStyle { node, css });
        }
    }

    for node in dom.descendants(dom.root_id()) {
        let Some(css) = dom.node(node).and_then(|n| n.attr(filter::STYLE_ATTR)) else {
            continue;
        };
        if !css.is_empty() {
            jobs.push(Job::StyleAttr { node, css: css.to_owned() });
        }
        if js_execution {
            if let Some(dom_node) = dom.node(node) {
                for (name, _) in &dom_node.attrs {
                    if filter::is_event_attr(name) {
                        jobs.push(Job::EventAttr {
                            node,
                            attr: leak_attr_name(name),
                        });
                    }
                }
            }
        }
    }

    for &tag in filter::FRAME_TAGS {
        for node in dom.find_elements(tag) {
            let Some(raw) = dom.node(node).and_then(|n| n.attr(filter::FRAME_SRC_ATTR)) else {
                continue;
            };
            if let Some(url) = resolve(ctx, raw) {
                jobs.push(Job::Frame { node, url, js_execution });
            }
        }
    }

    jobs
}

/// `EVENT_ATTRS` is a closed, small, `'static` list; match the observed
/// attribute back into it so jobs can carry a `&'static str` rather than
/// an owned `String` per event handler found.
fn leak_attr_name(name: &str) -> &'static str {
    filter::EVENT_ATTRS
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
        .copied()
        .unwrap_or("")
}

fn resolve(ctx: &EntityContext, raw: &str) -> Option<Url> {
    let url = ctx.resolver.resolve(raw).ok()?;
    archive_core::UrlResolver::is_fetchable(&url).then_some(url)
}

async fn run_jobs(jobs: Vec<Job>, ctx: &EntityContext, handlers: &Handlers) -> Vec<Patch> {
    let futures = jobs.into_iter().map(|job| async move {
        match job {
            Job::Blob { node, attr, url } => {
                let value = handlers.download(ctx, url).await;
                patch_for(node, attr, value)
            }
            Job::Stylesheet { node, url } => {
                let value = handlers.css_file(ctx, url).await;
                patch_for(node, filter::STYLESHEET_LINK_ATTR, value)
            }
            Job::Script { node, url, js_execution } => {
                let value = if js_execution {
                    handlers.js_file(ctx, url).await
                } else {
                    handlers.download(ctx, url).await
                };
                patch_for(node, filter::SCRIPT_SRC_ATTR, value)
            }
            Job::InlineStyle { node, css } => {
                let value = handlers.css_fragment(ctx, &css).await;
                Patch::SetText { node, value }
            }
            Job::StyleAttr { node, css } => {
                let value = handlers.css_fragment(ctx, &css).await;
                patch_for(node, filter::STYLE_ATTR, value)
            }
            Job::Frame { node, url, js_execution } => {
                let value = handlers.html_file(ctx, url, js_execution).await;
                patch_for(node, filter::FRAME_SRC_ATTR, value)
            }
            Job::InlineScriptText { node } => Patch::SetText {
                node,
                value: handlers.inline_js(),
            },
            Job::EventAttr { node, attr } => Patch::RemoveAttr { node, name: attr },
        }
    });
    futures::future::join_all(futures).await
}

fn patch_for(node: NodeId, attr: &'static str, value: String) -> Patch {
    if value.is_empty() {
        Patch::RemoveAttr { node, name: attr }
    } else {
        Patch::SetAttr { node, name: attr, value }
    }
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
        let resolver = UrlResolver::from_str("https://example.test/page.html").unwrap();
        EntityContext::new(resolver, paths, SourceRegistry::new(), budget)
    }

    #[tokio::test]
    async fn base_href_is_applied_then_removed() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let base = dom.new_element("base".into());
        dom.set_attr(base, "href".into(), "https://other.test/sub/".into());
        dom.append_child(root, base);

        let mut ctx = context(1);
        apply_base_href(&mut dom, &mut ctx);

        assert!(dom.find_element("base").is_none());
        assert_eq!(ctx.resolver.base().as_str(), "https://other.test/sub/");
    }

    #[tokio::test]
    async fn javascript_scheme_src_is_never_collected_as_a_job() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let img = dom.new_element("img".into());
        dom.set_attr(img, "src".into(), "javascript:void(0)".into());
        dom.append_child(root, img);

        let ctx = context(1);
        let jobs = collect_jobs(&dom, &ctx, false);
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn event_attrs_are_only_collected_in_js_execution_mode() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let div = dom.new_element("div".into());
        dom.set_attr(div, "onclick".into(), "doStuff()".into());
        dom.append_child(root, div);

        let ctx = context(1);
        assert!(collect_jobs(&dom, &ctx, false).is_empty());
        assert_eq!(collect_jobs(&dom, &ctx, true).len(), 1);
    }

    #[tokio::test]
    async fn recursion_exhausted_frame_reference_still_collects_but_handler_yields_empty() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let iframe = dom.new_element("iframe".into());
        dom.set_attr(iframe, "src".into(), "https://example.test/nested.html".into());
        dom.append_child(root, iframe);

        let ctx = context(0);
        migrate(&mut dom, ctx, &handlers(), false).await;
        assert!(!dom.has_attr(iframe, "src"));
    }
}
