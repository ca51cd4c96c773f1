//! The source registry: the at-most-once-fetch map from resolved URL to
//! the path it was migrated to.
//!
//! Grounded in `lemmiwinks.archive.migration.container.SourceContainer`,
//! with one correction the spec calls out explicitly: the original made
//! this a module-level singleton, which leaked state across archive runs
//! in the same process. Here one `SourceRegistry` is constructed per
//! archive operation and threaded through explicitly, the way the
//! teacher's `page_handler::utilities::scheduler` threads a fresh handle
//! through each page load rather than reaching for a global.
//!
//! Claiming a URL is synchronous: [`SourceRegistry::claim`] records the
//! path under the registry's lock and returns immediately, before any
//! network fetch happens. A handler mints its path, claims the URL, and
//! only then starts fetching — so a cyclic reference (a stylesheet that
//! `@import`s itself through a chain, an `<iframe>` that embeds its own
//! page) re-enters `claim` on a URL that's already recorded and gets the
//! minted path straight back, instead of waiting on a fetch that can
//! never finish because it is itself waiting on this same call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

/// Shared, clonable handle onto the URL-to-path map for one archive run.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    inner: Arc<Mutex<HashMap<Url, PathBuf>>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` has already been claimed.
    pub async fn contains(&self, url: &Url) -> bool {
        self.inner.lock().await.contains_key(url)
    }

    /// The path `url` was migrated to, if it has been claimed.
    pub async fn get(&self, url: &Url) -> Option<PathBuf> {
        self.inner.lock().await.get(url).cloned()
    }

    /// Record that `url` migrated to `path`, overwriting whatever was
    /// already recorded. Returns the path that was previously recorded,
    /// if any. Used for aliasing redirect hops onto an already-claimed
    /// target, where the caller has already decided `path` is correct.
    pub async fn insert(&self, url: Url, path: PathBuf) -> Option<PathBuf> {
        self.inner.lock().await.insert(url, path)
    }

    /// Claim `url` for migration, recording `path` as its destination if
    /// no one has claimed it yet.
    ///
    /// Returns `None` when this call is the first to claim `url`: the
    /// caller now owns fetching and writing it, and `path` has already
    /// been recorded for anyone (including a cyclic re-entrant caller)
    /// who asks next. Returns `Some(existing)` when `url` was already
    /// claimed, by an earlier call or by an outer frame of the same
    /// recursive migration — in which case the caller must not fetch
    /// again and should use `existing` as-is.
    pub async fn claim(&self, url: Url, path: PathBuf) -> Option<PathBuf> {
        match self.inner.lock().await.entry(url) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(path);
                None
            }
        }
    }

    /// Alias `from` to whatever `to` already maps to. Returns `false`
    /// when `to` has no path yet.
    pub async fn alias(&self, from: Url, to: &Url) -> bool {
        let Some(path) = self.get(to).await else {
            return false;
        };
        self.insert(from, path).await;
        true
    }

    /// Number of distinct URLs claimed so far.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_contains_and_get() {
        let registry = SourceRegistry::new();
        let url = Url::parse("https://example.test/a.png").unwrap();
        assert!(!registry.contains(&url).await);
        registry.insert(url.clone(), PathBuf::from("/tmp/a.png")).await;
        assert!(registry.contains(&url).await);
        assert_eq!(registry.get(&url).await, Some(PathBuf::from("/tmp/a.png")));
    }

    #[tokio::test]
    async fn alias_points_redirect_source_at_target_path() {
        let registry = SourceRegistry::new();
        let target = Url::parse("https://example.test/final.png").unwrap();
        let source = Url::parse("https://example.test/redirected.png").unwrap();
        registry.insert(target.clone(), PathBuf::from("/tmp/final.png")).await;
        assert!(registry.alias(source.clone(), &target).await);
        assert_eq!(registry.get(&source).await, Some(PathBuf::from("/tmp/final.png")));
    }

    #[tokio::test]
    async fn alias_fails_when_target_unknown() {
        let registry = SourceRegistry::new();
        let source = Url::parse("https://example.test/redirected.png").unwrap();
        let target = Url::parse("https://example.test/final.png").unwrap();
        assert!(!registry.alias(source, &target).await);
    }

    #[tokio::test]
    async fn clones_share_the_same_underlying_map() {
        let registry = SourceRegistry::new();
        let clone = registry.clone();
        let url = Url::parse("https://example.test/a.png").unwrap();
        registry.insert(url.clone(), PathBuf::from("/tmp/a.png")).await;
        assert!(clone.contains(&url).await);
    }

    #[tokio::test]
    async fn claim_returns_none_and_records_the_path_for_the_first_caller() {
        let registry = SourceRegistry::new();
        let url = Url::parse("https://example.test/style.css").unwrap();
        let path = PathBuf::from("/tmp/style.css");
        assert_eq!(registry.claim(url.clone(), path.clone()).await, None);
        assert_eq!(registry.get(&url).await, Some(path));
    }

    #[tokio::test]
    async fn claim_returns_the_already_recorded_path_on_a_second_call() {
        let registry = SourceRegistry::new();
        let url = Url::parse("https://example.test/style.css").unwrap();
        let first_path = PathBuf::from("/tmp/style.css");
        assert_eq!(registry.claim(url.clone(), first_path.clone()).await, None);

        let second_path = PathBuf::from("/tmp/other.css");
        assert_eq!(registry.claim(url, second_path).await, Some(first_path));
    }

    /// This is the cyclic-`@import` case: a URL claims itself again from
    /// within the same call stack, before the outer claim's fetch has
    /// finished. `claim` must hand back the minted path immediately
    /// rather than waiting on anything, since there is nothing else to
    /// wait on — the outer call is this call.
    #[tokio::test]
    async fn reentrant_claim_for_the_same_url_does_not_block() {
        let registry = SourceRegistry::new();
        let url = Url::parse("https://example.test/style.css").unwrap();
        let path = PathBuf::from("/tmp/style.css");
        assert_eq!(registry.claim(url.clone(), path.clone()).await, None);
        let reentrant = tokio::time::timeout(std::time::Duration::from_millis(500), registry.claim(url, PathBuf::from("/tmp/unused.css"))).await;
        assert_eq!(reentrant.unwrap(), Some(path));
    }
}
