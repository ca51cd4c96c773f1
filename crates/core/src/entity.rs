//! The bundle of per-entity state migration handlers close over: where to
//! resolve references from, where to mint new files, the shared registry
//! of already-migrated URLs, and how much recursion budget remains.
//!
//! Grounded in `lemmiwinks.archive.migration.migrate`'s handler
//! constructors, which all take the same `(resolver, path_generator,
//! container, recursion_count)` tuple; here it is a single struct so
//! drivers can clone-and-descend it instead of threading four arguments
//! through every handler call.
//!
//! One tab's `index_files/` is flat (per the archive's filesystem
//! layout), so every entity within a tab — the root document, every
//! `@import`ed stylesheet, every iframe — mints files into and resolves
//! relative paths against the very same directory. `paths` is therefore
//! one allocator shared (via `Arc<Mutex<_>>`) across an entity and every
//! descendant it spawns, rather than a fresh one per entity; only the
//! resolver's base and the recursion budget change on descent.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::path::PathAllocator;
use crate::registry::SourceRegistry;
use crate::resolver::UrlResolver;

/// Per-entity migration context: one of these exists per document/
/// stylesheet/script being migrated, and a fresh one (with one less unit
/// of recursion budget, and a resolver rebased at the child's own
/// location) is created for every nested entity it refers to.
#[derive(Clone)]
pub struct EntityContext {
    pub resolver: UrlResolver,
    pub paths: Arc<Mutex<PathAllocator>>,
    pub registry: SourceRegistry,
    recursion_budget: u32,
}

impl EntityContext {
    #[must_use]
    pub fn new(resolver: UrlResolver, paths: PathAllocator, registry: SourceRegistry, recursion_budget: u32) -> Self {
        Self {
            resolver,
            paths: Arc::new(Mutex::new(paths)),
            registry,
            recursion_budget,
        }
    }

    #[inline]
    #[must_use]
    pub const fn recursion_budget(&self) -> u32 {
        self.recursion_budget
    }

    #[inline]
    #[must_use]
    pub const fn can_descend(&self) -> bool {
        self.recursion_budget > 0
    }

    /// Build the context a nested entity (an `@import`ed stylesheet, an
    /// `<iframe>` document) should run its own migration with: the same
    /// registry and path allocator, a resolver rebased at the nested
    /// entity's own location, one less unit of recursion budget.
    ///
    /// Returns `None` when the current budget is already exhausted, in
    /// which case the caller should leave the reference unmigrated rather
    /// than recurse further.
    #[must_use]
    pub fn descend(&self, resolver: UrlResolver) -> Option<Self> {
        self.can_descend().then(|| Self {
            resolver,
            paths: self.paths.clone(),
            registry: self.registry.clone(),
            recursion_budget: self.recursion_budget - 1,
        })
    }

    /// Mint a fresh path in the tab's shared resource directory.
    pub async fn allocate(&self, ext: &str) -> crate::path::ArchivePath {
        self.paths.lock().await.allocate(ext)
    }

    /// `abs` relative to this tab's resource directory.
    pub async fn relative_of(&self, abs: &std::path::Path) -> String {
        self.paths.lock().await.relative_of(abs)
    }
}
