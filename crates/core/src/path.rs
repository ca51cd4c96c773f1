//! Path allocation: minting unique on-disk paths under a tab directory and
//! expressing them relative to whatever document will reference them.
//!
//! Grounded in `lemmiwinks.pathgen.DirectoryWrapper`/`FilePathGenerator`:
//! a directory to mint fresh filenames into, and a separate "prefix"
//! directory relative paths are computed against (the directory of the
//! document doing the referencing, which is not always the same as the
//! directory new assets are minted into).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A location a rewritten reference can point to: the real file on disk,
/// and the same file expressed relative to the containing document.
#[derive(Clone, Debug)]
pub struct ArchivePath {
    pub absolute: PathBuf,
    pub relative: String,
}

impl ArchivePath {
    /// Non-empty string form of the relative path, per the handler
    /// invariant that a rewritten reference is never an empty string.
    #[inline]
    #[must_use]
    pub fn as_relative_str(&self) -> &str {
        &self.relative
    }
}

/// Mints unique filenames in one directory and renders them relative to
/// another.
pub struct PathAllocator {
    resource_dir: PathBuf,
    prefix: PathBuf,
    seen: HashSet<PathBuf>,
}

impl PathAllocator {
    /// `resource_dir` is where new files are created; `prefix` is the
    /// directory relative paths are computed against.
    ///
    /// # Errors
    /// Returns `Error::Fatal` if `resource_dir` cannot be created.
    pub fn new(resource_dir: impl Into<PathBuf>, prefix: impl Into<PathBuf>) -> Result<Self> {
        let resource_dir = resource_dir.into();
        fs::create_dir_all(&resource_dir).map_err(|source| {
            Error::Fatal(format!(
                "cannot create resource directory {}: {source}",
                resource_dir.display()
            ))
        })?;
        log::debug!("resource directory ready at {}", resource_dir.display());
        Ok(Self {
            resource_dir,
            prefix: prefix.into(),
            seen: HashSet::new(),
        })
    }

    /// Mint a fresh `<random-hex><ext>` path in the resource directory,
    /// colliding with neither the filesystem nor a previously minted name.
    pub fn allocate(&mut self, ext: &str) -> ArchivePath {
        loop {
            let candidate = self.resource_dir.join(Self::random_name(ext));
            if !self.seen.contains(&candidate) && !candidate.exists() {
                self.seen.insert(candidate.clone());
                let relative = self.relative_of(&candidate);
                return ArchivePath {
                    absolute: candidate,
                    relative,
                };
            }
        }
    }

    fn random_name(ext: &str) -> String {
        format!("{}{}", uuid::Uuid::new_v4().simple(), ext)
    }

    /// `abs` relative to the allocator's prefix directory; falls back to
    /// `abs` unchanged (as a string) when no relative path can be derived.
    #[must_use]
    pub fn relative_of(&self, abs: &Path) -> String {
        match pathdiff::diff_paths(abs, &self.prefix) {
            Some(rel) if !rel.as_os_str().is_empty() => to_forward_slashes(&rel),
            _ => abs.to_string_lossy().into_owned(),
        }
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn allocate_produces_unique_non_colliding_names() {
        let dir = tempdir().unwrap();
        let mut allocator = PathAllocator::new(dir.path(), dir.path()).unwrap();
        let first = allocator.allocate(".png");
        let second = allocator.allocate(".png");
        assert_ne!(first.absolute, second.absolute);
        assert!(first.absolute.starts_with(dir.path()));
    }

    #[test]
    fn relative_of_computes_path_between_sibling_dirs() {
        let dir = tempdir().unwrap();
        let resource_dir = dir.path().join("index_files");
        let doc_dir = dir.path().to_path_buf();
        let allocator = PathAllocator::new(&resource_dir, &doc_dir).unwrap();
        let abs = resource_dir.join("abc.png");
        assert_eq!(allocator.relative_of(&abs), "index_files/abc.png");
    }

    #[test]
    fn relative_of_falls_back_to_absolute_when_unrelated() {
        let dir = tempdir().unwrap();
        let allocator = PathAllocator::new(dir.path(), "/completely/unrelated").unwrap();
        let abs = dir.path().join("a.png");
        // On most platforms diff_paths can always find *some* relative
        // path via `..` segments; the allocator never errors regardless.
        assert!(!allocator.relative_of(&abs).is_empty());
    }
}
