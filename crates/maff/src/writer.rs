//! Assembles tab directories on disk and zips them into a `.maff` file.
//!
//! Grounded in `lemmiwinks.archive.maff.MozillaArchiveFormat`: one
//! `tempfile::TemporaryDirectory` per tab, walked and written into a
//! single `zipfile.ZipFile` at the end. The `zip` crate idiom (a
//! `ZipWriter` over a `File`, `start_file`/`write_all` per entry) is
//! `FitchFork`'s `code_manager::utils::compression`/`scan_code_content`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use archive_core::{Envelope, Error, Letter, Result};
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};

use crate::infotab;
use crate::rdf::{self, RdfInfo};

/// One tab's on-disk staging area: a temp directory named by the hex tag
/// that becomes its arcname prefix inside the `.maff` file.
pub struct TabDir {
    dir: TempDir,
    tag: String,
}

impl TabDir {
    /// # Errors
    /// Returns `Error::Fatal` if a temp directory cannot be created.
    pub fn create() -> Result<Self> {
        let dir = TempDir::new().map_err(|source| Error::Fatal(format!("cannot create tab directory: {source}")))?;
        Ok(Self { dir, tag: random_tag() })
    }

    /// Where `index_files/` and any minted asset paths for this tab live.
    #[must_use]
    pub fn resource_dir(&self) -> PathBuf {
        self.dir.path().join("index_files")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

fn random_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Write every letter in `envelope` into `tab`'s staging directory,
/// including the `index.rdf` sidecar built from `title`/`charset`/the
/// archive-wide timestamp.
///
/// # Errors
/// Returns `Error::FileIo` if any letter cannot be written to disk, or
/// `Error::Fatal` if the envelope carries no root document at all.
pub fn write_tab(tab: &TabDir, envelope: &Envelope, title: &str, archive_time: &str) -> Result<()> {
    let (root_response, root_relative_path) = envelope
        .root_document()
        .ok_or_else(|| Error::Fatal("tab envelope has no root document".into()))?;

    let index_path = tab.path().join(root_relative_path);
    write_file(&index_path, root_response.body())?;

    let charset = charset_of(root_response.content_type());

    let rdf_info = RdfInfo {
        original_url: root_response.requested_url().to_string(),
        title: title.to_string(),
        archive_time: archive_time.to_string(),
        index_file_name: root_relative_path.to_string(),
        charset,
    };
    let rdf_bytes = rdf::serialize(&rdf_info)?;
    write_file(&tab.path().join("index.rdf"), &rdf_bytes)?;

    for letter in envelope.letters() {
        match letter {
            Letter::Screenshot { png_bytes } => {
                write_file(&tab.path().join("screenshot.png"), png_bytes)?;
            }
            Letter::InfoTab { fields } => {
                let html = infotab::render(fields);
                write_file(&tab.path().join("info.html"), html.as_bytes())?;
            }
            Letter::HtmlResponse { .. } | Letter::BlobResponse { .. } => {}
        }
    }

    Ok(())
}

fn charset_of(content_type: Option<&str>) -> String {
    let Some(content_type) = content_type else {
        return String::new();
    };
    content_type
        .to_ascii_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_owned))
        .unwrap_or_default()
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::file_io(parent.display().to_string(), source))?;
    }
    fs::write(path, bytes).map_err(|source| Error::file_io(path.display().to_string(), source))
}

/// Zip every tab directory collected so far into `<output>.maff`,
/// discarding the temp directories once written.
///
/// # Errors
/// Returns `Error::Fatal` if the archive file or any entry within it
/// cannot be written.
pub fn finish(output: &Path, tabs: Vec<TabDir>) -> Result<PathBuf> {
    let archive_path = output.with_extension("maff");
    let file = fs::File::create(&archive_path).map_err(|source| Error::Fatal(format!("cannot create {}: {source}", archive_path.display())))?;
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for tab in &tabs {
        add_directory(&mut zip, tab.path(), tab.tag(), &options)?;
    }

    zip.finish().map_err(|source| Error::Fatal(format!("failed finishing {}: {source}", archive_path.display())))?;
    log::info!("wrote {} tab(s) to {}", tabs.len(), archive_path.display());
    Ok(archive_path)
}

fn add_directory(zip: &mut ZipWriter<fs::File>, dir: &Path, tag: &str, options: &FileOptions<'_, ()>) -> Result<()> {
    for entry in walk(dir) {
        let relative = entry.strip_prefix(dir).unwrap_or(&entry);
        let arcname = format!("{tag}/{}", relative.to_string_lossy().replace('\\', "/"));
        let bytes = fs::read(&entry).map_err(|source| Error::file_io(entry.display().to_string(), source))?;
        zip.start_file(arcname, *options)
            .map_err(|source| Error::Fatal(format!("failed starting zip entry: {source}")))?;
        zip.write_all(&bytes).map_err(|source| Error::Fatal(format!("failed writing zip entry: {source}")))?;
    }
    Ok(())
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return out;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}
