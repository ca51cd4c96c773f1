//! Builds the `.maff` container: one tab directory per archived page
//! (`index.<ext>`, `index.rdf`, `index_files/`, optionally `screenshot.png`
//! and `info.html`), zipped together at the end.

pub mod infotab;
pub mod rdf;
pub mod writer;

pub use rdf::{format_archive_time, RdfInfo};
pub use writer::{finish, write_tab, TabDir};
