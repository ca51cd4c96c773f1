//! Network collaborators for the migration core: a redirect-tracking HTTP
//! client, a bounded headless-browser pool, and content-type-to-extension
//! mapping for minted filenames.

pub mod client;
pub mod mime;
pub mod pool;

pub use client::HttpClient;
pub use mime::{extension_for, extension_from_url_path};
pub use pool::{BrowserPool, RenderedPage};
